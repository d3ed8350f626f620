//! Module sources.
//!
//! Sources load modules from concrete locations so they can be fed to the
//! listener outside a host runtime (previews, checks, tests).

pub mod dir_module;

pub use dir_module::{discover_modules, DirModule, ManifestError, ModuleManifest, MODULE_MANIFEST};
