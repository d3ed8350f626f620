//! webpkg - publishes the web packages declared by modules
//!
//! This crate watches module lifecycle events, derives web packages from
//! each started module's capabilities, publishes them to a service
//! directory, and retracts them when the module goes away.

pub mod core;
pub mod ops;
pub mod registry;
pub mod sources;
pub mod util;

/// Test utilities and mocks for webpkg unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock modules and service directories.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    capability::Capability, mapping::ResourceMapping, module::Module, module::ModuleEvent,
    module::ModuleId, web_package::WebPackage,
};

pub use registry::{ModuleListener, ServiceDirectory, WebPackageListener};
pub use util::config::ExtenderConfig;
