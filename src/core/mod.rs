//! Core data structures for webpkg.
//!
//! This module contains the foundational types used throughout webpkg:
//! - Modules and their lifecycle events
//! - Web package capabilities and root normalization
//! - Package descriptors, web packages and resource mappings

pub mod capability;
pub mod descriptor;
pub mod mapping;
pub mod module;
pub mod web_package;

pub use capability::{
    extract_capabilities, AttributeValue, Capability, CapabilityError, NormalizedRoot,
    CAPABILITY_NAMESPACE, DEFAULT_ROOT, ROOT_ATTRIBUTE,
};
pub use descriptor::{DescriptorError, PackageDescriptor, DESCRIPTOR_NAME};
pub use mapping::ResourceMapping;
pub use module::{Module, ModuleError, ModuleEvent, ModuleEventKind, ModuleId, ModuleState};
pub use web_package::WebPackage;
