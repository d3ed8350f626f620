//! Service directory contract and the web package listener.
//!
//! The service directory is where published web packages become
//! discoverable. The host runtime supplies the real one; an in-memory
//! implementation lives in [`memory`].

pub mod listener;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::WebPackage;

pub use listener::{ModuleListener, WebPackageListener};
pub use memory::InMemoryServiceDirectory;

/// Service property: id of the module that declared the package.
pub const PROP_MODULE_ID: &str = "module.id";

/// Service property: symbolic name of the module that declared the package.
pub const PROP_MODULE_NAME: &str = "module.symbolic-name";

/// Service property: package name.
pub const PROP_PACKAGE_NAME: &str = "webpackage.name";

/// Service property: package version.
pub const PROP_PACKAGE_VERSION: &str = "webpackage.version";

/// Service property: package root inside its module.
pub const PROP_PACKAGE_ROOT: &str = "webpackage.root";

/// Properties attached to a published service.
pub type ServiceProperties = BTreeMap<String, String>;

/// Opaque token for one active publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(u64);

impl RegistrationHandle {
    /// Create a handle from a directory-assigned value.
    pub const fn new(raw: u64) -> Self {
        RegistrationHandle(raw)
    }

    /// Get the directory-assigned value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of retracting a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retraction {
    /// The publication was active and is now gone
    Retracted,

    /// The publication had already been removed (e.g. by the runtime itself)
    AlreadyRetracted,
}

/// Error from the service directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("service directory is closed")]
    Closed,

    #[error("registration rejected: {reason}")]
    Rejected { reason: String },
}

/// The runtime facility used to publish and retract services.
///
/// Calls for unrelated handles may happen concurrently.
pub trait ServiceDirectory: Send + Sync {
    /// Publish a web package, returning a handle to retract it later.
    fn register(
        &self,
        service_type: &str,
        package: Arc<WebPackage>,
        properties: ServiceProperties,
    ) -> Result<RegistrationHandle, DirectoryError>;

    /// Retract a publication. Retracting a handle twice is not an error.
    fn retract(&self, handle: RegistrationHandle) -> Result<Retraction, DirectoryError>;
}

