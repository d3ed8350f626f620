//! Derive web packages from a module's capabilities.
//!
//! Each capability is built in isolation: a missing or malformed descriptor
//! skips that capability only, and nothing here ever returns an error to the
//! caller. Failures surface as log lines.

use tracing::{error, warn};

use crate::core::{
    extract_capabilities, Capability, Module, NormalizedRoot, PackageDescriptor, WebPackage,
    DESCRIPTOR_NAME,
};

/// Result of building one capability.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// The descriptor was found and parsed
    Built(WebPackage),

    /// No descriptor exists under the capability's root
    MissingDescriptor { path: String },

    /// The capability or its descriptor could not be read
    Malformed { path: String, reason: String },
}

impl BuildOutcome {
    /// Get the package, if one was built.
    pub fn package(&self) -> Option<&WebPackage> {
        match self {
            BuildOutcome::Built(pkg) => Some(pkg),
            _ => None,
        }
    }

    /// Check if the capability was malformed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, BuildOutcome::Malformed { .. })
    }
}

/// Builds web packages from capabilities.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    descriptor_name: String,
}

impl PackageBuilder {
    /// Create a builder that looks for `descriptor_name` under each root.
    pub fn new(descriptor_name: impl Into<String>) -> Self {
        PackageBuilder {
            descriptor_name: descriptor_name.into(),
        }
    }

    /// Build one capability, reporting exactly what happened.
    pub fn inspect(&self, module: &dyn Module, capability: &Capability) -> BuildOutcome {
        let root = match capability.root() {
            Ok(root) => root,
            Err(e) => {
                return BuildOutcome::Malformed {
                    path: self.descriptor_name.clone(),
                    reason: e.to_string(),
                }
            }
        };

        let path = root.join(&self.descriptor_name);

        let url = match module.resource(&path) {
            Ok(Some(url)) => url,
            Ok(None) => return BuildOutcome::MissingDescriptor { path },
            Err(e) => {
                return BuildOutcome::Malformed {
                    path,
                    reason: e.to_string(),
                }
            }
        };

        let descriptor = module
            .read_resource(&url)
            .map_err(|e| e.to_string())
            .and_then(|bytes| PackageDescriptor::parse(&bytes).map_err(|e| e.to_string()));

        match descriptor {
            Ok(descriptor) => BuildOutcome::Built(WebPackage::new(&root, descriptor, url)),
            Err(reason) => BuildOutcome::Malformed { path, reason },
        }
    }

    /// Build one capability, logging and discarding failures.
    pub fn build_package(
        &self,
        module: &dyn Module,
        capability: &Capability,
    ) -> Option<WebPackage> {
        match self.inspect(module, capability) {
            BuildOutcome::Built(pkg) => Some(pkg),
            BuildOutcome::MissingDescriptor { path } => {
                warn!(
                    module = module.symbolic_name(),
                    module_id = %module.id(),
                    path = %path,
                    "{} [{}]: {} not found",
                    module.symbolic_name(),
                    module.id(),
                    path
                );
                None
            }
            BuildOutcome::Malformed { path, reason } => {
                error!(
                    module = module.symbolic_name(),
                    module_id = %module.id(),
                    path = %path,
                    "{} [{}]: error parsing {}: {}",
                    module.symbolic_name(),
                    module.id(),
                    path,
                    reason
                );
                None
            }
        }
    }

    /// Build every web package capability the module declares in `namespace`.
    pub fn build_packages(&self, module: &dyn Module, namespace: &str) -> Vec<WebPackage> {
        extract_capabilities(module, namespace)
            .iter()
            .filter_map(|capability| self.build_package(module, capability))
            .collect()
    }

    /// Inspect every capability in `namespace`, keeping the root each came from.
    pub fn inspect_all(
        &self,
        module: &dyn Module,
        namespace: &str,
    ) -> Vec<(Option<NormalizedRoot>, BuildOutcome)> {
        extract_capabilities(module, namespace)
            .iter()
            .map(|capability| (capability.root().ok(), self.inspect(module, capability)))
            .collect()
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        PackageBuilder::new(DESCRIPTOR_NAME)
    }
}
