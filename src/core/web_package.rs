//! WebPackage - a published bundle of static web resources.

use semver::Version;
use serde::Serialize;
use url::Url;

use crate::core::capability::NormalizedRoot;
use crate::core::descriptor::PackageDescriptor;

/// A web package derived from one module capability.
///
/// Immutable once built. The resource root is where the package lives inside
/// its module; the web root is the public alias it is served under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebPackage {
    /// Package name from the descriptor
    name: String,

    /// Package version from the descriptor
    version: Version,

    /// Root of the package inside the owning module
    resource_root_path: String,

    /// Public alias, `/<name>/<version>`
    web_root_path: String,

    /// Location the descriptor was read from
    descriptor_url: Url,
}

impl WebPackage {
    /// Create a package from its normalized root and parsed descriptor.
    pub fn new(root: &NormalizedRoot, descriptor: PackageDescriptor, descriptor_url: Url) -> Self {
        let web_root_path = format!("/{}/{}", descriptor.name, descriptor.version);
        WebPackage {
            name: descriptor.name,
            version: descriptor.version,
            resource_root_path: root.as_str().to_string(),
            web_root_path,
            descriptor_url,
        }
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Get the root of the package inside its module.
    pub fn resource_root_path(&self) -> &str {
        &self.resource_root_path
    }

    /// Get the public alias of the package.
    pub fn web_root_path(&self) -> &str {
        &self.web_root_path
    }

    /// Get the descriptor location.
    pub fn descriptor_url(&self) -> &Url {
        &self.descriptor_url
    }
}

impl std::fmt::Display for WebPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}
