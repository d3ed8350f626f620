//! Alias-to-resource-root mapping consumed by HTTP publishers.

use std::fmt;

use serde::Serialize;

use crate::core::web_package::WebPackage;

/// Pairs a package's public alias with its resource root.
///
/// Plain value: two mappings are equal when both fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceMapping {
    alias: String,
    path: String,
}

impl ResourceMapping {
    /// Create a mapping from raw alias and path strings.
    pub fn new(alias: impl Into<String>, path: impl Into<String>) -> Self {
        ResourceMapping {
            alias: alias.into(),
            path: path.into(),
        }
    }

    /// The public alias (the package's web root).
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The internal resource root.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl From<&WebPackage> for ResourceMapping {
    fn from(pkg: &WebPackage) -> Self {
        ResourceMapping::new(pkg.web_root_path(), pkg.resource_root_path())
    }
}

// Log tooling greps for this exact shape.
impl fmt::Display for ResourceMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceMapping{{alias={},path={}}}", self.alias, self.path)
    }
}
