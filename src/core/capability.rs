//! Web package capabilities and root normalization.
//!
//! A module declares each web package it ships as a capability in
//! [`CAPABILITY_NAMESPACE`]. The only attribute read here is `root`, the
//! directory inside the module that holds the package descriptor.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::module::Module;

/// Namespace of web package capabilities.
pub const CAPABILITY_NAMESPACE: &str = "osgi.webjars";

/// Attribute naming the package root inside the module.
pub const ROOT_ATTRIBUTE: &str = "root";

/// Root used when a capability has no `root` attribute.
pub const DEFAULT_ROOT: &str = "/";

/// Value of a capability attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl AttributeValue {
    /// Get the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Long(_) => "long",
            AttributeValue::Double(_) => "double",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::List(_) => "list",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

/// Error reading a capability's attributes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    #[error("attribute `{attribute}` must be a string, found {found}")]
    RootNotString {
        attribute: &'static str,
        found: &'static str,
    },
}

/// A namespaced declaration attached to a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Capability namespace
    pub namespace: String,

    /// Declared attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Capability {
    /// Create a capability with no attributes.
    pub fn new(namespace: impl Into<String>) -> Self {
        Capability {
            namespace: namespace.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create a web package capability with the given root.
    pub fn web_package(root: impl Into<String>) -> Self {
        Capability::new(CAPABILITY_NAMESPACE).with_attribute(ROOT_ATTRIBUTE, root.into())
    }

    /// Add an attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// The normalized package root declared by this capability.
    ///
    /// A missing `root` attribute yields [`DEFAULT_ROOT`].
    pub fn root(&self) -> Result<NormalizedRoot, CapabilityError> {
        match self.attribute(ROOT_ATTRIBUTE) {
            None => Ok(NormalizedRoot::new(DEFAULT_ROOT)),
            Some(value) => value
                .as_str()
                .map(NormalizedRoot::new)
                .ok_or(CapabilityError::RootNotString {
                    attribute: ROOT_ATTRIBUTE,
                    found: value.type_name(),
                }),
        }
    }
}

/// A package root that always ends with exactly one `/`.
///
/// The leading part is kept as declared: `"pkg"` becomes `"pkg/"`,
/// `"pkg//"` becomes `"pkg/"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedRoot(String);

impl NormalizedRoot {
    /// Normalize a raw root attribute.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches('/');
        let mut root = String::with_capacity(trimmed.len() + 1);
        root.push_str(trimmed);
        root.push('/');
        NormalizedRoot(root)
    }

    /// Get the normalized root as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of `file` relative to this root.
    pub fn join(&self, file: &str) -> String {
        format!("{}{}", self.0, file)
    }
}

impl fmt::Display for NormalizedRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedRoot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Enumerate the capabilities a module declares in `namespace`.
///
/// A module whose wiring is unavailable declares nothing.
pub fn extract_capabilities(module: &dyn Module, namespace: &str) -> Vec<Capability> {
    match module.capabilities(namespace) {
        Some(capabilities) => capabilities
            .into_iter()
            .filter(|c| c.namespace == namespace)
            .collect(),
        None => {
            tracing::debug!(
                module = module.symbolic_name(),
                module_id = %module.id(),
                "wiring unavailable, no capabilities"
            );
            Vec::new()
        }
    }
}
