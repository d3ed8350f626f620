//! `package.json` descriptor parsing.
//!
//! Only the fields needed to name and version a web package are read;
//! everything else in the descriptor is ignored.

use semver::Version;
use serde::Deserialize;
use thiserror::Error;

/// Default descriptor file name, resolved relative to a package root.
pub const DESCRIPTOR_NAME: &str = "package.json";

/// Error parsing a package descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid version `{version}`: {source}")]
    Version {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("package name is empty")]
    EmptyName,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: String,
    version: String,
}

/// The identifying fields of a web package descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Package name
    pub name: String,

    /// Package version
    pub version: Version,
}

impl PackageDescriptor {
    /// Parse a descriptor from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let raw: RawDescriptor = serde_json::from_slice(bytes)?;

        let name = raw.name.trim();
        if name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        let version = Version::parse(raw.version.trim()).map_err(|source| {
            DescriptorError::Version {
                version: raw.version.clone(),
                source,
            }
        })?;

        Ok(PackageDescriptor {
            name: name.to_string(),
            version,
        })
    }
}
