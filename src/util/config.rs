//! Configuration file support for webpkg.
//!
//! webpkg supports two configuration file locations:
//! - Global: `~/.webpkg/config.toml` - User-wide defaults
//! - Project: `.webpkg/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, field by field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{CAPABILITY_NAMESPACE, DESCRIPTOR_NAME};

/// Service type web packages are published under by default.
pub const DEFAULT_SERVICE_TYPE: &str = "webpkg.WebPackage";

/// webpkg configuration as read from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extender settings
    pub extender: ExtenderSection,
}

/// The `[extender]` section. Unset fields fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtenderSection {
    /// Capability namespace that declares web packages
    pub namespace: Option<String>,

    /// Descriptor file name looked up under each package root
    pub descriptor: Option<String>,

    /// Service type packages are published under
    pub service_type: Option<String>,
}

/// Resolved settings the listener runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtenderConfig {
    /// Capability namespace that declares web packages
    pub namespace: String,

    /// Descriptor file name looked up under each package root
    pub descriptor: String,

    /// Service type packages are published under
    pub service_type: String,
}

impl Default for ExtenderConfig {
    fn default() -> Self {
        ExtenderConfig {
            namespace: CAPABILITY_NAMESPACE.to_string(),
            descriptor: DESCRIPTOR_NAME.to_string(),
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.extender.namespace.is_some() {
            self.extender.namespace = other.extender.namespace;
        }
        if other.extender.descriptor.is_some() {
            self.extender.descriptor = other.extender.descriptor;
        }
        if other.extender.service_type.is_some() {
            self.extender.service_type = other.extender.service_type;
        }
    }

    /// Resolve the extender settings, filling in defaults.
    pub fn extender(&self) -> ExtenderConfig {
        let defaults = ExtenderConfig::default();
        ExtenderConfig {
            namespace: self.extender.namespace.clone().unwrap_or(defaults.namespace),
            descriptor: self.extender.descriptor.clone().unwrap_or(defaults.descriptor),
            service_type: self
                .extender
                .service_type
                .clone()
                .unwrap_or(defaults.service_type),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.webpkg/config.toml)
/// 2. Global config (~/.webpkg/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global webpkg config directory (~/.webpkg).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".webpkg"))
}

/// Get the global config path (~/.webpkg/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.webpkg/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".webpkg").join("config.toml")
}
