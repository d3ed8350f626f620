//! Directory module - a module laid out on the local filesystem.
//!
//! The directory holds a `Module.toml` manifest declaring the module's
//! identity and capabilities; every other file is part of the module's
//! resource space.
//!
//! ```toml
//! [module]
//! id = 42
//! symbolic-name = "org.example.ui"
//!
//! [[capability]]
//! namespace = "osgi.webjars"
//! attributes = { root = "/web/app" }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Result};
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use walkdir::WalkDir;

use crate::core::{Capability, Module, ModuleError, ModuleId, ModuleState};

/// File name of a module manifest.
pub const MODULE_MANIFEST: &str = "Module.toml";

/// Error loading a module manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no Module.toml found in {}", .dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parsed `Module.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    /// The `[module]` section
    pub module: ModuleSection,

    /// Declared capabilities, one `[[capability]]` table each
    #[serde(default, rename = "capability")]
    pub capabilities: Vec<Capability>,
}

/// The `[module]` section of a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleSection {
    /// Module identity
    pub id: ModuleId,

    /// Symbolic name
    pub symbolic_name: String,

    /// Lifecycle state (default: active)
    #[serde(default)]
    pub state: ModuleState,

    /// Whether wiring is available; an unwired module exposes no capabilities
    #[serde(default = "default_true")]
    pub wired: bool,
}

fn default_true() -> bool {
    true
}

impl ModuleManifest {
    /// Parse a manifest from a string.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ManifestError> {
        toml::from_str(contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A module backed by a directory.
#[derive(Debug, Clone)]
pub struct DirModule {
    /// Canonical module directory
    root: PathBuf,

    /// The parsed manifest
    manifest: ModuleManifest,
}

impl DirModule {
    /// Load a module from its directory.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let manifest_path = dir.join(MODULE_MANIFEST);
        if !manifest_path.is_file() {
            return Err(ManifestError::NotFound {
                dir: dir.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(&manifest_path).map_err(|source| ManifestError::Read {
            path: manifest_path.clone(),
            source,
        })?;
        let manifest = ModuleManifest::parse(&contents, &manifest_path)?;

        let root = dir.canonicalize().map_err(|source| ManifestError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(DirModule { root, manifest })
    }

    /// Get the module directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a module-relative resource path onto the filesystem.
    ///
    /// Leading separators are ignored; `..` is rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, ModuleError> {
        let mut resolved = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(ModuleError::InvalidPath {
                        path: path.to_string(),
                        reason: "path leaves the module".to_string(),
                    })
                }
            }
        }
        Ok(resolved)
    }

    /// Resolve symlinks and check the target still lies inside the module.
    fn confine(&self, file: &Path) -> std::io::Result<Option<PathBuf>> {
        let canonical = file.canonicalize()?;
        Ok(canonical.starts_with(&self.root).then_some(canonical))
    }
}

impl Module for DirModule {
    fn id(&self) -> ModuleId {
        self.manifest.module.id
    }

    fn symbolic_name(&self) -> &str {
        &self.manifest.module.symbolic_name
    }

    fn state(&self) -> ModuleState {
        self.manifest.module.state
    }

    fn capabilities(&self, namespace: &str) -> Option<Vec<Capability>> {
        if !self.manifest.module.wired {
            return None;
        }
        Some(
            self.manifest
                .capabilities
                .iter()
                .filter(|c| c.namespace == namespace)
                .cloned()
                .collect(),
        )
    }

    fn resource(&self, path: &str) -> Result<Option<Url>, ModuleError> {
        let file = self.resolve(path)?;
        if !file.is_file() {
            return Ok(None);
        }
        let file = match self.confine(&file) {
            Ok(Some(file)) => file,
            Ok(None) => {
                return Err(ModuleError::InvalidPath {
                    path: path.to_string(),
                    reason: "symlink target lies outside the module".to_string(),
                })
            }
            Err(e) => {
                return Err(ModuleError::InvalidPath {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        Url::from_file_path(&file)
            .map(Some)
            .map_err(|()| ModuleError::InvalidUrl {
                path: file.display().to_string(),
            })
    }

    fn read_resource(&self, url: &Url) -> Result<Vec<u8>, ModuleError> {
        let file = url
            .to_file_path()
            .map_err(|()| ModuleError::ForeignResource { url: url.clone() })?;
        let file = match self.confine(&file) {
            Ok(Some(file)) => file,
            Ok(None) => return Err(ModuleError::ForeignResource { url: url.clone() }),
            Err(source) => {
                return Err(ModuleError::Io {
                    url: url.clone(),
                    source,
                })
            }
        };
        fs::read(&file).map_err(|source| ModuleError::Io {
            url: url.clone(),
            source,
        })
    }
}

/// Find every module under `root`, sorted by id.
///
/// Any directory containing a `Module.toml` is a module. Two modules with
/// the same id are an error.
pub fn discover_modules(root: &Path) -> Result<Vec<DirModule>> {
    if !root.is_dir() {
        bail!("not a directory: {}", root.display());
    }

    let mut modules = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == MODULE_MANIFEST {
            let dir = entry.path().parent().unwrap_or(root);
            modules.push(DirModule::load(dir)?);
        }
    }

    let mut seen: HashMap<ModuleId, &Path> = HashMap::new();
    for module in &modules {
        if let Some(previous) = seen.insert(module.id(), module.root()) {
            bail!(
                "duplicate module id {} in {} and {}",
                module.id(),
                previous.display(),
                module.root().display()
            );
        }
    }

    modules.sort_by_key(|m| m.id());
    Ok(modules)
}
