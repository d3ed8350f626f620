//! Module abstraction - the runtime units that declare web packages.
//!
//! The host runtime owns modules; this crate only queries them. A module
//! exposes its identity, its declared capabilities, and a private resource
//! space from which package descriptors are loaded.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::capability::Capability;

/// Stable identity of a module for the lifetime of one installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(u64);

impl ModuleId {
    /// Create a module ID from its raw value.
    pub const fn new(raw: u64) -> Self {
        ModuleId(raw)
    }

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ModuleId {
    fn from(raw: u64) -> Self {
        ModuleId(raw)
    }
}

/// Lifecycle state of a module as reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    Installed,
    Resolved,
    Starting,
    /// Started and running
    #[default]
    Active,
    Stopping,
    Uninstalled,
}

impl ModuleState {
    /// Get the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleState::Installed => "installed",
            ModuleState::Resolved => "resolved",
            ModuleState::Starting => "starting",
            ModuleState::Active => "active",
            ModuleState::Stopping => "stopping",
            ModuleState::Uninstalled => "uninstalled",
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by a module while loading one of its resources.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("invalid resource path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("cannot convert `{path}` to a resource URL")]
    InvalidUrl { path: String },

    #[error("resource `{url}` is not readable by this module")]
    ForeignResource { url: Url },

    #[error("failed to read resource `{url}`")]
    Io {
        url: Url,
        #[source]
        source: std::io::Error,
    },
}

/// A deployable unit with its own lifecycle and declared capabilities.
///
/// Implementations are supplied by the host runtime. All methods must be
/// callable from whichever thread delivers lifecycle events.
pub trait Module: Send + Sync {
    /// Stable identity of this module.
    fn id(&self) -> ModuleId;

    /// Symbolic name, used for diagnostics only.
    fn symbolic_name(&self) -> &str;

    /// Current lifecycle state.
    fn state(&self) -> ModuleState;

    /// Capabilities declared in `namespace`.
    ///
    /// Returns `None` when the module's wiring is not available yet (for
    /// example, the module is not fully resolved). That is not a fault.
    fn capabilities(&self, namespace: &str) -> Option<Vec<Capability>>;

    /// Locate a resource inside the module's own resource space.
    ///
    /// `Ok(None)` means the resource does not exist.
    fn resource(&self, path: &str) -> Result<Option<Url>, ModuleError>;

    /// Read the contents of a resource previously located with [`Module::resource`].
    fn read_resource(&self, url: &Url) -> Result<Vec<u8>, ModuleError>;
}

/// Kind of lifecycle transition delivered by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleEventKind {
    Installed,
    Resolved,
    Starting,
    Started,
    Stopping,
    Stopped,
    Updated,
    Unresolved,
    Uninstalled,
    LazyActivation,
}

impl ModuleEventKind {
    /// Events after which a module's web packages must be published.
    pub fn is_start(&self) -> bool {
        matches!(self, ModuleEventKind::Started)
    }

    /// Events after which a module's web packages must be retracted.
    pub fn is_teardown(&self) -> bool {
        matches!(
            self,
            ModuleEventKind::Stopped | ModuleEventKind::Unresolved | ModuleEventKind::Uninstalled
        )
    }
}

/// A lifecycle notification for one module.
#[derive(Clone)]
pub struct ModuleEvent {
    /// What happened
    pub kind: ModuleEventKind,

    /// The affected module, if the runtime supplied one
    pub module: Option<Arc<dyn Module>>,
}

impl ModuleEvent {
    /// Create an event for a module.
    pub fn new(kind: ModuleEventKind, module: Arc<dyn Module>) -> Self {
        ModuleEvent {
            kind,
            module: Some(module),
        }
    }

    /// Create an event without an attached module.
    pub fn detached(kind: ModuleEventKind) -> Self {
        ModuleEvent { kind, module: None }
    }
}

impl fmt::Debug for ModuleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEvent")
            .field("kind", &self.kind)
            .field("module", &self.module.as_ref().map(|m| m.id()))
            .finish()
    }
}
