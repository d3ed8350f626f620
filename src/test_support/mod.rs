//! Test utilities and mocks for webpkg unit tests.
//!
//! This module provides mock implementations of the interfaces the host
//! runtime normally supplies: modules and the service directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use webpkg::test_support::{descriptor_json, MockModule, RecordingDirectory};
//!
//! #[test]
//! fn test_example() {
//!     let module = MockModule::new(1, "org.example.ui")
//!         .with_capability(Capability::web_package("/web"))
//!         .with_resource("/web/package.json", descriptor_json("ui", "1.0.0"));
//!
//!     let directory = Arc::new(RecordingDirectory::new());
//!     // Feed the module to a listener publishing into `directory`...
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::Level;

use url::Url;

use crate::core::{Capability, Module, ModuleError, ModuleId, ModuleState, WebPackage};
use crate::registry::{
    DirectoryError, RegistrationHandle, Retraction, ServiceDirectory, ServiceProperties,
};

/// A `package.json` body with the given name and version.
pub fn descriptor_json(name: &str, version: &str) -> String {
    format!(
        r#"{{ "name": "{}", "version": "{}", "description": "test package" }}"#,
        name, version
    )
}

/// Create `base/rel` with a `Module.toml` holding `manifest`.
pub fn create_module_dir(base: &Path, rel: &str, manifest: &str) -> PathBuf {
    let dir = base.join(rel);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Module.toml"), manifest).unwrap();
    dir
}

/// Shared buffer that a test subscriber writes formatted events into.
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Lines logged while running `f`, one per event, without colors or timestamps.
///
/// Each line starts with the level, e.g. `WARN` or `ERROR`.
pub fn capture_logs(f: impl FnOnce()) -> Vec<String> {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes)
        .lines()
        .map(|line| line.trim_start().to_string())
        .collect()
}

/// Logged lines at `level` that mention `needle`.
pub fn logged_at<'a>(lines: &'a [String], level: Level, needle: &str) -> Vec<&'a str> {
    let prefix = level.as_str();
    lines
        .iter()
        .filter(|line| line.starts_with(prefix) && line.contains(needle))
        .map(String::as_str)
        .collect()
}

#[derive(Debug, Clone)]
enum MockResource {
    Content(Vec<u8>),
    Failing,
}

/// In-memory module with programmable capabilities and resources.
#[derive(Debug, Clone)]
pub struct MockModule {
    id: ModuleId,
    name: String,
    state: ModuleState,
    wired: bool,
    capabilities: Vec<Capability>,
    resources: HashMap<String, MockResource>,
}

impl MockModule {
    /// Create an active, wired module with no capabilities.
    pub fn new(id: u64, name: &str) -> Self {
        MockModule {
            id: ModuleId::new(id),
            name: name.to_string(),
            state: ModuleState::Active,
            wired: true,
            capabilities: Vec::new(),
            resources: HashMap::new(),
        }
    }

    /// Declare a capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Add a resource at an exact path.
    pub fn with_resource(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.resources
            .insert(path.to_string(), MockResource::Content(content.into()));
        self
    }

    /// Add a resource whose lookup fails with a module error.
    pub fn with_failing_resource(mut self, path: &str) -> Self {
        self.resources.insert(path.to_string(), MockResource::Failing);
        self
    }

    /// Set the lifecycle state.
    pub fn with_state(mut self, state: ModuleState) -> Self {
        self.state = state;
        self
    }

    /// Make the module's wiring unavailable.
    pub fn without_wiring(mut self) -> Self {
        self.wired = false;
        self
    }

    fn url_for(&self, path: &str) -> Url {
        Url::parse(&format!("mock://{}/", self.id))
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .unwrap()
    }
}

impl Module for MockModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn symbolic_name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ModuleState {
        self.state
    }

    fn capabilities(&self, namespace: &str) -> Option<Vec<Capability>> {
        if !self.wired {
            return None;
        }
        Some(
            self.capabilities
                .iter()
                .filter(|c| c.namespace == namespace)
                .cloned()
                .collect(),
        )
    }

    fn resource(&self, path: &str) -> Result<Option<Url>, ModuleError> {
        match self.resources.get(path) {
            None => Ok(None),
            Some(MockResource::Failing) => Err(ModuleError::InvalidPath {
                path: path.to_string(),
                reason: "mock failure".to_string(),
            }),
            Some(MockResource::Content(_)) => Ok(Some(self.url_for(path))),
        }
    }

    fn read_resource(&self, url: &Url) -> Result<Vec<u8>, ModuleError> {
        self.resources
            .iter()
            .find(|(path, _)| self.url_for(path) == *url)
            .and_then(|(_, res)| match res {
                MockResource::Content(bytes) => Some(bytes.clone()),
                MockResource::Failing => None,
            })
            .ok_or_else(|| ModuleError::ForeignResource { url: url.clone() })
    }
}

/// Service directory that records every call made to it.
#[derive(Debug, Default)]
pub struct RecordingDirectory {
    next_handle: AtomicU64,
    register_calls: AtomicU64,
    retract_calls: AtomicU64,
    fail_retractions: AtomicBool,
    rejected: Mutex<HashSet<String>>,
    registered: Mutex<Vec<(RegistrationHandle, String)>>,
    retracted: Mutex<Vec<RegistrationHandle>>,
}

impl RecordingDirectory {
    /// Create a directory that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject registrations of packages with this name.
    pub fn reject_package(&self, name: &str) {
        self.rejected.lock().unwrap().insert(name.to_string());
    }

    /// Make every later retraction fail.
    pub fn fail_retractions(&self) {
        self.fail_retractions.store(true, Ordering::SeqCst);
    }

    /// Number of `register` calls, including rejected ones.
    pub fn register_calls(&self) -> u64 {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// Number of `retract` calls, including failed ones.
    pub fn retract_calls(&self) -> u64 {
        self.retract_calls.load(Ordering::SeqCst)
    }

    /// Names of successfully registered packages, in order.
    pub fn registered_names(&self) -> Vec<String> {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Handles passed to `retract`, in order.
    pub fn retracted(&self) -> Vec<RegistrationHandle> {
        self.retracted.lock().unwrap().clone()
    }
}

impl ServiceDirectory for RecordingDirectory {
    fn register(
        &self,
        _service_type: &str,
        package: Arc<WebPackage>,
        _properties: ServiceProperties,
    ) -> Result<RegistrationHandle, DirectoryError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);

        if self.rejected.lock().unwrap().contains(package.name()) {
            return Err(DirectoryError::Rejected {
                reason: format!("{} is rejected", package.name()),
            });
        }

        let handle = RegistrationHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.registered
            .lock()
            .unwrap()
            .push((handle, package.name().to_string()));
        Ok(handle)
    }

    fn retract(&self, handle: RegistrationHandle) -> Result<Retraction, DirectoryError> {
        self.retract_calls.fetch_add(1, Ordering::SeqCst);
        self.retracted.lock().unwrap().push(handle);

        if self.fail_retractions.load(Ordering::SeqCst) {
            return Err(DirectoryError::Closed);
        }

        let mut registered = self.registered.lock().unwrap();
        match registered.iter().position(|(h, _)| *h == handle) {
            Some(pos) => {
                registered.remove(pos);
                Ok(Retraction::Retracted)
            }
            None => Ok(Retraction::AlreadyRetracted),
        }
    }
}
