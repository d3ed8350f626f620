//! In-memory service directory.
//!
//! A thread-safe [`ServiceDirectory`] that keeps publications in a map.
//! Used by the CLI to preview what a module set would publish, and by tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::{ModuleId, ResourceMapping, WebPackage};
use crate::registry::{
    DirectoryError, RegistrationHandle, Retraction, ServiceDirectory, ServiceProperties,
    PROP_MODULE_ID,
};

/// One active publication.
#[derive(Debug, Clone)]
pub struct PublishedService {
    /// Handle returned at registration
    pub handle: RegistrationHandle,

    /// Service type the package was published under
    pub service_type: String,

    /// The published package
    pub package: Arc<WebPackage>,

    /// Properties supplied at registration
    pub properties: ServiceProperties,
}

impl PublishedService {
    /// Id of the module that owns this publication, if recorded.
    pub fn owner(&self) -> Option<ModuleId> {
        self.properties
            .get(PROP_MODULE_ID)
            .and_then(|id| id.parse::<u64>().ok())
            .map(ModuleId::new)
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    closed: bool,
    services: BTreeMap<RegistrationHandle, PublishedService>,
}

/// A service directory held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryServiceDirectory {
    next_handle: AtomicU64,
    state: RwLock<DirectoryState>,
}

impl InMemoryServiceDirectory {
    /// Create an empty, open directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retract every publication owned by a module.
    ///
    /// Mirrors what a host runtime does to a module's services when the
    /// module shuts down, independently of any listener.
    pub fn retract_owned_by(&self, module: ModuleId) -> usize {
        let mut state = self.write();
        let before = state.services.len();
        state.services.retain(|_, svc| svc.owner() != Some(module));
        before - state.services.len()
    }

    /// Snapshot of every active publication, in registration order.
    pub fn services(&self) -> Vec<PublishedService> {
        self.read().services.values().cloned().collect()
    }

    /// Every published package.
    pub fn packages(&self) -> Vec<Arc<WebPackage>> {
        self.read()
            .services
            .values()
            .map(|svc| svc.package.clone())
            .collect()
    }

    /// Resource mappings for every published package, sorted by alias.
    pub fn mappings(&self) -> Vec<ResourceMapping> {
        let mut mappings: Vec<ResourceMapping> = self
            .read()
            .services
            .values()
            .map(|svc| ResourceMapping::from(svc.package.as_ref()))
            .collect();
        mappings.sort();
        mappings
    }

    /// Number of active publications.
    pub fn len(&self) -> usize {
        self.read().services.len()
    }

    /// Check if nothing is published.
    pub fn is_empty(&self) -> bool {
        self.read().services.is_empty()
    }

    /// Close the directory, dropping every publication.
    ///
    /// Further registrations are rejected; retractions report the handle
    /// as already gone.
    pub fn close(&self) {
        let mut state = self.write();
        state.closed = true;
        state.services.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ServiceDirectory for InMemoryServiceDirectory {
    fn register(
        &self,
        service_type: &str,
        package: Arc<WebPackage>,
        properties: ServiceProperties,
    ) -> Result<RegistrationHandle, DirectoryError> {
        let mut state = self.write();
        if state.closed {
            return Err(DirectoryError::Closed);
        }

        let handle = RegistrationHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        state.services.insert(
            handle,
            PublishedService {
                handle,
                service_type: service_type.to_string(),
                package,
                properties,
            },
        );
        Ok(handle)
    }

    fn retract(&self, handle: RegistrationHandle) -> Result<Retraction, DirectoryError> {
        match self.write().services.remove(&handle) {
            Some(_) => Ok(Retraction::Retracted),
            None => Ok(Retraction::AlreadyRetracted),
        }
    }
}
