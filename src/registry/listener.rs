//! Web package listener - publishes packages as modules start and stop.
//!
//! Bookkeeping is a table `module id -> registration handles`. An entry
//! exists exactly while its module is started and published at least one
//! package. The table lock is held across the whole build-and-register and
//! remove-and-retract sequences, so a start and a stop for the same module
//! can never interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::core::{Module, ModuleEvent, ModuleId, ModuleState, WebPackage};
use crate::ops::PackageBuilder;
use crate::registry::{
    RegistrationHandle, Retraction, ServiceDirectory, ServiceProperties, PROP_MODULE_ID,
    PROP_MODULE_NAME, PROP_PACKAGE_NAME, PROP_PACKAGE_ROOT, PROP_PACKAGE_VERSION,
};
use crate::util::config::ExtenderConfig;

/// Receives module lifecycle notifications from the host runtime.
///
/// Called synchronously on whatever thread the runtime delivers events on.
pub trait ModuleListener: Send + Sync {
    /// Handle one lifecycle transition.
    fn module_changed(&self, event: &ModuleEvent);
}

/// Publishes the web packages of started modules and retracts them on teardown.
pub struct WebPackageListener {
    directory: Arc<dyn ServiceDirectory>,
    builder: PackageBuilder,
    config: ExtenderConfig,
    registrations: Mutex<HashMap<ModuleId, Vec<RegistrationHandle>>>,
}

impl WebPackageListener {
    /// Create a listener publishing into `directory`.
    pub fn new(directory: Arc<dyn ServiceDirectory>, config: ExtenderConfig) -> Self {
        WebPackageListener {
            directory,
            builder: PackageBuilder::new(config.descriptor.clone()),
            config,
            registrations: Mutex::new(HashMap::new()),
        }
    }

    /// Publish every web package the module declares.
    ///
    /// Returns the number of packages published. A module that is already
    /// tracked is left alone, so a repeated start publishes nothing.
    pub fn register_web_package_services(&self, module: Option<&dyn Module>) -> usize {
        let Some(module) = module else {
            return 0;
        };
        let id = module.id();

        let mut registrations = self.lock_registrations();
        if registrations.contains_key(&id) {
            debug!(
                module = module.symbolic_name(),
                module_id = %id,
                "already tracked, ignoring repeated start"
            );
            return 0;
        }

        let handles: Vec<RegistrationHandle> = self
            .builder
            .build_packages(module, &self.config.namespace)
            .into_iter()
            .filter_map(|pkg| self.publish(module, pkg))
            .collect();

        if handles.is_empty() {
            debug!(
                module = module.symbolic_name(),
                module_id = %id,
                "no web packages published"
            );
            return 0;
        }

        let count = handles.len();
        info!(
            module = module.symbolic_name(),
            module_id = %id,
            packages = count,
            "published web packages"
        );
        registrations.insert(id, handles);
        count
    }

    /// Retract every web package published for the module.
    ///
    /// Returns the number of handles that were tracked for it.
    pub fn unregister_web_package_services(&self, module: Option<&dyn Module>) -> usize {
        let Some(module) = module else {
            return 0;
        };
        let id = module.id();

        let mut registrations = self.lock_registrations();
        let Some(handles) = registrations.remove(&id) else {
            return 0;
        };

        let retracted = handles
            .iter()
            .filter(|handle| self.retract(id, **handle))
            .count();

        info!(
            module = module.symbolic_name(),
            module_id = %id,
            retracted,
            already_retracted = handles.len() - retracted,
            "untracked module"
        );
        handles.len()
    }

    /// Start tracking: publish packages for every module already active.
    ///
    /// Bookkeeping is never persisted; it is rebuilt from the live module set.
    pub fn open<'a, I>(&self, modules: I) -> usize
    where
        I: IntoIterator<Item = &'a dyn Module>,
    {
        modules
            .into_iter()
            .filter(|m| m.state() == ModuleState::Active)
            .map(|m| self.register_web_package_services(Some(m)))
            .sum()
    }

    /// Stop tracking: retract everything still published.
    pub fn close(&self) -> usize {
        let mut registrations = self.lock_registrations();
        let mut released = 0;
        for (id, handles) in registrations.drain() {
            for handle in handles {
                self.retract(id, handle);
                released += 1;
            }
        }
        released
    }

    /// Check whether the module currently has published packages.
    pub fn is_tracked(&self, id: ModuleId) -> bool {
        self.lock_registrations().contains_key(&id)
    }

    /// Handles held for the module, if tracked.
    pub fn handles(&self, id: ModuleId) -> Option<Vec<RegistrationHandle>> {
        self.lock_registrations().get(&id).cloned()
    }

    /// All tracked modules, in id order.
    pub fn tracked_modules(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.lock_registrations().keys().copied().collect();
        ids.sort();
        ids
    }

    fn publish(&self, module: &dyn Module, pkg: WebPackage) -> Option<RegistrationHandle> {
        let properties = service_properties(module, &pkg);
        let name = pkg.to_string();

        match self
            .directory
            .register(&self.config.service_type, Arc::new(pkg), properties)
        {
            Ok(handle) => {
                debug!(
                    module = module.symbolic_name(),
                    module_id = %module.id(),
                    handle = %handle,
                    "published {}",
                    name
                );
                Some(handle)
            }
            Err(e) => {
                error!(
                    module = module.symbolic_name(),
                    module_id = %module.id(),
                    "{} [{}]: failed to publish {}: {}",
                    module.symbolic_name(),
                    module.id(),
                    name,
                    e
                );
                None
            }
        }
    }

    /// Retract one handle, returning whether it was still published.
    fn retract(&self, id: ModuleId, handle: RegistrationHandle) -> bool {
        match self.directory.retract(handle) {
            Ok(Retraction::Retracted) => true,
            Ok(Retraction::AlreadyRetracted) => {
                // The runtime tears registrations down itself during shutdown
                debug!(module_id = %id, handle = %handle, "already retracted");
                false
            }
            Err(e) => {
                warn!(module_id = %id, handle = %handle, "failed to retract: {}", e);
                false
            }
        }
    }

    fn lock_registrations(&self) -> MutexGuard<'_, HashMap<ModuleId, Vec<RegistrationHandle>>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModuleListener for WebPackageListener {
    fn module_changed(&self, event: &ModuleEvent) {
        let module = event.module.as_deref();
        if event.kind.is_start() {
            self.register_web_package_services(module);
        } else if event.kind.is_teardown() {
            self.unregister_web_package_services(module);
        }
    }
}

fn service_properties(module: &dyn Module, pkg: &WebPackage) -> ServiceProperties {
    let mut properties = ServiceProperties::new();
    properties.insert(PROP_MODULE_ID.to_string(), module.id().to_string());
    properties.insert(PROP_MODULE_NAME.to_string(), module.symbolic_name().to_string());
    properties.insert(PROP_PACKAGE_NAME.to_string(), pkg.name().to_string());
    properties.insert(PROP_PACKAGE_VERSION.to_string(), pkg.version().to_string());
    properties.insert(
        PROP_PACKAGE_ROOT.to_string(),
        pkg.resource_root_path().to_string(),
    );
    properties
}
