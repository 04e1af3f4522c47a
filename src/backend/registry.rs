//! Name-keyed backend cache.
//!
//! Each name gets a slot holding a `OnceLock` and its own init mutex. Hits read
//! the `OnceLock` under the shared map lock only; misses serialize on the slot's
//! mutex, so a name is constructed at most once while other names proceed.

use super::{Backend, CallSiteLocator};
use crate::internal;
use crate::policy::{Policy, PolicyResolver};
use crate::transport::{ForwardTransportFactory, TransportFactory};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

#[derive(Default)]
struct Slot {
    backend: OnceLock<Arc<Backend>>,
    init: Mutex<()>,
}

pub struct BackendRegistry {
    resolver: Arc<dyn PolicyResolver>,
    factory: Arc<dyn TransportFactory>,
    locator: Option<Arc<dyn CallSiteLocator>>,
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("names", &self.names())
            .finish_non_exhaustive()
    }
}

impl BackendRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[must_use]
    pub fn new(resolver: Arc<dyn PolicyResolver>, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            resolver,
            factory,
            locator: None,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// The backend for `name`, built on first use.
    ///
    /// Repeated calls return the same `Arc`. A failed construction removes the
    /// name's slot, so a later call builds again; this call does not retry.
    ///
    /// # Errors
    /// `Error::Construction` when the transport factory fails for `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<Backend>, crate::Error> {
        loop {
            let slot = self.slot(name);
            if let Some(backend) = slot.backend.get() {
                return Ok(Arc::clone(backend));
            }

            let _guard = slot.init.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(backend) = slot.backend.get() {
                return Ok(Arc::clone(backend));
            }
            // Evicted by a failed construction while we waited; start over on a fresh slot.
            if !self.is_current(name, &slot) {
                continue;
            }
            return match self.construct(name) {
                Ok(backend) => {
                    let backend = Arc::new(backend);
                    Ok(Arc::clone(slot.backend.get_or_init(|| backend)))
                }
                Err(e) => {
                    self.evict(name, &slot);
                    Err(e)
                }
            };
        }
    }

    fn is_current(&self, name: &str, slot: &Arc<Slot>) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Drops an empty slot so failing names don't accumulate. Caller holds the slot's init lock.
    fn evict(&self, name: &str, slot: &Arc<Slot>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.backend.get().is_none())
        {
            slots.remove(name);
        }
    }

    fn slot(&self, name: &str) -> Arc<Slot> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_default())
    }

    fn construct(&self, name: &str) -> Result<Backend, crate::Error> {
        internal::debug("REGISTRY", &format!("Constructing backend '{name}'"));
        let policy = self.resolver.resolve(name);
        let transport = self.factory.create(name).map_err(|e| {
            internal::error("REGISTRY", &format!("Backend '{name}' failed: {e}"));
            crate::Error::Construction {
                name: name.to_string(),
                source: Box::new(e),
            }
        })?;

        let mut backend = Backend::new(name, policy, transport);
        if let Some(locator) = &self.locator {
            backend = backend.with_locator(Arc::clone(locator));
        }
        Ok(backend)
    }

    fn backends(&self) -> Vec<Arc<Backend>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|slot| slot.backend.get().cloned())
            .collect()
    }

    /// Names with a constructed backend, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .backends()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Number of constructed backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes every constructed backend; call before shutdown.
    ///
    /// # Errors
    /// Returns the first transport error encountered.
    pub fn flush(&self) -> Result<(), crate::Error> {
        for backend in self.backends() {
            backend.flush()?;
        }
        Ok(())
    }
}

/// Collaborators default to an unset policy and the forward transport on `localhost:24224`.
#[derive(Default)]
pub struct RegistryBuilder {
    resolver: Option<Arc<dyn PolicyResolver>>,
    factory: Option<Arc<dyn TransportFactory>>,
    locator: Option<Arc<dyn CallSiteLocator>>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn policy_resolver(self, resolver: impl PolicyResolver + 'static) -> Self {
        self.shared_policy_resolver(Arc::new(resolver))
    }

    #[must_use]
    pub fn shared_policy_resolver(mut self, resolver: Arc<dyn PolicyResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn transport_factory(self, factory: impl TransportFactory + 'static) -> Self {
        self.shared_transport_factory(Arc::new(factory))
    }

    /// For callers that keep a handle on the factory, e.g. to inspect it in tests.
    #[must_use]
    pub fn shared_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    #[must_use]
    pub fn call_site_locator(mut self, locator: impl CallSiteLocator + 'static) -> Self {
        self.locator = Some(Arc::new(locator));
        self
    }

    #[must_use]
    pub fn build(self) -> BackendRegistry {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(Policy::unset()));
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(ForwardTransportFactory::default()));
        let mut registry = BackendRegistry::new(resolver, factory);
        registry.locator = self.locator;
        registry
    }
}
