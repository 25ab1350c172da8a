use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::health::{PersistenceHealth, PersistenceStatus};
use crate::listener::{ChangeEvent, ListenerId, Listeners};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use syncscript_storage::{PersistenceAdapter, envelope, save_with_retry};
use syncscript_types::{Namespace, StorageKey};
use tracing::{debug, error, warn};

/// Shared state for all collections of one façade.
///
/// Binds a namespace to an adapter; collection keys are always derived
/// from the namespace, so two contexts with different namespaces cannot
/// overwrite each other's data on a shared adapter.
pub struct StoreContext {
    adapter: Arc<dyn PersistenceAdapter>,
    namespace: Namespace,
    config: StoreConfig,
    listeners: Listeners,
    health: PersistenceHealth,
    claimed: Mutex<HashSet<String>>,
}

impl StoreContext {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        namespace: Namespace,
        config: StoreConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            adapter,
            namespace,
            config,
            listeners: Listeners::new(),
            health: PersistenceHealth::default(),
            claimed: Mutex::new(HashSet::new()),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn adapter(&self) -> &Arc<dyn PersistenceAdapter> {
        &self.adapter
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn health(&self) -> &PersistenceHealth {
        &self.health
    }

    pub fn add_listener(&self, callback: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> ListenerId {
        self.listeners.add(callback)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn status(&self) -> PersistenceStatus {
        PersistenceStatus {
            namespace: self.namespace.to_string(),
            adapter: self.adapter.name().to_string(),
            available: self.adapter.is_available(),
            degraded: self.health.is_degraded(),
            unsaved_mutations: self.health.unsaved_mutations(),
            last_error: self.health.last_error(),
        }
    }

    /// Reserves a collection name and returns its storage key.
    pub(crate) fn claim(&self, collection: &str) -> StoreResult<StorageKey> {
        let key = self.namespace.key(collection)?;
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if !claimed.insert(collection.to_string()) {
            error!(namespace = %self.namespace, collection, "collection registered twice");
            return Err(StoreError::DuplicateCollection(collection.to_string()));
        }
        Ok(key)
    }

    pub(crate) fn notify(&self, event: &ChangeEvent) {
        self.listeners.notify(event);
    }

    /// Write-through after a mutation. Skipped (and counted as unsaved)
    /// while persistence is degraded.
    pub(crate) async fn persist<T: Serialize>(&self, key: &StorageKey, collection: &str, records: &[T]) {
        if self.health.is_degraded() {
            self.health.record_unsaved();
            debug!(key = %key, "persistence degraded, change kept in memory only");
            return;
        }
        if !self.write(key, collection, records).await {
            self.health.record_unsaved();
        }
    }

    /// Serializes and saves one collection, bypassing the degraded check.
    /// Returns whether the write landed.
    pub(crate) async fn write<T: Serialize>(&self, key: &StorageKey, collection: &str, records: &[T]) -> bool {
        let blob = match envelope::encode(collection, records) {
            Ok(blob) => blob,
            Err(e) => {
                error!(key = %key, error = %e, "failed to serialize collection");
                self.health.mark_degraded(e.to_string());
                return false;
            }
        };

        match save_with_retry(self.adapter.as_ref(), key, &blob, &self.config.retry).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "persistence degraded, continuing in memory");
                self.health.mark_degraded(e.to_string());
                false
            }
        }
    }

    /// Call after flushing every collection; clears the degraded flag when
    /// all writes landed. Returns `all_ok`.
    pub fn finish_flush(&self, all_ok: bool) -> bool {
        if all_ok {
            if self.health.is_degraded() {
                debug!(namespace = %self.namespace, "persistence recovered");
            }
            self.health.recover();
        }
        all_ok
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("namespace", &self.namespace)
            .field("adapter", &self.adapter.name())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
