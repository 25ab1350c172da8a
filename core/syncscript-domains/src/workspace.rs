use crate::{CollaborationStore, IntegrationStore, PerformanceStore, SearchHubStore, ThreatDetectionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{PersistenceStatus, StoreConfig, StoreFacade, StoreResult};
use syncscript_types::Namespace;
use tracing::info;

/// Persistence state across every façade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatus {
    /// True if any façade has unsaved changes.
    pub degraded: bool,
    pub stores: Vec<PersistenceStatus>,
}

/// All domain façades over one adapter and root namespace.
pub struct Workspace {
    namespace: Namespace,
    config: StoreConfig,
    collaboration: CollaborationStore,
    threats: ThreatDetectionStore,
    performance: Arc<PerformanceStore>,
    search: SearchHubStore,
    integrations: IntegrationStore,
}

impl Workspace {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        namespace: Namespace,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        Ok(Self {
            collaboration: CollaborationStore::new(adapter.clone(), &namespace, config.clone())?,
            threats: ThreatDetectionStore::new(adapter.clone(), &namespace, config.clone())?,
            performance: Arc::new(PerformanceStore::new(adapter.clone(), &namespace, config.clone())?),
            search: SearchHubStore::new(adapter.clone(), &namespace, config.clone())?,
            integrations: IntegrationStore::new(adapter, &namespace, config.clone())?,
            namespace,
            config,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn collaboration(&self) -> &CollaborationStore {
        &self.collaboration
    }

    pub fn threats(&self) -> &ThreatDetectionStore {
        &self.threats
    }

    pub fn performance(&self) -> &Arc<PerformanceStore> {
        &self.performance
    }

    pub fn search(&self) -> &SearchHubStore {
        &self.search
    }

    pub fn integrations(&self) -> &IntegrationStore {
        &self.integrations
    }

    /// Loads and seeds every collection.
    pub async fn init(&self) {
        self.collaboration.init().await;
        self.threats.init().await;
        self.performance.init().await;
        self.search.init().await;
        self.integrations.init().await;
        info!(namespace = %self.namespace, "workspace initialized");
    }

    /// Starts simulated telemetry at the configured tick interval.
    pub fn start_telemetry(&self) -> StoreResult<()> {
        self.performance
            .start_simulation(Duration::from_millis(self.config.tick_interval_ms))
    }

    /// Rewrites every collection. Returns whether all writes landed.
    pub async fn flush(&self) -> bool {
        let results = [
            self.collaboration.flush().await,
            self.threats.flush().await,
            self.performance.flush().await,
            self.search.flush().await,
            self.integrations.flush().await,
        ];
        results.iter().all(|ok| *ok)
    }

    /// Stops background work. Safe to call more than once.
    pub fn destroy(&self) {
        self.collaboration.destroy();
        self.threats.destroy();
        self.performance.destroy();
        self.search.destroy();
        self.integrations.destroy();
    }

    pub fn persistence_status(&self) -> WorkspaceStatus {
        let stores = vec![
            self.collaboration.persistence_status(),
            self.threats.persistence_status(),
            self.performance.persistence_status(),
            self.search.persistence_status(),
            self.integrations.persistence_status(),
        ];
        WorkspaceStatus {
            degraded: stores.iter().any(|s| s.degraded),
            stores,
        }
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
