use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Tracks whether writes are still reaching the persistence adapter.
///
/// Once degraded, the context stops writing and counts mutations that only
/// live in memory until a successful flush clears the flag.
#[derive(Debug, Default)]
pub struct PersistenceHealth {
    degraded: AtomicBool,
    unsaved: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl PersistenceHealth {
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub fn mark_degraded(&self, error: impl Into<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error.into());
        self.degraded.store(true, Ordering::SeqCst);
    }

    pub fn record_unsaved(&self) {
        self.unsaved.fetch_add(1, Ordering::SeqCst);
    }

    pub fn unsaved_mutations(&self) -> u64 {
        self.unsaved.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clears the degraded flag and the unsaved counter after a full flush.
    /// The last error is kept for diagnostics.
    pub fn recover(&self) {
        self.degraded.store(false, Ordering::SeqCst);
        self.unsaved.store(0, Ordering::SeqCst);
    }
}

/// Snapshot for the "changes not saved" indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceStatus {
    pub namespace: String,
    pub adapter: String,
    pub available: bool,
    pub degraded: bool,
    pub unsaved_mutations: u64,
    pub last_error: Option<String>,
}
