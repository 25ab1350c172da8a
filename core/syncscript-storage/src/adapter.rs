use crate::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use syncscript_types::StorageKey;

/// A synchronous key/value string store.
///
/// Implementations own the bytes, not their structure. Every method
/// reports failure through [`StorageError`]; callers treat persistence as a
/// best-effort cache and must not assume a `save` succeeded.
pub trait PersistenceAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether writes can reach a backing store at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Returns the stored value, or `None` if the key was never written.
    fn load(&self, key: &StorageKey) -> StorageResult<Option<String>>;

    /// Replaces the value stored under `key`.
    fn save(&self, key: &StorageKey, value: &str) -> StorageResult<()>;

    /// Deletes the value stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &StorageKey) -> StorageResult<()>;
}

/// Process-local adapter. Also the degraded fallback when no durable store
/// is reachable.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    values: RwLock<HashMap<String, String>>,
    max_value_bytes: Option<usize>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects values larger than `limit` bytes with `QuotaExceeded`.
    #[must_use]
    pub fn with_max_value_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_value_bytes = limit;
        self
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key.as_str()).cloned())
    }

    fn save(&self, key: &StorageKey, value: &str) -> StorageResult<()> {
        if let Some(limit) = self.max_value_bytes {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> StorageResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key.as_str());
        Ok(())
    }
}

/// Adapter for environments without any persistence substrate.
///
/// Every operation is a no-op and `load` always returns `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAdapter;

impl PersistenceAdapter for UnavailableAdapter {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn load(&self, _key: &StorageKey) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn save(&self, _key: &StorageKey, _value: &str) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &StorageKey) -> StorageResult<()> {
        Ok(())
    }
}
