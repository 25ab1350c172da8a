use crate::adapter::PersistenceAdapter;
use crate::error::StorageResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use syncscript_types::StorageKey;
use tracing::{debug, warn};

/// Exponential backoff for failed saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            max_backoff_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based), doubling each time.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        let ms = self.initial_backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Saves `value`, retrying transient failures per `policy`.
///
/// Returns the number of attempts used on success, or the last error.
pub async fn save_with_retry(
    adapter: &dyn PersistenceAdapter,
    key: &StorageKey,
    value: &str,
    policy: &RetryPolicy,
) -> StorageResult<u32> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match adapter.save(key, value) {
            Ok(()) => return Ok(attempt),
            Err(e) if e.is_transient() && attempt < attempts => {
                let delay = policy.backoff_for(attempt);
                debug!(key = %key, attempt, error = %e, delay_ms = delay.as_millis() as u64, "save failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(key = %key, attempt, adapter = adapter.name(), error = %e, "save failed");
                return Err(e);
            }
        }
    }
}
