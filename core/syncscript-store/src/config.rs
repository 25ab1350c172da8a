use serde::{Deserialize, Serialize};
use syncscript_storage::RetryPolicy;

/// Configuration for a store context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Populate empty collections with their fixed seed records.
    pub seed_defaults: bool,
    /// Retry policy for failed saves before persistence is marked degraded.
    pub retry: RetryPolicy,
    /// Period of simulated-telemetry ticks (ms).
    pub tick_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            retry: RetryPolicy::default(),
            tick_interval_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// No seeding, single save attempt. Used by tests that need empty,
    /// predictable collections.
    pub fn empty() -> Self {
        Self {
            seed_defaults: false,
            retry: RetryPolicy::none(),
            ..Self::default()
        }
    }
}
