//! Persistence layer for SyncScript.
//!
//! Provides the minimal load/save abstraction the entity store writes
//! through to, plus the versioned on-disk format.
//!
//! # Architecture
//!
//! - [`PersistenceAdapter`] is a dumb string store keyed by [`StorageKey`]
//! - Each collection is one JSON [`envelope`] carrying a `schemaVersion`
//! - Adapter failures are reported, never panicked on; the store decides
//!   whether to retry ([`RetryPolicy`]) or degrade to memory-only
//! - [`open_adapter`] picks a file-backed adapter when a data directory is
//!   usable and degrades to an in-memory one otherwise
//!
//! [`StorageKey`]: syncscript_types::StorageKey

mod adapter;
pub mod envelope;
mod error;
mod file;
mod retry;

pub use adapter::{MemoryAdapter, PersistenceAdapter, UnavailableAdapter};
pub use envelope::CURRENT_SCHEMA_VERSION;
pub use error::{StorageError, StorageResult};
pub use file::FileAdapter;
pub use retry::{RetryPolicy, save_with_retry};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Where and how collections are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Directory for the file adapter. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Largest single value the adapter accepts, in bytes.
    #[serde(default)]
    pub max_value_bytes: Option<usize>,
}

/// Opens the best adapter available in this environment.
///
/// Never fails: if the data directory cannot be created or written, the
/// store runs against an in-memory adapter for the rest of the process.
pub fn open_adapter(config: &AdapterConfig) -> Arc<dyn PersistenceAdapter> {
    let Some(dir) = &config.data_dir else {
        info!("no data directory configured, using in-memory persistence");
        return Arc::new(MemoryAdapter::new().with_max_value_bytes(config.max_value_bytes));
    };

    match FileAdapter::open(dir) {
        Ok(adapter) => {
            info!(dir = %dir.display(), "using file persistence");
            Arc::new(adapter.with_max_value_bytes(config.max_value_bytes))
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "data directory unusable, falling back to in-memory persistence");
            Arc::new(MemoryAdapter::new().with_max_value_bytes(config.max_value_bytes))
        }
    }
}
