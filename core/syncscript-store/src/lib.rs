//! Write-through entity store engine for SyncScript.
//!
//! # Architecture
//!
//! - A [`StoreContext`] binds one namespace to one persistence adapter and
//!   carries the listener registry and persistence health for a façade
//! - A [`Collection`] is one lazily-initialized, mutex-guarded list of
//!   records; every mutation is persisted before the call returns
//! - [`Listeners`] are notified synchronously after each mutation; a
//!   panicking listener is isolated from the others
//! - A [`Ticker`] is the only cancellable resource: a periodic task that
//!   holds its owner weakly and is aborted on drop
//!
//! ## Initialization
//!
//! 1. First use of a collection loads its key and parses the envelope;
//!    any failure yields an empty collection
//! 2. An empty collection with a seed function is seeded and persisted
//! 3. Later calls reuse the loaded state; seeding happens once per process

mod collection;
mod config;
mod context;
mod error;
mod facade;
mod health;
mod listener;
mod ticker;

pub use collection::Collection;
pub use config::StoreConfig;
pub use context::StoreContext;
pub use error::{StoreError, StoreResult};
pub use facade::StoreFacade;
pub use health::{PersistenceHealth, PersistenceStatus};
pub use listener::{ChangeEvent, ChangeKind, ListenerId, Listeners};
pub use ticker::Ticker;
