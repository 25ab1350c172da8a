//! Core type definitions for SyncScript.
//!
//! This crate defines the small, domain-agnostic types used throughout the
//! entity store:
//! - Record identifiers (UUID v7 rendered as strings)
//! - ISO-8601 timestamps
//! - Namespaces and the storage keys derived from them
//!
//! All domain-specific records (video calls, threat events, metrics, etc.)
//! belong in `syncscript-domains`, not here.

mod ids;
mod namespace;
mod timestamp;

pub use ids::RecordId;
pub use namespace::{Namespace, StorageKey};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    #[error("invalid namespace segment: {0:?}")]
    InvalidNamespace(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
