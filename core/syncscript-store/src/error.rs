//! Error types for the store layer.

use syncscript_model::{ModelError, TransitionRejected, ValidationError};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to callers of store operations.
///
/// Persistence failures are deliberately absent: they are logged and
/// reflected in [`crate::PersistenceStatus`] instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed input to `create` or `update`.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Status change not allowed by the record's transition table.
    #[error(transparent)]
    Transition(#[from] TransitionRejected),

    /// `remove` called on an append-only collection.
    #[error("collection {0} is append-only")]
    AppendOnly(String),

    /// Two collections claimed the same name in one context.
    #[error("collection {0} is already registered in this namespace")]
    DuplicateCollection(String),

    /// Collection or namespace name is not a valid key segment.
    #[error("invalid name: {0}")]
    InvalidName(#[from] syncscript_types::Error),

    /// Timers need a running tokio runtime.
    #[error("no tokio runtime available")]
    NoRuntime,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(e) => Self::Validation(e),
            ModelError::Transition(e) => Self::Transition(e),
        }
    }
}
