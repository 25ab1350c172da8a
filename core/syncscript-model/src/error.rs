//! Error types for record validation and status transitions.

use thiserror::Error;

/// Malformed input to `create` or `update`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but its value is not acceptable.
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// The patch tried to overwrite a store-assigned field.
    #[error("field is immutable: {0}")]
    ImmutableField(String),

    /// The patch names a field the record type does not have.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The merged document no longer deserializes into the record type.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// Patches and records must be JSON objects.
    #[error("expected a JSON object")]
    NotAnObject,
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidField`].
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// A status change that is not in the type's transition table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal status transition: {from} -> {to}")]
pub struct TransitionRejected {
    pub from: String,
    pub to: String,
}

/// Any reason a patch could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionRejected),
}
