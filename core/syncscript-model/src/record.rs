use crate::error::{TransitionRejected, ValidationError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use syncscript_types::{RecordId, Timestamp};

/// A record stored in a SyncScript collection.
///
/// The store assigns `id` and timestamps; callers only ever provide a
/// [`Record::Draft`]. Everything else is optional: most record types only
/// override [`Record::validate`], and types with a status field route
/// [`Record::check_transition`] through their [`crate::StatusMachine`].
pub trait Record:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Caller-supplied fields for `create`.
    type Draft: Send;

    /// Human-readable type name used in logs and change events.
    const KIND: &'static str;

    /// Serialized field names `update` must never overwrite, besides `id`.
    const IMMUTABLE_FIELDS: &'static [&'static str] = &[];

    /// Builds a record from a draft plus the store-generated fields.
    fn from_draft(id: RecordId, now: Timestamp, draft: Self::Draft) -> Self;

    fn id(&self) -> &RecordId;

    /// Refreshes `lastModified` (or equivalent) after an update.
    /// Types without such a field keep the default no-op.
    fn touch(&mut self, now: Timestamp) {
        let _ = now;
    }

    /// Validates a record before it is written.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Validates the status change from `self` to `next`.
    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        let _ = next;
        Ok(())
    }

    /// Called after loading from storage, before the record is served.
    fn on_after_load(&mut self) {}
}

/// Fails with [`ValidationError::MissingField`] when `value` is blank.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field.to_string()))
    } else {
        Ok(())
    }
}
