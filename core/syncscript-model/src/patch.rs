//! Shallow-merge patches.
//!
//! A [`Patch`] is a set of top-level fields. Applying it replaces each named
//! field of the record wholesale (nested objects and arrays are not merged
//! recursively) and leaves every other field untouched.

use crate::error::{ModelError, ValidationError};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use syncscript_types::Timestamp;

/// Top-level field overlay for `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Map<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a patch from any struct that serializes to a JSON object,
    /// typically a `FooPatch` with `skip_serializing_if = "Option::is_none"`
    /// on every field.
    pub fn from_serializable<S: Serialize>(value: &S) -> Result<Self, ValidationError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(ValidationError::NotAnObject),
            Err(e) => Err(ValidationError::Malformed(e.to_string())),
        }
    }

    /// Builds a patch from an arbitrary JSON value (e.g. an HTTP body).
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    /// Sets one field.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Applies `patch` to `current` and returns the updated record.
///
/// Steps: reject store-owned and unknown fields, overlay the remaining
/// fields, deserialize back into `T`, then run validation, the status
/// transition check and `touch(now)`. `current` itself is never modified.
pub fn apply_patch<T: Record>(current: &T, patch: &Patch, now: Timestamp) -> Result<T, ModelError> {
    let mut doc = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ValidationError::NotAnObject.into()),
        Err(e) => return Err(ValidationError::Malformed(e.to_string()).into()),
    };

    for (field, value) in &patch.0 {
        if field == "id" || T::IMMUTABLE_FIELDS.contains(&field.as_str()) {
            return Err(ValidationError::ImmutableField(field.clone()).into());
        }
        if !doc.contains_key(field) {
            return Err(ValidationError::UnknownField(field.clone()).into());
        }
        doc.insert(field.clone(), value.clone());
    }

    let mut next: T = serde_json::from_value(Value::Object(doc))
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;
    next.validate()?;
    current.check_transition(&next)?;
    next.touch(now);
    Ok(next)
}
