//! Versioned on-disk format for a collection.
//!
//! ```json
//! { "schemaVersion": 1, "collection": "video_calls",
//!   "savedAt": "2024-01-15T09:30:00.000Z", "records": [ ... ] }
//! ```
//!
//! Blobs written before versioning existed are bare JSON arrays; they are
//! read as version 0 and migrated in memory.

use crate::error::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use syncscript_types::Timestamp;
use tracing::debug;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Version assigned to unversioned legacy arrays.
pub const LEGACY_SCHEMA_VERSION: u32 = 0;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a, T> {
    schema_version: u32,
    collection: &'a str,
    saved_at: Timestamp,
    records: &'a [T],
}

/// A decoded collection envelope with records still as raw JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub schema_version: u32,
    pub collection: String,
    pub saved_at: Option<Timestamp>,
    pub records: Vec<Value>,
}

/// Serializes a collection into the current envelope format.
pub fn encode<T: Serialize>(collection: &str, records: &[T]) -> StorageResult<String> {
    let envelope = EnvelopeRef {
        schema_version: CURRENT_SCHEMA_VERSION,
        collection,
        saved_at: Timestamp::now(),
        records,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parses a stored blob into an envelope, accepting legacy arrays.
pub fn parse(blob: &str) -> StorageResult<Envelope> {
    match serde_json::from_str::<Value>(blob)? {
        Value::Array(records) => Ok(Envelope {
            schema_version: LEGACY_SCHEMA_VERSION,
            collection: String::new(),
            saved_at: None,
            records,
        }),
        value @ Value::Object(_) => {
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.schema_version > CURRENT_SCHEMA_VERSION {
                return Err(StorageError::UnsupportedSchemaVersion {
                    found: envelope.schema_version,
                    supported: CURRENT_SCHEMA_VERSION,
                });
            }
            Ok(envelope)
        }
        other => Err(StorageError::InvalidData(format!(
            "expected an envelope object or array, found {}",
            kind_of(&other)
        ))),
    }
}

/// Decodes a stored blob into typed records, migrating older versions.
pub fn decode<T: DeserializeOwned>(blob: &str) -> StorageResult<Vec<T>> {
    let envelope = parse(blob)?;
    let records = migrate(envelope.schema_version, envelope.records);
    records
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(StorageError::from))
        .collect()
}

/// Upgrades raw records from `version` to [`CURRENT_SCHEMA_VERSION`].
fn migrate(version: u32, records: Vec<Value>) -> Vec<Value> {
    if version == LEGACY_SCHEMA_VERSION {
        // 0 -> 1 only introduced the envelope; record shapes are unchanged.
        debug!(records = records.len(), "migrating legacy collection blob");
    }
    records
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
