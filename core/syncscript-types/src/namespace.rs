//! Namespaces for the shared persistence key space.
//!
//! Every façade owns a namespace and every collection key is derived from
//! it, so two unrelated collections can never share a storage key by
//! accident. Segments are joined with `.`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR: char = '.';

/// A dotted key prefix such as `syncscript.collaboration`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Creates a root namespace. The name may itself be dotted.
    pub fn new(name: &str) -> Result<Self, Error> {
        for segment in name.split(SEPARATOR) {
            validate_segment(segment)?;
        }
        Ok(Self(name.to_string()))
    }

    /// Derives a child namespace: `parent.segment`.
    pub fn child(&self, segment: &str) -> Result<Self, Error> {
        validate_segment(segment)?;
        Ok(Self(format!("{}{SEPARATOR}{segment}", self.0)))
    }

    /// Builds the storage key for a collection inside this namespace.
    pub fn key(&self, collection: &str) -> Result<StorageKey, Error> {
        validate_segment(collection)?;
        Ok(StorageKey(format!("{}{SEPARATOR}{collection}", self.0)))
    }

    /// Returns the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

/// A fully-qualified key in the persistence substrate.
///
/// Only obtainable through [`Namespace::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Segments are non-empty ASCII `[a-z0-9_-]`, which keeps keys safe to use
/// as file names in the file adapter.
fn validate_segment(segment: &str) -> Result<(), Error> {
    let valid = !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidNamespace(segment.to_string()))
    }
}
