//! Record model for SyncScript.
//!
//! Defines the universal types every store collection depends on:
//! - [`Record`] — a JSON-serializable domain record with a store-assigned id
//! - [`Patch`] — a shallow, top-level field overlay used by `update`
//! - [`StatusMachine`] — explicit transition tables for status enums
//! - [`CollectionSchema`] — insertion order, retention cap and deletability
//!
//! These types are consumed by the store engine, the domain façades and
//! (as JSON) the HTTP surface.

mod error;
mod patch;
mod record;
mod schema;
mod status;

pub use error::{ModelError, TransitionRejected, ValidationError};
pub use patch::{Patch, apply_patch};
pub use record::{Record, require_non_empty};
pub use schema::{CollectionSchema, Insertion};
pub use status::StatusMachine;
