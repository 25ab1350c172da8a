#![allow(dead_code)]

use std::sync::Arc;
use syncscript_storage::{MemoryAdapter, PersistenceAdapter};
use syncscript_types::{Namespace, Timestamp};

pub fn root() -> Namespace {
    Namespace::new("syncscript").unwrap()
}

pub fn memory() -> Arc<dyn PersistenceAdapter> {
    Arc::new(MemoryAdapter::new())
}

pub fn ts(iso: &str) -> Timestamp {
    Timestamp::parse(iso).unwrap()
}
