//! Shared fixtures for store tests.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use syncscript_model::{Record, StatusMachine, TransitionRejected, ValidationError, require_non_empty};
use syncscript_storage::{MemoryAdapter, PersistenceAdapter, StorageResult};
use syncscript_store::{StoreConfig, StoreContext};
use syncscript_types::{Namespace, RecordId, StorageKey, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    Draft,
    Published,
    Archived,
}

impl StatusMachine for NoteState {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Published, Self::Archived],
            Self::Published => &[Self::Archived],
            Self::Archived => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub body: String,
    pub state: NoteState,
    pub pinned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct NewNote {
    pub title: String,
    pub body: String,
}

pub fn draft(title: &str) -> NewNote {
    NewNote {
        title: title.to_string(),
        body: String::new(),
    }
}

impl Record for Note {
    type Draft = NewNote;
    const KIND: &'static str = "note";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewNote) -> Self {
        Self {
            id,
            title: draft.title,
            body: draft.body,
            state: NoteState::Draft,
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("title", &self.title)
    }

    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        self.state.transition(next.state).map(|_| ())
    }
}

pub fn seed_notes() -> Vec<Note> {
    let at = Timestamp::from_millis(1_700_000_000_000).unwrap();
    vec![
        Note {
            id: RecordId::fixed("note-welcome"),
            title: "Welcome".to_string(),
            body: "First note".to_string(),
            state: NoteState::Published,
            pinned: true,
            created_at: at,
            updated_at: at,
        },
        Note {
            id: RecordId::fixed("note-todo"),
            title: "Todo".to_string(),
            body: String::new(),
            state: NoteState::Draft,
            pinned: false,
            created_at: at,
            updated_at: at,
        },
    ]
}

pub fn namespace(name: &str) -> Namespace {
    Namespace::new(name).unwrap()
}

pub fn memory_context() -> (Arc<MemoryAdapter>, Arc<StoreContext>) {
    let adapter = Arc::new(MemoryAdapter::new());
    let ctx = StoreContext::new(adapter.clone(), namespace("test"), StoreConfig::empty());
    (adapter, ctx)
}

/// Wraps a memory adapter, counting loads and failing saves on demand.
#[derive(Default)]
pub struct ControlledAdapter {
    pub inner: MemoryAdapter,
    pub loads: AtomicU32,
    pub saves: AtomicU32,
    pub failing: AtomicBool,
}

impl ControlledAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn loads(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PersistenceAdapter for ControlledAdapter {
    fn name(&self) -> &'static str {
        "controlled"
    }

    fn load(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(key)
    }

    fn save(&self, key: &StorageKey, value: &str) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("quota exceeded").into());
        }
        self.inner.save(key, value)
    }

    fn remove(&self, key: &StorageKey) -> StorageResult<()> {
        self.inner.remove(key)
    }
}
