//! Shared test record for model tests.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use syncscript_model::{Record, StatusMachine, TransitionRejected, ValidationError, require_non_empty};
use syncscript_types::{RecordId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl StatusMachine for TaskStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Todo => &[Self::Doing, Self::Done],
            Self::Doing => &[Self::Done],
            Self::Done => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub estimate: Option<u32>,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

pub struct NewTask {
    pub title: String,
    pub tags: Vec<String>,
}

impl Record for Task {
    type Draft = NewTask;
    const KIND: &'static str = "task";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewTask) -> Self {
        Self {
            id,
            title: draft.title,
            status: TaskStatus::Todo,
            tags: draft.tags,
            estimate: None,
            created_at: now,
            last_modified: now,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn touch(&mut self, now: Timestamp) {
        self.last_modified = now;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("title", &self.title)?;
        if self.title.len() > 100 {
            return Err(ValidationError::invalid("title", "too long (max 100)"));
        }
        Ok(())
    }

    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        self.status.transition(next.status).map(|_| ())
    }
}

pub fn ts(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap()
}

pub fn make_task(title: &str) -> Task {
    Task::from_draft(
        RecordId::fixed("task-1"),
        ts(1_000),
        NewTask {
            title: title.to_string(),
            tags: vec!["work".to_string()],
        },
    )
}
