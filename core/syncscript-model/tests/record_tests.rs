mod common;

use common::{NewTask, Task, make_task, ts};
use syncscript_model::{Record, ValidationError};
use syncscript_types::RecordId;

// ── from_draft ───────────────────────────────────────────────────

#[test]
fn from_draft_assigns_generated_fields() {
    let id = RecordId::generate();
    let task = Task::from_draft(
        id.clone(),
        ts(5_000),
        NewTask {
            title: "Write docs".into(),
            tags: vec![],
        },
    );
    assert_eq!(task.id(), &id);
    assert_eq!(task.created_at, ts(5_000));
    assert_eq!(task.last_modified, ts(5_000));
}

// ── Default hooks ────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Plain {
    id: RecordId,
}

impl Record for Plain {
    type Draft = ();
    const KIND: &'static str = "plain";

    fn from_draft(id: RecordId, _now: syncscript_types::Timestamp, _draft: ()) -> Self {
        Self { id }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[test]
fn default_validate_accepts_anything() {
    let p = Plain::from_draft(RecordId::fixed("p"), ts(0), ());
    assert!(p.validate().is_ok());
}

#[test]
fn default_transition_check_accepts_anything() {
    let a = Plain::from_draft(RecordId::fixed("a"), ts(0), ());
    let b = Plain::from_draft(RecordId::fixed("b"), ts(0), ());
    assert!(a.check_transition(&b).is_ok());
}

#[test]
fn default_touch_and_on_after_load_are_noops() {
    let mut p = Plain::from_draft(RecordId::fixed("p"), ts(0), ());
    p.touch(ts(10));
    p.on_after_load();
    assert_eq!(p.id, RecordId::fixed("p"));
}

#[test]
fn default_immutable_fields_is_empty() {
    assert!(Plain::IMMUTABLE_FIELDS.is_empty());
    assert_eq!(Task::IMMUTABLE_FIELDS, &["createdAt"]);
}

// ── Custom validation ────────────────────────────────────────────

#[test]
fn custom_validate_rejects_blank_title() {
    let task = make_task("   ");
    assert_eq!(
        task.validate().unwrap_err(),
        ValidationError::MissingField("title".into())
    );
}

#[test]
fn custom_validate_rejects_long_title() {
    let task = make_task(&"x".repeat(101));
    assert!(matches!(
        task.validate().unwrap_err(),
        ValidationError::InvalidField { field, .. } if field == "title"
    ));
}

#[test]
fn custom_validate_accepts_valid_title() {
    assert!(make_task("Good title").validate().is_ok());
}

// ── Serialization shape ──────────────────────────────────────────

#[test]
fn record_serializes_camel_case_with_iso_dates() {
    let json = serde_json::to_value(make_task("Ship it")).unwrap();
    assert_eq!(json["id"], "task-1");
    assert_eq!(json["status"], "todo");
    assert_eq!(json["createdAt"], "1970-01-01T00:00:01.000Z");
    assert!(json["estimate"].is_null());
}
