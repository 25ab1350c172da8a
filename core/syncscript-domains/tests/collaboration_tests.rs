mod common;

use common::{memory, root, ts};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use syncscript_domains::CollaborationStore;
use syncscript_domains::collaboration::{CallStatus, NewVideoCall};
use syncscript_model::Patch;
use syncscript_store::{ChangeKind, StoreConfig, StoreError, StoreFacade};
use syncscript_types::RecordId;

fn store() -> CollaborationStore {
    CollaborationStore::new(memory(), &root(), StoreConfig::empty()).unwrap()
}

fn standup() -> NewVideoCall {
    NewVideoCall {
        title: "Standup".to_string(),
        host: "Alex".to_string(),
        participants: vec!["Alex".to_string(), "Sam".to_string(), "Alex".to_string()],
        scheduled_for: ts("2024-03-01T09:00:00.000Z"),
        duration_minutes: 15,
    }
}

#[tokio::test]
async fn call_lifecycle_scenario() {
    let store = store();

    let call = store.schedule_call(standup()).await.unwrap();
    assert_eq!(call.status, CallStatus::Scheduled);
    assert_eq!(store.list_calls().await, vec![call.clone()]);

    let active = store
        .update_call(&call.id, &Patch::new().with("status", "active"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.status, CallStatus::Active);
    assert_eq!(active.title, "Standup");

    assert!(store.delete_call(&call.id).await.unwrap());
    assert!(store.list_calls().await.is_empty());
}

#[tokio::test]
async fn schedule_dedups_participants() {
    let store = store();
    let call = store.schedule_call(standup()).await.unwrap();
    assert_eq!(call.participants, vec!["Alex", "Sam"]);
}

#[tokio::test]
async fn schedule_rejects_missing_title() {
    let store = store();
    let err = store
        .schedule_call(NewVideoCall {
            title: String::new(),
            ..standup()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.list_calls().await.is_empty());
}

#[tokio::test]
async fn start_and_end_stamp_times() {
    let store = store();
    let call = store.schedule_call(standup()).await.unwrap();

    let started = store.start_call(&call.id).await.unwrap().unwrap();
    assert_eq!(started.status, CallStatus::Active);
    assert!(started.started_at.is_some());

    let ended = store.end_call(&call.id).await.unwrap().unwrap();
    assert_eq!(ended.status, CallStatus::Ended);
    assert_eq!(ended.started_at, started.started_at);
    assert!(ended.ended_at >= ended.started_at);
}

#[tokio::test]
async fn finished_call_cannot_restart() {
    let store = store();
    let call = store.schedule_call(standup()).await.unwrap();
    store.cancel_call(&call.id).await.unwrap();

    let err = store.start_call(&call.id).await.unwrap_err();
    match err {
        StoreError::Transition(rejected) => {
            assert_eq!(rejected.from, "cancelled");
            assert_eq!(rejected.to, "active");
        }
        other => panic!("expected transition error, got {other:?}"),
    }

    let err = store
        .update_call(&call.id, &Patch::new().with("status", "scheduled"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transition(_)));
    assert_eq!(store.get_call(&call.id).await.unwrap().status, CallStatus::Cancelled);
}

#[tokio::test]
async fn participants_and_chat() {
    let store = store();
    let call = store.schedule_call(standup()).await.unwrap();

    store.add_participant(&call.id, "Jordan").await.unwrap();
    let call = store.add_participant(&call.id, "Jordan").await.unwrap().unwrap();
    assert_eq!(call.participants, vec!["Alex", "Sam", "Jordan"]);

    let call = store
        .add_chat_message(&call.id, "Sam", "joining in 2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(call.chat_messages.len(), 1);
    assert_eq!(call.chat_messages[0].author, "Sam");

    assert!(matches!(
        store.add_chat_message(&call.id, "Sam", " ").await,
        Err(StoreError::Validation(_))
    ));
    assert_eq!(
        store
            .add_participant(&RecordId::fixed("missing"), "Jordan")
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn chat_cannot_be_patched_directly() {
    let store = store();
    let call = store.schedule_call(standup()).await.unwrap();
    let err = store
        .update_call(&call.id, &Patch::new().with("chatMessages", serde_json::json!([])))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn newest_call_listed_first_and_filtered_by_status() {
    let store = store();
    let first = store.schedule_call(standup()).await.unwrap();
    let second = store
        .schedule_call(NewVideoCall {
            title: "Retro".to_string(),
            ..standup()
        })
        .await
        .unwrap();
    store.start_call(&first.id).await.unwrap();

    let ids: Vec<_> = store.list_calls().await.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

    let active = store.calls_by_status(CallStatus::Active).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first.id);
}

#[tokio::test]
async fn seeded_store_summary() {
    let store = CollaborationStore::new(memory(), &root(), StoreConfig::default()).unwrap();
    store.init().await;

    let summary = store.summary().await;
    assert_eq!(summary.total_calls, 2);
    assert_eq!(summary.scheduled, 1);
    assert_eq!(summary.ended, 1);
    assert_eq!(summary.total_participants, 5);
    assert_eq!(summary.total_messages, 1);

    let call = store.get_call(&RecordId::fixed("call-sprint-planning")).await.unwrap();
    assert_eq!(call.created_at, ts("2024-01-15T09:00:00.000Z"));
}

#[tokio::test]
async fn listeners_observe_call_changes() {
    let store = store();
    let kinds: Arc<Mutex<Vec<ChangeKind>>> = Arc::default();
    let sink = kinds.clone();
    let id = store.add_listener(move |event| {
        assert_eq!(event.collection, "video_calls");
        sink.lock().unwrap().push(event.kind);
    });

    let call = store.schedule_call(standup()).await.unwrap();
    store.start_call(&call.id).await.unwrap();
    assert!(store.remove_listener(id));
    store.end_call(&call.id).await.unwrap();

    assert_eq!(*kinds.lock().unwrap(), vec![ChangeKind::Created, ChangeKind::Updated]);
}

#[tokio::test]
async fn calls_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let adapter: Arc<dyn syncscript_storage::PersistenceAdapter> =
        Arc::new(syncscript_storage::FileAdapter::open(dir.path()).unwrap());

    let before = {
        let store = CollaborationStore::new(adapter.clone(), &root(), StoreConfig::empty()).unwrap();
        let call = store.schedule_call(standup()).await.unwrap();
        store.add_chat_message(&call.id, "Alex", "hi").await.unwrap();
        store.list_calls().await
    };

    let store = CollaborationStore::new(adapter, &root(), StoreConfig::empty()).unwrap();
    assert_eq!(store.list_calls().await, before);
    assert!(dir.path().join("syncscript.collaboration.video_calls.json").exists());
}
