mod common;

use common::{Note, draft, memory_context};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use syncscript_model::{CollectionSchema, Patch};
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{ChangeEvent, ChangeKind, Collection, Listeners};

#[tokio::test]
async fn listeners_see_every_mutation_in_order() {
    let (_, ctx) = memory_context();
    let notes = Collection::<Note>::new(ctx.clone(), CollectionSchema::append("notes")).unwrap();
    let seen: Arc<Mutex<Vec<ChangeKind>>> = Arc::default();

    let sink = seen.clone();
    ctx.add_listener(move |event| sink.lock().unwrap().push(event.kind));

    let note = notes.create(draft("a")).await.unwrap();
    notes
        .update(&note.id, &Patch::new().with("pinned", true))
        .await
        .unwrap();
    notes.remove(&note.id).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![ChangeKind::Created, ChangeKind::Updated, ChangeKind::Removed]
    );
}

#[tokio::test]
async fn failed_mutation_does_not_notify() {
    let (_, ctx) = memory_context();
    let notes = Collection::<Note>::new(ctx.clone(), CollectionSchema::append("notes")).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    ctx.add_listener(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(notes.create(draft("")).await.is_err());
    notes
        .update(&syncscript_types::RecordId::fixed("nope"), &Patch::new().with("pinned", true))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn listener_can_read_store_state() {
    let (_, ctx) = memory_context();
    let notes = Arc::new(Collection::<Note>::new(ctx.clone(), CollectionSchema::append("notes")).unwrap());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    ctx.add_listener(move |event: &ChangeEvent| {
        let _ = tx.send(event.clone());
    });
    let created = notes.create(draft("a")).await.unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.collection, "notes");
    assert_eq!(event.record_id.as_ref(), Some(&created.id));
    // The lock is released before listeners run.
    assert_eq!(notes.get(&created.id).await, Some(created));
}

#[test]
fn panicking_listener_is_isolated() {
    let listeners = Listeners::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = order.clone();
    listeners.add(move |_| first.lock().unwrap().push("first"));
    listeners.add(|_| panic!("listener exploded"));
    let third = order.clone();
    listeners.add(move |_| third.lock().unwrap().push("third"));

    let failures = listeners.notify(&ChangeEvent::new("notes", ChangeKind::Created, None));

    assert_eq!(failures, 1);
    assert_eq!(*order.lock().unwrap(), vec!["first", "third"]);
}

#[tokio::test]
async fn panicking_listener_does_not_undo_the_write() {
    let (adapter, ctx) = memory_context();
    let notes = Collection::<Note>::new(ctx.clone(), CollectionSchema::append("notes")).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    ctx.add_listener(|_| panic!("listener exploded"));
    let counter = calls.clone();
    ctx.add_listener(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let note = notes.create(draft("survives")).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(notes.list().await, vec![note.clone()]);
    let blob = adapter.load(notes.key()).unwrap().unwrap();
    assert!(blob.contains(note.id.as_str()));
    assert!(blob.contains("survives"));
}

#[test]
fn removed_listener_is_not_called() {
    let listeners = Listeners::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let id = listeners.add(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(listeners.len(), 1);

    assert!(listeners.remove(id));
    assert!(!listeners.remove(id));
    listeners.notify(&ChangeEvent::new("notes", ChangeKind::Updated, None));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(listeners.is_empty());
}
