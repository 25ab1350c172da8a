mod common;

use common::{memory, root};
use pretty_assertions::assert_eq;
use serde_json::json;
use syncscript_domains::SearchHubStore;
use syncscript_domains::search::{HISTORY_RETENTION, NewSavedFilter};
use syncscript_model::Patch;
use syncscript_store::{StoreConfig, StoreError, StoreFacade};

fn store() -> SearchHubStore {
    SearchHubStore::new(memory(), &root(), StoreConfig::empty()).unwrap()
}

fn filter(name: &str, query: &str) -> NewSavedFilter {
    NewSavedFilter {
        name: name.to_string(),
        query: query.to_string(),
        criteria: Default::default(),
    }
}

#[tokio::test]
async fn filter_crud() {
    let store = store();
    let saved = store.save_filter(filter("Bugs", "label:bug")).await.unwrap();
    assert_eq!(store.list_filters().await, vec![saved.clone()]);

    let updated = store
        .update_filter(&saved.id, &Patch::new().with("criteria", json!({ "status": "open" })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.query, "label:bug");
    assert_eq!(updated.criteria["status"], "open");

    assert!(store.delete_filter(&saved.id).await.unwrap());
    assert!(!store.delete_filter(&saved.id).await.unwrap());
    assert!(store.list_filters().await.is_empty());
}

#[tokio::test]
async fn filter_needs_query_or_criteria() {
    let store = store();
    let err = store.save_filter(filter("Empty", "  ")).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = store
        .update_filter(
            &store.save_filter(filter("Ok", "x")).await.unwrap().id,
            &Patch::new().with("query", 42),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn history_is_newest_first_and_capped() {
    let store = store();
    for i in 0..HISTORY_RETENTION + 3 {
        store.record_search(&format!("query {i}"), i as u32).await.unwrap();
    }

    let recent = store.recent_searches(3).await;
    let queries: Vec<_> = recent.iter().map(|e| e.query.as_str()).collect();
    assert_eq!(queries, vec!["query 52", "query 51", "query 50"]);
    assert_eq!(store.recent_searches(usize::MAX).await.len(), HISTORY_RETENTION);
}

#[tokio::test]
async fn blank_search_is_rejected() {
    let store = store();
    assert!(matches!(
        store.record_search("   ", 0).await,
        Err(StoreError::Validation(_))
    ));
    assert!(store.recent_searches(10).await.is_empty());
}

#[tokio::test]
async fn seeded_filters() {
    let store = SearchHubStore::new(memory(), &root(), StoreConfig::default()).unwrap();
    store.init().await;
    let names: Vec<_> = store.list_filters().await.into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["My open tasks", "Recently edited documents"]);
    assert!(store.recent_searches(5).await.is_empty());
}
