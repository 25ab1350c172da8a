//! Saved search filters and recent search history.

use crate::seed;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use syncscript_model::{CollectionSchema, Patch, Record, ValidationError, require_non_empty};
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{Collection, StoreConfig, StoreContext, StoreFacade, StoreResult};
use syncscript_types::{Namespace, RecordId, Timestamp};

pub const NAMESPACE: &str = "search_hub";
pub const SAVED_FILTERS: &str = "saved_filters";
pub const SEARCH_HISTORY: &str = "search_history";

pub const HISTORY_RETENTION: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub id: RecordId,
    pub name: String,
    pub query: String,
    /// Opaque filter criteria, e.g. `{"type": "task", "status": "open"}`.
    pub criteria: Map<String, Value>,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedFilter {
    pub name: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub criteria: Map<String, Value>,
}

impl Record for SavedFilter {
    type Draft = NewSavedFilter;
    const KIND: &'static str = "saved_filter";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewSavedFilter) -> Self {
        Self {
            id,
            name: draft.name,
            query: draft.query,
            criteria: draft.criteria,
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
        require_non_empty("name", &self.name)?;
        if self.query.trim().is_empty() && self.criteria.is_empty() {
            return Err(ValidationError::invalid("query", "a filter needs a query or criteria"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: RecordId,
    pub query: String,
    pub result_count: u32,
    pub searched_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSearchEntry {
    pub query: String,
    #[serde(default)]
    pub result_count: u32,
}

impl Record for SearchEntry {
    type Draft = NewSearchEntry;
    const KIND: &'static str = "search_entry";

    fn from_draft(id: RecordId, now: Timestamp, draft: NewSearchEntry) -> Self {
        Self {
            id,
            query: draft.query.trim().to_string(),
            result_count: draft.result_count,
            searched_at: now,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("query", &self.query)
    }
}

pub struct SearchHubStore {
    ctx: Arc<StoreContext>,
    filters: Collection<SavedFilter>,
    history: Collection<SearchEntry>,
}

impl SearchHubStore {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        parent: &Namespace,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let ctx = StoreContext::new(adapter, parent.child(NAMESPACE)?, config);
        let filters = Collection::new(ctx.clone(), CollectionSchema::append(SAVED_FILTERS))?.with_seed(seed_filters);
        let history = Collection::new(
            ctx.clone(),
            CollectionSchema::prepend(SEARCH_HISTORY)
                .with_retention(HISTORY_RETENTION)
                .append_only(),
        )?;
        Ok(Self { ctx, filters, history })
    }

    pub async fn save_filter(&self, draft: NewSavedFilter) -> StoreResult<SavedFilter> {
        self.filters.create(draft).await
    }

    pub async fn update_filter(&self, id: &RecordId, patch: &Patch) -> StoreResult<Option<SavedFilter>> {
        self.filters.update(id, patch).await
    }

    pub async fn delete_filter(&self, id: &RecordId) -> StoreResult<bool> {
        self.filters.remove(id).await
    }

    pub async fn get_filter(&self, id: &RecordId) -> Option<SavedFilter> {
        self.filters.get(id).await
    }

    pub async fn list_filters(&self) -> Vec<SavedFilter> {
        self.filters.list().await
    }

    /// Appends a query to the history; only the last
    /// [`HISTORY_RETENTION`] searches are kept.
    pub async fn record_search(&self, query: &str, result_count: u32) -> StoreResult<SearchEntry> {
        self.history
            .create(NewSearchEntry {
                query: query.to_string(),
                result_count,
            })
            .await
    }

    /// Up to `limit` searches, newest first.
    pub async fn recent_searches(&self, limit: usize) -> Vec<SearchEntry> {
        let mut recent = self.history.list().await;
        recent.truncate(limit);
        recent
    }
}

impl StoreFacade for SearchHubStore {
    fn context(&self) -> &Arc<StoreContext> {
        &self.ctx
    }

    async fn init(&self) {
        self.filters.init().await;
        self.history.init().await;
    }

    async fn flush(&self) -> bool {
        let filters = self.filters.flush().await;
        let history = self.history.flush().await;
        self.ctx.finish_flush(filters && history)
    }
}

fn seed_filters() -> Vec<SavedFilter> {
    let criteria = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<Map<String, Value>>()
    };
    vec![
        SavedFilter {
            id: RecordId::fixed("filter-open-tasks"),
            name: "My open tasks".to_string(),
            query: String::new(),
            criteria: criteria(&[("type", "task"), ("status", "open"), ("assignee", "me")]),
            created_at: seed::at(0),
            last_modified: seed::at(0),
        },
        SavedFilter {
            id: RecordId::fixed("filter-recent-docs"),
            name: "Recently edited documents".to_string(),
            query: "updated:7d".to_string(),
            criteria: criteria(&[("type", "document")]),
            created_at: seed::at(5),
            last_modified: seed::at(5),
        },
    ]
}
