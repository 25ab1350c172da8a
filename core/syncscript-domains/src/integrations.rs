//! Outgoing webhooks and the integration audit trail.
//!
//! Every webhook mutation writes an audit entry after the webhook itself
//! has been saved. An audit write that fails is logged and does not undo
//! the webhook change.

use crate::seed;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use syncscript_model::{
    CollectionSchema, Patch, Record, StatusMachine, TransitionRejected, ValidationError, require_non_empty,
};
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{Collection, StoreConfig, StoreContext, StoreFacade, StoreResult};
use syncscript_types::{Namespace, RecordId, Timestamp};
use tracing::{info, warn};

pub const NAMESPACE: &str = "integrations";
pub const WEBHOOKS: &str = "webhooks";
pub const AUDIT_LOG: &str = "audit_log";

pub const AUDIT_RETENTION: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    Active,
    Paused,
    Disabled,
}

impl StatusMachine for WebhookStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Paused, Self::Disabled],
            Self::Paused => &[Self::Active, Self::Disabled],
            Self::Disabled => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: RecordId,
    pub name: String,
    pub url: String,
    /// Event names this hook subscribes to, e.g. `task.created`.
    pub events: Vec<String>,
    pub status: WebhookStatus,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
}

impl Record for Webhook {
    type Draft = NewWebhook;
    const KIND: &'static str = "webhook";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewWebhook) -> Self {
        Self {
            id,
            name: draft.name,
            url: draft.url,
            events: draft.events,
            status: WebhookStatus::Active,
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
        require_non_empty("url", &self.url)?;
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(ValidationError::invalid("url", "must be an http(s) URL"));
        }
        if self.events.is_empty() {
            return Err(ValidationError::MissingField("events".to_string()));
        }
        if self.events.iter().any(|e| e.trim().is_empty()) {
            return Err(ValidationError::invalid("events", "event names must not be empty"));
        }
        Ok(())
    }

    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        self.status.transition(next.status).map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    WebhookRegistered,
    WebhookUpdated,
    WebhookDeleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: RecordId,
    pub action: AuditAction,
    pub target: RecordId,
    pub detail: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub target: RecordId,
    pub detail: String,
}

impl Record for AuditEntry {
    type Draft = NewAuditEntry;
    const KIND: &'static str = "audit_entry";

    fn from_draft(id: RecordId, now: Timestamp, draft: NewAuditEntry) -> Self {
        Self {
            id,
            action: draft.action,
            target: draft.target,
            detail: draft.detail,
            timestamp: now,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

pub struct IntegrationStore {
    ctx: Arc<StoreContext>,
    webhooks: Collection<Webhook>,
    audit: Collection<AuditEntry>,
}

impl IntegrationStore {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        parent: &Namespace,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let ctx = StoreContext::new(adapter, parent.child(NAMESPACE)?, config);
        let webhooks = Collection::new(ctx.clone(), CollectionSchema::append(WEBHOOKS))?.with_seed(seed_webhooks);
        let audit = Collection::new(
            ctx.clone(),
            CollectionSchema::prepend(AUDIT_LOG)
                .with_retention(AUDIT_RETENTION)
                .append_only(),
        )?;
        Ok(Self { ctx, webhooks, audit })
    }

    pub async fn register_webhook(&self, draft: NewWebhook) -> StoreResult<Webhook> {
        let hook = self.webhooks.create(draft).await?;
        info!(id = %hook.id, url = %hook.url, "webhook registered");
        self.audit(AuditAction::WebhookRegistered, &hook.id, format!("{} -> {}", hook.name, hook.url))
            .await;
        Ok(hook)
    }

    /// Shallow-merges `patch`; status changes follow
    /// active ⇄ paused, either → disabled.
    pub async fn update_webhook(&self, id: &RecordId, patch: &Patch) -> StoreResult<Option<Webhook>> {
        let updated = self.webhooks.update(id, patch).await?;
        if let Some(hook) = &updated {
            let fields: Vec<&str> = patch.fields().collect();
            self.audit(AuditAction::WebhookUpdated, &hook.id, format!("changed {}", fields.join(", ")))
                .await;
        }
        Ok(updated)
    }

    pub async fn delete_webhook(&self, id: &RecordId) -> StoreResult<bool> {
        let removed = self.webhooks.remove(id).await?;
        if removed {
            self.audit(AuditAction::WebhookDeleted, id, String::new()).await;
        }
        Ok(removed)
    }

    pub async fn get_webhook(&self, id: &RecordId) -> Option<Webhook> {
        self.webhooks.get(id).await
    }

    pub async fn list_webhooks(&self) -> Vec<Webhook> {
        self.webhooks.list().await
    }

    /// Newest first.
    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit.list().await
    }

    async fn audit(&self, action: AuditAction, target: &RecordId, detail: String) {
        let entry = NewAuditEntry {
            action,
            target: target.clone(),
            detail,
        };
        if let Err(e) = self.audit.create(entry).await {
            warn!(webhook = %target, action = ?action, error = %e, "failed to write audit entry");
        }
    }
}

impl StoreFacade for IntegrationStore {
    fn context(&self) -> &Arc<StoreContext> {
        &self.ctx
    }

    async fn init(&self) {
        self.webhooks.init().await;
        self.audit.init().await;
    }

    async fn flush(&self) -> bool {
        let webhooks = self.webhooks.flush().await;
        let audit = self.audit.flush().await;
        self.ctx.finish_flush(webhooks && audit)
    }
}

fn seed_webhooks() -> Vec<Webhook> {
    vec![Webhook {
        id: RecordId::fixed("webhook-ci"),
        name: "CI notifications".to_string(),
        url: "https://ci.example.com/hooks/syncscript".to_string(),
        events: vec!["task.completed".to_string(), "document.published".to_string()],
        status: WebhookStatus::Active,
        created_at: seed::at(0),
        last_modified: seed::at(0),
    }]
}
