//! Video calls and their chat.

use crate::seed;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use syncscript_model::{
    CollectionSchema, Patch, Record, StatusMachine, TransitionRejected, ValidationError, require_non_empty,
};
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{Collection, StoreConfig, StoreContext, StoreFacade, StoreResult};
use syncscript_types::{Namespace, RecordId, Timestamp};
use tracing::info;

pub const NAMESPACE: &str = "collaboration";
pub const VIDEO_CALLS: &str = "video_calls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Scheduled,
    Active,
    Ended,
    Cancelled,
}

impl StatusMachine for CallStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::Ended],
            Self::Ended | Self::Cancelled => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: RecordId,
    pub author: String,
    pub body: String,
    pub sent_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCall {
    pub id: RecordId,
    pub title: String,
    pub host: String,
    pub participants: Vec<String>,
    pub status: CallStatus,
    pub scheduled_for: Timestamp,
    pub duration_minutes: u32,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub chat_messages: Vec<ChatMessage>,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

/// Input to [`CollaborationStore::schedule_call`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideoCall {
    pub title: String,
    pub host: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub scheduled_for: Timestamp,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
}

fn default_duration() -> u32 {
    30
}

impl Record for VideoCall {
    type Draft = NewVideoCall;
    const KIND: &'static str = "video_call";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt", "chatMessages"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewVideoCall) -> Self {
        let mut participants: Vec<String> = Vec::with_capacity(draft.participants.len());
        for name in draft.participants {
            if !participants.contains(&name) {
                participants.push(name);
            }
        }
        Self {
            id,
            title: draft.title,
            host: draft.host,
            participants,
            status: CallStatus::Scheduled,
            scheduled_for: draft.scheduled_for,
            duration_minutes: draft.duration_minutes,
            started_at: None,
            ended_at: None,
            chat_messages: Vec::new(),
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
        require_non_empty("host", &self.host)?;
        if self.duration_minutes == 0 {
            return Err(ValidationError::invalid("durationMinutes", "must be positive"));
        }
        if self.participants.iter().any(|p| p.trim().is_empty()) {
            return Err(ValidationError::invalid("participants", "names must not be empty"));
        }
        Ok(())
    }

    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        self.status.transition(next.status).map(|_| ())
    }
}

/// Per-status counts for dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationSummary {
    pub total_calls: usize,
    pub scheduled: usize,
    pub active: usize,
    pub ended: usize,
    pub cancelled: usize,
    pub total_participants: usize,
    pub total_messages: usize,
}

pub struct CollaborationStore {
    ctx: Arc<StoreContext>,
    calls: Collection<VideoCall>,
}

impl CollaborationStore {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        parent: &Namespace,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let ctx = StoreContext::new(adapter, parent.child(NAMESPACE)?, config);
        let calls = Collection::new(ctx.clone(), CollectionSchema::prepend(VIDEO_CALLS))?
            .with_seed(seed_calls);
        Ok(Self { ctx, calls })
    }

    pub async fn schedule_call(&self, draft: NewVideoCall) -> StoreResult<VideoCall> {
        let call = self.calls.create(draft).await?;
        info!(id = %call.id, title = %call.title, "call scheduled");
        Ok(call)
    }

    /// Shallow-merges `patch` into a call. Status changes are checked
    /// against the call lifecycle.
    pub async fn update_call(&self, id: &RecordId, patch: &Patch) -> StoreResult<Option<VideoCall>> {
        self.calls.update(id, patch).await
    }

    pub async fn start_call(&self, id: &RecordId) -> StoreResult<Option<VideoCall>> {
        let now = Timestamp::now();
        self.calls
            .update_with(id, |call| {
                call.status = CallStatus::Active;
                call.started_at.get_or_insert(now);
            })
            .await
    }

    pub async fn end_call(&self, id: &RecordId) -> StoreResult<Option<VideoCall>> {
        let now = Timestamp::now();
        self.calls
            .update_with(id, |call| {
                call.status = CallStatus::Ended;
                call.ended_at.get_or_insert(now);
            })
            .await
    }

    pub async fn cancel_call(&self, id: &RecordId) -> StoreResult<Option<VideoCall>> {
        self.calls
            .update_with(id, |call| call.status = CallStatus::Cancelled)
            .await
    }

    pub async fn delete_call(&self, id: &RecordId) -> StoreResult<bool> {
        self.calls.remove(id).await
    }

    /// Adds `name` to the participant list unless already present.
    pub async fn add_participant(&self, id: &RecordId, name: &str) -> StoreResult<Option<VideoCall>> {
        require_non_empty("participant", name)?;
        self.calls
            .update_with(id, |call| {
                if !call.participants.iter().any(|p| p == name) {
                    call.participants.push(name.to_string());
                }
            })
            .await
    }

    pub async fn add_chat_message(
        &self,
        id: &RecordId,
        author: &str,
        body: &str,
    ) -> StoreResult<Option<VideoCall>> {
        require_non_empty("author", author)?;
        require_non_empty("body", body)?;
        let message = ChatMessage {
            id: RecordId::generate(),
            author: author.to_string(),
            body: body.to_string(),
            sent_at: Timestamp::now(),
        };
        self.calls
            .update_with(id, move |call| call.chat_messages.push(message))
            .await
    }

    pub async fn get_call(&self, id: &RecordId) -> Option<VideoCall> {
        self.calls.get(id).await
    }

    /// Most recently scheduled first.
    pub async fn list_calls(&self) -> Vec<VideoCall> {
        self.calls.list().await
    }

    pub async fn calls_by_status(&self, status: CallStatus) -> Vec<VideoCall> {
        self.calls.find(|c| c.status == status).await
    }

    pub async fn summary(&self) -> CollaborationSummary {
        self.calls
            .list()
            .await
            .iter()
            .fold(CollaborationSummary::default(), |mut s, call| {
                s.total_calls += 1;
                match call.status {
                    CallStatus::Scheduled => s.scheduled += 1,
                    CallStatus::Active => s.active += 1,
                    CallStatus::Ended => s.ended += 1,
                    CallStatus::Cancelled => s.cancelled += 1,
                }
                s.total_participants += call.participants.len();
                s.total_messages += call.chat_messages.len();
                s
            })
    }
}

impl StoreFacade for CollaborationStore {
    fn context(&self) -> &Arc<StoreContext> {
        &self.ctx
    }

    async fn init(&self) {
        self.calls.init().await;
    }

    async fn flush(&self) -> bool {
        let ok = self.calls.flush().await;
        self.ctx.finish_flush(ok)
    }
}

fn seed_calls() -> Vec<VideoCall> {
    vec![
        VideoCall {
            id: RecordId::fixed("call-sprint-planning"),
            title: "Sprint Planning".to_string(),
            host: "Alex Chen".to_string(),
            participants: vec![
                "Alex Chen".to_string(),
                "Sam Rivera".to_string(),
                "Jordan Lee".to_string(),
            ],
            status: CallStatus::Scheduled,
            scheduled_for: seed::at(24 * 60),
            duration_minutes: 60,
            started_at: None,
            ended_at: None,
            chat_messages: Vec::new(),
            created_at: seed::at(0),
            last_modified: seed::at(0),
        },
        VideoCall {
            id: RecordId::fixed("call-design-review"),
            title: "Design Review".to_string(),
            host: "Sam Rivera".to_string(),
            participants: vec!["Sam Rivera".to_string(), "Morgan Patel".to_string()],
            status: CallStatus::Ended,
            scheduled_for: seed::at(-120),
            duration_minutes: 45,
            started_at: Some(seed::at(-120)),
            ended_at: Some(seed::at(-75)),
            chat_messages: vec![ChatMessage {
                id: RecordId::fixed("msg-design-review-1"),
                author: "Morgan Patel".to_string(),
                body: "Mockups are in the shared folder.".to_string(),
                sent_at: seed::at(-110),
            }],
            created_at: seed::at(-1_440),
            last_modified: seed::at(-75),
        },
    ]
}
