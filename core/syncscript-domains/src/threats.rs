//! Threat events, security incidents and the access log.

use crate::seed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use syncscript_model::{
    CollectionSchema, Record, StatusMachine, TransitionRejected, ValidationError, require_non_empty,
};
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{Collection, StoreConfig, StoreContext, StoreFacade, StoreResult};
use syncscript_types::{Namespace, RecordId, Timestamp};
use tracing::{info, warn};

pub const NAMESPACE: &str = "threat_detection";
pub const THREAT_EVENTS: &str = "threat_events";
pub const INCIDENTS: &str = "incidents";
pub const ACCESS_LOGS: &str = "access_logs";

/// Threat events and access log entries kept per collection.
pub const LOG_RETENTION: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatStatus {
    Detected,
    Investigating,
    Mitigated,
    FalsePositive,
}

impl StatusMachine for ThreatStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Detected => &[Self::Investigating, Self::Mitigated, Self::FalsePositive],
            Self::Investigating => &[Self::Mitigated, Self::FalsePositive],
            Self::Mitigated | Self::FalsePositive => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Contained,
    Resolved,
}

impl StatusMachine for IncidentStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Investigating, Self::Contained, Self::Resolved],
            Self::Investigating => &[Self::Contained, Self::Resolved],
            Self::Contained => &[Self::Resolved],
            Self::Resolved => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    Allowed,
    Denied,
}

// ── Threat events ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatEvent {
    pub id: RecordId,
    /// Free-form classifier such as `brute_force` or `malware`.
    pub category: String,
    pub severity: Severity,
    pub status: ThreatStatus,
    /// Origin of the activity (address, host or account).
    pub source: String,
    pub description: String,
    pub detected_at: Timestamp,
    pub last_modified: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThreat {
    pub category: String,
    pub severity: Severity,
    pub source: String,
    #[serde(default)]
    pub description: String,
}

impl Record for ThreatEvent {
    type Draft = NewThreat;
    const KIND: &'static str = "threat_event";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["detectedAt", "category", "source"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewThreat) -> Self {
        Self {
            id,
            category: draft.category,
            severity: draft.severity,
            status: ThreatStatus::Detected,
            source: draft.source,
            description: draft.description,
            detected_at: now,
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
        require_non_empty("category", &self.category)?;
        require_non_empty("source", &self.source)
    }

    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        self.status.transition(next.status).map(|_| ())
    }
}

// ── Incidents ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentAction {
    pub actor: String,
    pub description: String,
    pub at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: RecordId,
    pub title: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub threat_ids: Vec<RecordId>,
    pub assignee: Option<String>,
    pub actions: Vec<IncidentAction>,
    pub opened_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    pub last_modified: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub title: String,
    pub severity: Severity,
    #[serde(default)]
    pub threat_ids: Vec<RecordId>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl Record for Incident {
    type Draft = NewIncident;
    const KIND: &'static str = "incident";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["openedAt", "actions"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewIncident) -> Self {
        Self {
            id,
            title: draft.title,
            severity: draft.severity,
            status: IncidentStatus::Open,
            threat_ids: draft.threat_ids,
            assignee: draft.assignee,
            actions: Vec::new(),
            opened_at: now,
            resolved_at: None,
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
        require_non_empty("title", &self.title)
    }

    fn check_transition(&self, next: &Self) -> Result<(), TransitionRejected> {
        self.status.transition(next.status).map(|_| ())
    }
}

// ── Access log ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    pub id: RecordId,
    pub actor: String,
    pub resource: String,
    pub action: String,
    pub outcome: AccessOutcome,
    pub source: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccessLog {
    pub actor: String,
    pub resource: String,
    pub action: String,
    pub outcome: AccessOutcome,
    #[serde(default)]
    pub source: String,
}

impl Record for AccessLog {
    type Draft = NewAccessLog;
    const KIND: &'static str = "access_log";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["timestamp"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewAccessLog) -> Self {
        Self {
            id,
            actor: draft.actor,
            resource: draft.resource,
            action: draft.action,
            outcome: draft.outcome,
            source: draft.source,
            timestamp: now,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("actor", &self.actor)?;
        require_non_empty("resource", &self.resource)?;
        require_non_empty("action", &self.action)
    }
}

// ── Store ────────────────────────────────────────────────────────

/// Result of [`ThreatDetectionStore::record_threat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedThreat {
    pub threat: ThreatEvent,
    /// Opened automatically for critical threats.
    pub incident: Option<Incident>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatSummary {
    pub total_threats: usize,
    /// Detected or under investigation.
    pub active_threats: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub open_incidents: usize,
    pub access_events: usize,
    pub denied_access: usize,
}

pub struct ThreatDetectionStore {
    ctx: Arc<StoreContext>,
    threats: Collection<ThreatEvent>,
    incidents: Collection<Incident>,
    access: Collection<AccessLog>,
}

impl ThreatDetectionStore {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        parent: &Namespace,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let ctx = StoreContext::new(adapter, parent.child(NAMESPACE)?, config);
        let threats = Collection::new(
            ctx.clone(),
            CollectionSchema::prepend(THREAT_EVENTS).with_retention(LOG_RETENTION),
        )?
        .with_seed(seed_threats);
        let incidents =
            Collection::new(ctx.clone(), CollectionSchema::prepend(INCIDENTS))?.with_seed(seed_incidents);
        let access = Collection::new(
            ctx.clone(),
            CollectionSchema::append(ACCESS_LOGS)
                .with_retention(LOG_RETENTION)
                .append_only(),
        )?
        .with_seed(seed_access_logs);
        Ok(Self {
            ctx,
            threats,
            incidents,
            access,
        })
    }

    /// Records a threat. A critical threat also opens an incident that
    /// references it; if that second write fails the threat is kept and
    /// `incident` is `None`.
    pub async fn record_threat(&self, draft: NewThreat) -> StoreResult<RecordedThreat> {
        let threat = self.threats.create(draft).await?;
        info!(id = %threat.id, category = %threat.category, severity = ?threat.severity, "threat recorded");

        if threat.severity != Severity::Critical {
            return Ok(RecordedThreat { threat, incident: None });
        }

        let incident = NewIncident {
            title: format!("Critical {} from {}", threat.category, threat.source),
            severity: Severity::Critical,
            threat_ids: vec![threat.id.clone()],
            assignee: None,
        };
        let incident = match self.incidents.create(incident).await {
            Ok(incident) => Some(incident),
            Err(e) => {
                warn!(threat = %threat.id, error = %e, "failed to open incident for critical threat");
                None
            }
        };
        Ok(RecordedThreat { threat, incident })
    }

    pub async fn update_threat_status(
        &self,
        id: &RecordId,
        status: ThreatStatus,
    ) -> StoreResult<Option<ThreatEvent>> {
        self.threats.update_with(id, |t| t.status = status).await
    }

    /// Newest first.
    pub async fn list_threats(&self) -> Vec<ThreatEvent> {
        self.threats.list().await
    }

    pub async fn get_threat(&self, id: &RecordId) -> Option<ThreatEvent> {
        self.threats.get(id).await
    }

    pub async fn threats_by_severity(&self, severity: Severity) -> Vec<ThreatEvent> {
        self.threats.find(|t| t.severity == severity).await
    }

    pub async fn open_incident(&self, draft: NewIncident) -> StoreResult<Incident> {
        self.incidents.create(draft).await
    }

    pub async fn list_incidents(&self) -> Vec<Incident> {
        self.incidents.list().await
    }

    pub async fn get_incident(&self, id: &RecordId) -> Option<Incident> {
        self.incidents.get(id).await
    }

    pub async fn update_incident_status(
        &self,
        id: &RecordId,
        status: IncidentStatus,
    ) -> StoreResult<Option<Incident>> {
        let now = Timestamp::now();
        self.incidents
            .update_with(id, |incident| {
                incident.status = status;
                if status == IncidentStatus::Resolved {
                    incident.resolved_at.get_or_insert(now);
                }
            })
            .await
    }

    pub async fn add_incident_action(
        &self,
        id: &RecordId,
        actor: &str,
        description: &str,
    ) -> StoreResult<Option<Incident>> {
        require_non_empty("actor", actor)?;
        require_non_empty("description", description)?;
        let action = IncidentAction {
            actor: actor.to_string(),
            description: description.to_string(),
            at: Timestamp::now(),
        };
        self.incidents
            .update_with(id, move |incident| incident.actions.push(action))
            .await
    }

    pub async fn log_access(&self, draft: NewAccessLog) -> StoreResult<AccessLog> {
        let entry = self.access.create(draft).await?;
        if entry.outcome == AccessOutcome::Denied {
            warn!(actor = %entry.actor, resource = %entry.resource, "access denied");
        }
        Ok(entry)
    }

    /// Oldest first.
    pub async fn access_logs(&self) -> Vec<AccessLog> {
        self.access.list().await
    }

    pub async fn denied_access_for(&self, actor: &str) -> Vec<AccessLog> {
        self.access
            .find(|log| log.outcome == AccessOutcome::Denied && log.actor == actor)
            .await
    }

    pub async fn summary(&self) -> ThreatSummary {
        let mut summary = ThreatSummary::default();
        for threat in self.threats.list().await {
            summary.total_threats += 1;
            if matches!(threat.status, ThreatStatus::Detected | ThreatStatus::Investigating) {
                summary.active_threats += 1;
            }
            *summary.by_severity.entry(threat.severity).or_default() += 1;
        }
        summary.open_incidents = self
            .incidents
            .find(|i| i.status != IncidentStatus::Resolved)
            .await
            .len();
        let access = self.access.list().await;
        summary.access_events = access.len();
        summary.denied_access = access
            .iter()
            .filter(|log| log.outcome == AccessOutcome::Denied)
            .count();
        summary
    }
}

impl StoreFacade for ThreatDetectionStore {
    fn context(&self) -> &Arc<StoreContext> {
        &self.ctx
    }

    async fn init(&self) {
        self.threats.init().await;
        self.incidents.init().await;
        self.access.init().await;
    }

    async fn flush(&self) -> bool {
        let threats = self.threats.flush().await;
        let incidents = self.incidents.flush().await;
        let access = self.access.flush().await;
        self.ctx.finish_flush(threats && incidents && access)
    }
}

fn seed_threats() -> Vec<ThreatEvent> {
    vec![
        ThreatEvent {
            id: RecordId::fixed("threat-brute-force"),
            category: "brute_force".to_string(),
            severity: Severity::High,
            status: ThreatStatus::Investigating,
            source: "203.0.113.42".to_string(),
            description: "Repeated failed logins against the admin account".to_string(),
            detected_at: seed::at(-30),
            last_modified: seed::at(-20),
        },
        ThreatEvent {
            id: RecordId::fixed("threat-port-scan"),
            category: "port_scan".to_string(),
            severity: Severity::Low,
            status: ThreatStatus::Mitigated,
            source: "198.51.100.7".to_string(),
            description: "Sequential port probe blocked at the edge".to_string(),
            detected_at: seed::at(-180),
            last_modified: seed::at(-170),
        },
    ]
}

fn seed_incidents() -> Vec<Incident> {
    vec![Incident {
        id: RecordId::fixed("incident-admin-login"),
        title: "Admin account under brute-force attack".to_string(),
        severity: Severity::High,
        status: IncidentStatus::Investigating,
        threat_ids: vec![RecordId::fixed("threat-brute-force")],
        assignee: Some("security-team".to_string()),
        actions: vec![IncidentAction {
            actor: "security-team".to_string(),
            description: "Rate limiting enabled on the login endpoint".to_string(),
            at: seed::at(-20),
        }],
        opened_at: seed::at(-25),
        resolved_at: None,
        last_modified: seed::at(-20),
    }]
}

fn seed_access_logs() -> Vec<AccessLog> {
    vec![
        AccessLog {
            id: RecordId::fixed("access-1"),
            actor: "alex.chen".to_string(),
            resource: "/projects/roadmap".to_string(),
            action: "read".to_string(),
            outcome: AccessOutcome::Allowed,
            source: "10.0.0.12".to_string(),
            timestamp: seed::at(-60),
        },
        AccessLog {
            id: RecordId::fixed("access-2"),
            actor: "unknown".to_string(),
            resource: "/admin".to_string(),
            action: "login".to_string(),
            outcome: AccessOutcome::Denied,
            source: "203.0.113.42".to_string(),
            timestamp: seed::at(-30),
        },
    ]
}
