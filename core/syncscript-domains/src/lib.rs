//! Domain store façades for SyncScript.
//!
//! Each façade owns a child namespace and a fixed set of collections, and
//! exposes domain operations on top of the generic collection engine:
//!
//! - [`CollaborationStore`] — scheduled and live video calls with chat
//! - [`ThreatDetectionStore`] — threat events, incidents and the access log
//! - [`PerformanceStore`] — metrics with thresholds, alerts and simulated telemetry
//! - [`SearchHubStore`] — saved filters and recent search history
//! - [`IntegrationStore`] — webhooks and their audit trail
//!
//! [`Workspace`] composes all of them over one adapter.
//!
//! Operations that touch two collections (a critical threat opening an
//! incident, a webhook change writing an audit entry) run sequentially with
//! no rollback: if the second write fails the first one stands.

pub mod collaboration;
pub mod integrations;
pub mod performance;
pub mod search;
mod seed;
pub mod threats;
mod workspace;

pub use collaboration::CollaborationStore;
pub use integrations::IntegrationStore;
pub use performance::PerformanceStore;
pub use search::SearchHubStore;
pub use threats::ThreatDetectionStore;
pub use workspace::{Workspace, WorkspaceStatus};
