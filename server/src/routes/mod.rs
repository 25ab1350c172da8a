mod collaboration;
mod integrations;
mod performance;
mod search;
mod threats;

use crate::error::{ApiError, ApiResult};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use syncscript_domains::{Workspace, WorkspaceStatus};
use syncscript_types::RecordId;

pub(crate) type AppState = Arc<Workspace>;

pub(crate) fn api() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/persistence/flush", post(flush))
        .merge(collaboration::routes())
        .merge(threats::routes())
        .merge(performance::routes())
        .merge(search::routes())
        .merge(integrations::routes())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    namespace: String,
    persistence: WorkspaceStatus,
}

async fn health(State(ws): State<AppState>) -> Json<HealthResponse> {
    let persistence = ws.persistence_status();
    Json(HealthResponse {
        status: if persistence.degraded { "degraded" } else { "ok" },
        namespace: ws.namespace().to_string(),
        persistence,
    })
}

#[derive(Serialize)]
struct FlushResponse {
    flushed: bool,
}

async fn flush(State(ws): State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        flushed: ws.flush().await,
    })
}

pub(crate) fn parse_id(raw: &str) -> ApiResult<RecordId> {
    RecordId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Turns a missing record into a 404.
pub(crate) fn found<T>(value: Option<T>, what: &str, id: &RecordId) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::NotFound(format!("{what} {id}")))
}
