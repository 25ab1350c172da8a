use super::{AppState, found, parse_id};
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use syncscript_domains::integrations::{AuditEntry, NewWebhook, Webhook};
use syncscript_model::Patch;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks", get(list).post(register))
        .route("/webhooks/{id}", get(fetch).patch(update).delete(remove))
        .route("/audit-log", get(audit_log))
}

async fn list(State(ws): State<AppState>) -> Json<Vec<Webhook>> {
    Json(ws.integrations().list_webhooks().await)
}

async fn register(
    State(ws): State<AppState>,
    Json(draft): Json<NewWebhook>,
) -> ApiResult<(StatusCode, Json<Webhook>)> {
    let hook = ws.integrations().register_webhook(draft).await?;
    Ok((StatusCode::CREATED, Json(hook)))
}

async fn fetch(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Webhook>> {
    let id = parse_id(&id)?;
    found(ws.integrations().get_webhook(&id).await, "webhook", &id).map(Json)
}

async fn update(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Patch>,
) -> ApiResult<Json<Webhook>> {
    let id = parse_id(&id)?;
    found(ws.integrations().update_webhook(&id, &patch).await?, "webhook", &id).map(Json)
}

async fn remove(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if ws.integrations().delete_webhook(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("webhook {id}")))
    }
}

async fn audit_log(State(ws): State<AppState>) -> Json<Vec<AuditEntry>> {
    Json(ws.integrations().audit_log().await)
}
