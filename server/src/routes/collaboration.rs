use super::{AppState, found, parse_id};
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use syncscript_domains::collaboration::{CallStatus, CollaborationSummary, NewVideoCall, VideoCall};
use syncscript_model::Patch;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/calls", get(list).post(schedule))
        .route("/calls/summary", get(summary))
        .route("/calls/{id}", get(fetch).patch(update).delete(remove))
        .route("/calls/{id}/start", post(start))
        .route("/calls/{id}/end", post(end))
        .route("/calls/{id}/cancel", post(cancel))
        .route("/calls/{id}/participants", post(add_participant))
        .route("/calls/{id}/messages", post(add_message))
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<CallStatus>,
}

async fn list(State(ws): State<AppState>, Query(q): Query<ListQuery>) -> Json<Vec<VideoCall>> {
    let calls = ws.collaboration();
    Json(match q.status {
        Some(status) => calls.calls_by_status(status).await,
        None => calls.list_calls().await,
    })
}

async fn schedule(
    State(ws): State<AppState>,
    Json(draft): Json<NewVideoCall>,
) -> ApiResult<(StatusCode, Json<VideoCall>)> {
    let call = ws.collaboration().schedule_call(draft).await?;
    Ok((StatusCode::CREATED, Json(call)))
}

async fn summary(State(ws): State<AppState>) -> Json<CollaborationSummary> {
    Json(ws.collaboration().summary().await)
}

async fn fetch(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(ws.collaboration().get_call(&id).await, "call", &id).map(Json)
}

async fn update(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Patch>,
) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(ws.collaboration().update_call(&id, &patch).await?, "call", &id).map(Json)
}

async fn remove(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if ws.collaboration().delete_call(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("call {id}")))
    }
}

async fn start(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(ws.collaboration().start_call(&id).await?, "call", &id).map(Json)
}

async fn end(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(ws.collaboration().end_call(&id).await?, "call", &id).map(Json)
}

async fn cancel(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(ws.collaboration().cancel_call(&id).await?, "call", &id).map(Json)
}

#[derive(Deserialize)]
struct ParticipantBody {
    name: String,
}

async fn add_participant(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ParticipantBody>,
) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(ws.collaboration().add_participant(&id, &body.name).await?, "call", &id).map(Json)
}

#[derive(Deserialize)]
struct MessageBody {
    author: String,
    body: String,
}

async fn add_message(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(msg): Json<MessageBody>,
) -> ApiResult<Json<VideoCall>> {
    let id = parse_id(&id)?;
    found(
        ws.collaboration().add_chat_message(&id, &msg.author, &msg.body).await?,
        "call",
        &id,
    )
    .map(Json)
}
