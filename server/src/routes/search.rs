use super::{AppState, found, parse_id};
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use syncscript_domains::search::{NewSavedFilter, NewSearchEntry, SavedFilter, SearchEntry};
use syncscript_model::Patch;

const DEFAULT_HISTORY_LIMIT: usize = 10;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/search/filters", get(list_filters).post(save_filter))
        .route(
            "/search/filters/{id}",
            get(fetch_filter).patch(update_filter).delete(delete_filter),
        )
        .route("/search/history", get(recent).post(record))
}

async fn list_filters(State(ws): State<AppState>) -> Json<Vec<SavedFilter>> {
    Json(ws.search().list_filters().await)
}

async fn save_filter(
    State(ws): State<AppState>,
    Json(draft): Json<NewSavedFilter>,
) -> ApiResult<(StatusCode, Json<SavedFilter>)> {
    let filter = ws.search().save_filter(draft).await?;
    Ok((StatusCode::CREATED, Json(filter)))
}

async fn fetch_filter(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SavedFilter>> {
    let id = parse_id(&id)?;
    found(ws.search().get_filter(&id).await, "filter", &id).map(Json)
}

async fn update_filter(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Patch>,
) -> ApiResult<Json<SavedFilter>> {
    let id = parse_id(&id)?;
    found(ws.search().update_filter(&id, &patch).await?, "filter", &id).map(Json)
}

async fn delete_filter(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if ws.search().delete_filter(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("filter {id}")))
    }
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn recent(State(ws): State<AppState>, Query(q): Query<HistoryQuery>) -> Json<Vec<SearchEntry>> {
    Json(
        ws.search()
            .recent_searches(q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await,
    )
}

async fn record(
    State(ws): State<AppState>,
    Json(entry): Json<NewSearchEntry>,
) -> ApiResult<(StatusCode, Json<SearchEntry>)> {
    let entry = ws.search().record_search(&entry.query, entry.result_count).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
