use super::{AppState, found, parse_id};
use crate::error::{ApiError, ApiResult};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use syncscript_domains::performance::{Alert, Metric, MetricSample, NewMetric, PerformanceSummary};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(list_metrics).post(register_metric))
        .route("/metrics/samples", post(apply_samples))
        .route("/metrics/summary", get(summary))
        .route("/metrics/{name}", get(metric_by_name))
        .route("/alerts", get(alerts))
        .route("/alerts/{id}/acknowledge", post(acknowledge))
}

async fn list_metrics(State(ws): State<AppState>) -> Json<Vec<Metric>> {
    Json(ws.performance().list_metrics().await)
}

async fn register_metric(
    State(ws): State<AppState>,
    Json(draft): Json<NewMetric>,
) -> ApiResult<(StatusCode, Json<Metric>)> {
    let metric = ws.performance().register_metric(draft).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

/// Returns the alerts raised by this batch.
async fn apply_samples(
    State(ws): State<AppState>,
    Json(samples): Json<Vec<MetricSample>>,
) -> ApiResult<Json<Vec<Alert>>> {
    Ok(Json(ws.performance().apply_samples(&samples).await?))
}

async fn summary(State(ws): State<AppState>) -> Json<PerformanceSummary> {
    Json(ws.performance().summary().await)
}

async fn metric_by_name(State(ws): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Metric>> {
    ws.performance()
        .metric_by_name(&name)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("metric {name}")))
}

async fn alerts(State(ws): State<AppState>) -> Json<Vec<Alert>> {
    Json(ws.performance().alerts().await)
}

async fn acknowledge(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Alert>> {
    let id = parse_id(&id)?;
    found(ws.performance().acknowledge_alert(&id).await?, "alert", &id).map(Json)
}
