use super::{AppState, found, parse_id};
use crate::error::ApiResult;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use syncscript_domains::threats::{
    AccessLog, Incident, IncidentStatus, NewAccessLog, NewIncident, NewThreat, RecordedThreat, Severity,
    ThreatEvent, ThreatStatus, ThreatSummary,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/threats", get(list_threats).post(record_threat))
        .route("/threats/summary", get(summary))
        .route("/threats/{id}", get(fetch_threat))
        .route("/threats/{id}/status", post(threat_status))
        .route("/incidents", get(list_incidents).post(open_incident))
        .route("/incidents/{id}", get(fetch_incident))
        .route("/incidents/{id}/status", post(incident_status))
        .route("/incidents/{id}/actions", post(incident_action))
        .route("/access-logs", get(access_logs).post(log_access))
}

#[derive(Deserialize)]
struct ThreatQuery {
    severity: Option<Severity>,
}

async fn list_threats(State(ws): State<AppState>, Query(q): Query<ThreatQuery>) -> Json<Vec<ThreatEvent>> {
    let threats = ws.threats();
    Json(match q.severity {
        Some(severity) => threats.threats_by_severity(severity).await,
        None => threats.list_threats().await,
    })
}

async fn record_threat(
    State(ws): State<AppState>,
    Json(draft): Json<NewThreat>,
) -> ApiResult<(StatusCode, Json<RecordedThreat>)> {
    let recorded = ws.threats().record_threat(draft).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

async fn summary(State(ws): State<AppState>) -> Json<ThreatSummary> {
    Json(ws.threats().summary().await)
}

async fn fetch_threat(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ThreatEvent>> {
    let id = parse_id(&id)?;
    found(ws.threats().get_threat(&id).await, "threat", &id).map(Json)
}

#[derive(Deserialize)]
struct StatusBody<S> {
    status: S,
}

async fn threat_status(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody<ThreatStatus>>,
) -> ApiResult<Json<ThreatEvent>> {
    let id = parse_id(&id)?;
    found(ws.threats().update_threat_status(&id, body.status).await?, "threat", &id).map(Json)
}

async fn list_incidents(State(ws): State<AppState>) -> Json<Vec<Incident>> {
    Json(ws.threats().list_incidents().await)
}

async fn open_incident(
    State(ws): State<AppState>,
    Json(draft): Json<NewIncident>,
) -> ApiResult<(StatusCode, Json<Incident>)> {
    let incident = ws.threats().open_incident(draft).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

async fn fetch_incident(State(ws): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Incident>> {
    let id = parse_id(&id)?;
    found(ws.threats().get_incident(&id).await, "incident", &id).map(Json)
}

async fn incident_status(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody<IncidentStatus>>,
) -> ApiResult<Json<Incident>> {
    let id = parse_id(&id)?;
    found(ws.threats().update_incident_status(&id, body.status).await?, "incident", &id).map(Json)
}

#[derive(Deserialize)]
struct ActionBody {
    actor: String,
    description: String,
}

async fn incident_action(
    State(ws): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ActionBody>,
) -> ApiResult<Json<Incident>> {
    let id = parse_id(&id)?;
    found(
        ws.threats()
            .add_incident_action(&id, &body.actor, &body.description)
            .await?,
        "incident",
        &id,
    )
    .map(Json)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessQuery {
    denied_for: Option<String>,
}

async fn access_logs(State(ws): State<AppState>, Query(q): Query<AccessQuery>) -> Json<Vec<AccessLog>> {
    let threats = ws.threats();
    Json(match q.denied_for {
        Some(actor) => threats.denied_access_for(&actor).await,
        None => threats.access_logs().await,
    })
}

async fn log_access(
    State(ws): State<AppState>,
    Json(draft): Json<NewAccessLog>,
) -> ApiResult<(StatusCode, Json<AccessLog>)> {
    let entry = ws.threats().log_access(draft).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
