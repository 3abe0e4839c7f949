use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::OpenApi;

use super::{
    dto::{ControlStateDto, HistoryDto, ManualModeRequest, ReadingDto, TableRowDto, TankStatusDto},
    errors::ApiError,
    AppState,
};
use crate::db::models::Mode;
use crate::ingest::TelemetryPayload;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// History window size; defaults to the configured limit.
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Telemetry handlers
// ---------------------------------------------------------------------------

/// Ingest one telemetry reading pushed by the tank device. The timestamp is
/// assigned server-side; a device-supplied one is ignored.
#[utoipa::path(
    post,
    path = "/api/update",
    request_body = TelemetryPayload,
    responses(
        (status = 201, description = "Reading stored", body = ReadingDto),
        (status = 400, description = "Malformed payload"),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "telemetry"
)]
pub async fn ingest_reading(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ReadingDto>), ApiError> {
    let reading = state.ingest.submit(raw).await?;
    Ok((StatusCode::CREATED, Json(reading.into())))
}

/// Current tank state: newest reading, aligned history sequences and the
/// newest-first table over the history window.
#[utoipa::path(
    get,
    path = "/api/data",
    params(
        ("limit" = Option<i64>, Query, description = "History window size (positive)"),
    ),
    responses(
        (status = 200, description = "Current tank state", body = TankStatusDto),
        (status = 400, description = "Non-positive limit"),
        (status = 404, description = "No readings recorded yet"),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "telemetry"
)]
pub async fn get_tank_status(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<TankStatusDto>, ApiError> {
    let status = state.query.current(params.limit).await?;
    Ok(Json(status.into()))
}

/// Just the chronological time/level history sequences.
#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("limit" = Option<i64>, Query, description = "History window size (positive)"),
    ),
    responses(
        (status = 200, description = "Aligned history sequences", body = HistoryDto),
        (status = 400, description = "Non-positive limit"),
        (status = 404, description = "No readings recorded yet"),
    ),
    tag = "telemetry"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<HistoryDto>, ApiError> {
    let history = state.query.history(params.limit).await?;
    Ok(Json(history.into()))
}

/// Full dump of every stored reading, newest first, all fields.
#[utoipa::path(
    get,
    path = "/api/records",
    responses(
        (status = 200, description = "All readings, newest first", body = Vec<ReadingDto>),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "telemetry"
)]
pub async fn get_all_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReadingDto>>, ApiError> {
    let rows = state.query.all().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Control handlers
// ---------------------------------------------------------------------------

/// Switch the pump to automatic operation.
#[utoipa::path(
    post,
    path = "/api/control/auto",
    responses(
        (status = 200, description = "New control state", body = ControlStateDto),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "control"
)]
pub async fn set_auto_mode(
    State(state): State<AppState>,
) -> Result<Json<ControlStateDto>, ApiError> {
    Ok(Json(state.control.set_auto().await?.into()))
}

/// Switch to manual operation with the requested pump state.
#[utoipa::path(
    post,
    path = "/api/control/manual",
    request_body = ManualModeRequest,
    responses(
        (status = 200, description = "New control state", body = ControlStateDto),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "control"
)]
pub async fn set_manual_mode(
    State(state): State<AppState>,
    Json(body): Json<ManualModeRequest>,
) -> Result<Json<ControlStateDto>, ApiError> {
    Ok(Json(state.control.set_manual(body.pump_on).await?.into()))
}

/// Latch a calibration request for the device's next poll. Idempotent
/// while a request is pending.
#[utoipa::path(
    post,
    path = "/api/control/calibrate",
    responses(
        (status = 200, description = "Calibration latched", body = ControlStateDto),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "control"
)]
pub async fn request_calibration(
    State(state): State<AppState>,
) -> Result<Json<ControlStateDto>, ApiError> {
    Ok(Json(state.control.request_calibration().await?.into()))
}

/// Device poll: returns the control state and clears the calibration latch
/// in the same atomic step. `calibrationPending` is the pre-clear snapshot,
/// so a pending calibration is delivered to exactly one poll.
#[utoipa::path(
    get,
    path = "/api/control/poll",
    responses(
        (status = 200, description = "Pre-clear control snapshot", body = ControlStateDto),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "control"
)]
pub async fn device_poll(
    State(state): State<AppState>,
) -> Result<Json<ControlStateDto>, ApiError> {
    Ok(Json(state.control.poll_for_device().await?.into()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        ingest_reading,
        get_tank_status,
        get_history,
        get_all_records,
        set_auto_mode,
        set_manual_mode,
        request_calibration,
        device_poll,
        health,
    ),
    components(schemas(
        TelemetryPayload,
        ReadingDto,
        TankStatusDto,
        TableRowDto,
        HistoryDto,
        ControlStateDto,
        ManualModeRequest,
        Mode,
    )),
    tags(
        (name = "telemetry", description = "Tank reading ingestion and views"),
        (name = "control",   description = "Pump mode and calibration handshake"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Tank Monitor API",
        version = "0.1.0",
        description = "REST API for water-tank telemetry and pump control"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
