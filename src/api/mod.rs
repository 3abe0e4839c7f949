pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::control::ControlService;
use crate::ingest::IngestService;
use crate::query::QueryService;

use handlers::ApiDoc;

/// Shared handler state: the three gateways over the injected stores.
#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub query: QueryService,
    pub control: ControlService,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/update", post(handlers::ingest_reading))
        .route("/api/data", get(handlers::get_tank_status))
        .route("/api/history", get(handlers::get_history))
        .route("/api/records", get(handlers::get_all_records))
        .route("/api/control/auto", post(handlers::set_auto_mode))
        .route("/api/control/manual", post(handlers::set_manual_mode))
        .route("/api/control/calibrate", post(handlers::request_calibration))
        .route("/api/control/poll", get(handlers::device_poll))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
