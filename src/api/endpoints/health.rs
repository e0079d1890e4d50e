//! Health and status endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::panel::PanelSnapshot;
use crate::store::BackendKind;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: BackendKind,
    pub configured: bool,
    pub version: &'static str,
}

/// `GET /api/health`: liveness plus the configured backend.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: ctx.panel.backend(),
        configured: ctx.panel.is_configured(),
        version: crate::config::APP_VERSION,
    })
}

/// `GET /api/status`: status indicator, cache revision and size.
pub async fn status(State(ctx): State<ApiContext>) -> Result<Json<PanelSnapshot>, ApiError> {
    Ok(Json(ctx.panel.snapshot()?))
}
