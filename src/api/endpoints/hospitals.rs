//! JSON record API, the route shape `HttpApiStore` consumes.
//!
//! `GET /api/hospitals` reloads from the backend before answering, so one
//! panel instance can front another.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Hospital, HospitalPatch, NewHospital};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// `GET /api/hospitals`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Hospital>>, ApiError> {
    ctx.panel.reload().await?;
    Ok(Json(ctx.panel.records()?))
}

/// `POST /api/hospitals` → 201 with the stored record.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<NewHospital>, JsonRejection>,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    let record = ctx.panel.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /api/hospitals/:id`: partial update.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<HospitalPatch>, JsonRejection>,
) -> Result<Json<Hospital>, ApiError> {
    let record = ctx.panel.update(&id, body(payload)?).await?;
    Ok(Json(record))
}

/// `DELETE /api/hospitals/:id` → 204.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.panel.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
