//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::panel::PanelError;
use crate::store::StoreError;

/// Structured error response body: `{"error":{"code","message"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error("Backend rejected the request: {0}")]
    Rejected(String),
    #[error("Backend unavailable: {0}")]
    Upstream(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Backend not configured: {0}")]
    NotConfigured(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) | ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Rejected(_) => "REJECTED",
            ApiError::Upstream(_) => "UPSTREAM",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::NotConfigured(_) => "NOT_CONFIGURED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                "An internal error occurred".to_string()
            }
            ApiError::NotFound(detail)
            | ApiError::BadRequest(detail)
            | ApiError::Validation(detail)
            | ApiError::Rejected(detail)
            | ApiError::Upstream(detail)
            | ApiError::Conflict(detail)
            | ApiError::NotConfigured(detail) => detail.clone(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("Record not found: {id}")),
            StoreError::NotUnique { .. } => ApiError::Conflict(err.to_string()),
            StoreError::Rejected { message, .. } => ApiError::Rejected(message),
            StoreError::Connection(_) | StoreError::Http(_) | StoreError::ResponseParsing(_) => {
                ApiError::Upstream(err.to_string())
            }
            StoreError::Configuration(e) => ApiError::NotConfigured(e.to_string()),
            StoreError::Storage(_) | StoreError::Serialization(_) | StoreError::InvalidKey(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        match err {
            PanelError::Validation(e) => ApiError::Validation(e.to_string()),
            PanelError::Store(e) => e.into(),
            PanelError::NotConfigured(detail) => ApiError::NotConfigured(detail),
            PanelError::NotConfirmed | PanelError::EmptyPatch => {
                ApiError::BadRequest(err.to_string())
            }
            PanelError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
        }
    }
}
