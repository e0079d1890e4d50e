//! Persistence adapters.
//!
//! One interface, `HospitalStore`, with three implementations selected once
//! from configuration:
//! - `HostedStore`: hosted database REST endpoint
//! - `HttpApiStore`: plain HTTP JSON API (`/hospitals`)
//! - `LocalStore`: serialized array in a local key-value slot
//!
//! Stores never touch the panel cache; the panel replaces it on success.

pub mod hosted;
pub mod http_api;
pub mod local;
pub mod slots;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PanelConfig};
use crate::models::{Hospital, HospitalPatch, NewHospital};

pub use hosted::HostedStore;
pub use http_api::HttpApiStore;
pub use local::LocalStore;
pub use slots::KeyValueSlots;

/// Connect timeout shared by the network-backed stores.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Longest backend message carried into an error.
const MAX_MESSAGE_CHARS: usize = 300;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Which backend a deployment uses. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Hosted,
    HttpApi,
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hosted => write!(f, "hosted database"),
            Self::HttpApi => write!(f, "HTTP API"),
            Self::Local => write!(f, "local store"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot reach backend at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Id {id} matched {count} records")]
    NotUnique { id: String, count: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),

    #[error("Invalid slot key {0:?}")]
    InvalidKey(String),

    #[error("Backend not configured: {0}")]
    Configuration(#[from] ConfigError),
}

/// The four record operations every backend provides.
#[async_trait]
pub trait HospitalStore: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> BackendKind;

    /// All records, in backend order (newest first).
    async fn list(&self) -> Result<Vec<Hospital>, StoreError>;

    /// Insert one record; returns it with backend-assigned fields.
    async fn create(&self, payload: &NewHospital) -> Result<Hospital, StoreError>;

    /// Merge `patch` over the record keyed by `id`; returns the result.
    async fn update(&self, id: &str, patch: &HospitalPatch) -> Result<Hospital, StoreError>;

    /// Remove the record keyed by `id`.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Build the store selected by `config`. Validates first, so a bad
/// configuration never reaches the network.
pub fn build_store(config: &PanelConfig) -> Result<Arc<dyn HospitalStore>, StoreError> {
    config.validate()?;
    let store: Arc<dyn HospitalStore> = match config.backend {
        BackendKind::Hosted => Arc::new(HostedStore::new(&config.hosted)?),
        BackendKind::HttpApi => Arc::new(HttpApiStore::new(&config.api_base_url)?),
        BackendKind::Local => Arc::new(LocalStore::new(
            KeyValueSlots::new(&config.local_dir),
            &config.local_key,
        )),
    };
    tracing::info!(backend = %store.backend(), "Persistence adapter ready");
    Ok(store)
}

// ═══════════════════════════════════════════════════════════
// HTTP helpers shared by the network-backed stores
// ═══════════════════════════════════════════════════════════

pub(crate) fn http_client() -> Result<reqwest::Client, StoreError> {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(|e| StoreError::Http(e.to_string()))
}

/// Classify a transport failure.
pub(crate) fn transport_error(err: reqwest::Error, base_url: &str) -> StoreError {
    if err.is_connect() {
        StoreError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        StoreError::Http(format!("Request to {base_url} timed out"))
    } else {
        StoreError::Http(err.to_string())
    }
}

/// Turn a non-2xx response into `Rejected`, with the best message we can find.
pub(crate) async fn rejection(response: reqwest::Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    StoreError::Rejected {
        status: status.as_u16(),
        message: extract_error_message(&body, status),
    }
}

async fn body_text(response: reqwest::Response) -> Result<String, StoreError> {
    response
        .text()
        .await
        .map_err(|e| StoreError::ResponseParsing(e.to_string()))
}

/// Decode a success body. The error names the offending field and position.
pub(crate) async fn decode_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let body = body_text(response).await?;
    serde_json::from_str(&body).map_err(|e| StoreError::ResponseParsing(e.to_string()))
}

/// Decode a list body row by row. Rows that do not fit the record model are
/// logged and skipped; the rest of the batch still loads.
pub(crate) async fn decode_rows(response: reqwest::Response) -> Result<Vec<Hospital>, StoreError> {
    let body = body_text(response).await?;
    parse_rows(&body)
}

fn parse_rows(body: &str) -> Result<Vec<Hospital>, StoreError> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| StoreError::ResponseParsing(e.to_string()))?;

    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let id = row.get("id").map(ToString::to_string).unwrap_or_default();
            match serde_json::from_value::<Hospital>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(index, %id, error = %e, "Skipping unreadable row");
                    None
                }
            }
        })
        .collect())
}

/// Best-effort message extraction from an error body.
pub(crate) fn extract_error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            json.pointer("/error/message"),
            json.get("message"),
            json.get("error"),
            json.get("msg"),
            json.get("details"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(text) = candidate.as_str().map(str::trim) {
                if !text.is_empty() {
                    return text.chars().take(MAX_MESSAGE_CHARS).collect();
                }
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.chars().take(MAX_MESSAGE_CHARS).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
