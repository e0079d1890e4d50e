//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::Deserialize;

use crate::panel::Panel;

// ═══════════════════════════════════════════════════════════
// API context: shared state for every route
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub panel: Arc<Panel>,
}

impl ApiContext {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self { panel }
    }
}

// ═══════════════════════════════════════════════════════════
// Query and form bodies
// ═══════════════════════════════════════════════════════════

/// `GET /?q=..&edit=..`
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub q: String,
    pub edit: Option<String>,
}

/// `GET /rows?q=..`
#[derive(Debug, Default, Deserialize)]
pub struct RowsQuery {
    #[serde(default)]
    pub q: String,
}

/// `POST /hospitals/delete`
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: String,
    #[serde(default)]
    pub confirmed: String,
}

impl DeleteForm {
    /// The page script sets `confirmed=yes` after the browser confirm.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.trim().eq_ignore_ascii_case("yes")
    }
}
