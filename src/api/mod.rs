//! HTTP surface of the panel.
//!
//! Serves the server-rendered panel page and its form actions, the browser
//! push channel, and a JSON API under `/api/` with the same route shape
//! `HttpApiStore` consumes. `panel_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use error::ApiError;
pub use router::panel_router;
pub use server::{start_server_on, PanelServer, PanelSession, ServerError};
pub use types::ApiContext;
