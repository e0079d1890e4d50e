//! Panel router.
//!
//! Returns a composable `Router` serving the panel page and its form
//! actions, the push channel at `/ws/live`, and the JSON API under `/api/`.
//!
//! Layers (outermost → innermost):
//! 1. Request logging (every route) → 2. `Cache-Control: no-store` (API only)

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::panel::Panel;

/// Build the full router for `panel`.
pub fn panel_router(panel: Arc<Panel>) -> Router {
    build_router(ApiContext::new(panel))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/status", get(endpoints::health::status))
        .route(
            "/hospitals",
            get(endpoints::hospitals::list).post(endpoints::hospitals::create),
        )
        .route(
            "/hospitals/:id",
            put(endpoints::hospitals::update).delete(endpoints::hospitals::remove),
        )
        .with_state(ctx.clone())
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let pages = Router::new()
        .route("/", get(endpoints::page::index))
        .route("/rows", get(endpoints::page::rows))
        .route("/hospitals/save", post(endpoints::page::save))
        .route("/hospitals/delete", post(endpoints::page::delete))
        .route("/refresh", post(endpoints::page::refresh))
        .route("/ws/live", get(websocket::ws_upgrade))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .merge(pages)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
