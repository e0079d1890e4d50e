pub mod api; // HTTP surface: page, form actions, JSON API, push channel
pub mod cache;
pub mod config;
pub mod form;
pub mod models;
pub mod panel; // Event wiring between page, cache and store
pub mod realtime; // Hosted live-update listener
pub mod render;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::config::{ConfigError, PanelConfig};
use crate::panel::Panel;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Failed to wait for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Start the panel with the compiled-in configuration and serve until
/// Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = PanelConfig::from_constants();
    let addr = config.socket_addr()?;

    let panel = Arc::new(Panel::from_config(&config));
    panel.init().await;

    let server = api::start_server_on(panel, addr).await?;
    tracing::info!(
        url = %format!("http://{}", server.session.server_addr),
        session_id = %server.session.session_id,
        "Panel ready"
    );

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    server.stop().await;
    Ok(())
}
