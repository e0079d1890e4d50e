//! Panel server lifecycle: starts and stops the axum HTTP server.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::router::panel_router;
use crate::panel::Panel;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind panel server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Failed to get server address: {0}")]
    LocalAddr(std::io::Error),
}

/// Session metadata for a running panel server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running panel server.
pub struct PanelServer {
    pub session: PanelSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PanelServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Panel server shutdown signal sent");
        }
    }

    /// Shut down and wait for in-flight requests to finish.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Panel server task failed: {e}");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Start the panel server on `addr` (port 0 picks an ephemeral port).
pub async fn start_server_on(
    panel: Arc<Panel>,
    addr: SocketAddr,
) -> Result<PanelServer, ServerError> {
    // 1. Bind
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    tracing::info!(%addr, "Panel server binding");

    // 2. Build the router
    let app = panel_router(panel);

    // 3. Create session metadata
    let session = PanelSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    // 4. Set up shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    // 5. Spawn server in background task
    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Panel server received shutdown signal");
        };

        tracing::info!(%addr, "Panel server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Panel server error: {e}");
        }

        tracing::info!("Panel server stopped");
    });

    Ok(PanelServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use futures_util::StreamExt;
    use tokio_tungstenite::tungstenite;

    use crate::config::PanelConfig;
    use crate::models::{HospitalCategory, HospitalPatch, HospitalStatus, NewHospital, Teleconsultation};
    use crate::panel::testing::MemoryStore;
    use crate::store::{HospitalStore, HttpApiStore, StoreError};

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    fn payload(name: &str) -> NewHospital {
        NewHospital {
            name: name.into(),
            status: HospitalStatus::Active,
            country: "FR".into(),
            city: "Paris".into(),
            category: HospitalCategory::Hospital,
            speciality: None,
            website: Some("https://city.example".into()),
            email: None,
            telephone: None,
            teleconsultation: Teleconsultation::Yes,
        }
    }

    async fn local_server(dir: &tempfile::TempDir) -> PanelServer {
        let panel = Arc::new(Panel::from_config(&PanelConfig::local(dir.path())));
        panel.init().await;
        start_server_on(panel, localhost())
            .await
            .expect("server should start")
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let dir = tempfile::tempdir().unwrap();
        let server = local_server(&dir).await;

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);
        assert!(server.session.server_addr.contains(':'));

        let url = format!("http://127.0.0.1:{}/api/health", server.session.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.headers()["cache-control"], "no-store");

        server.stop().await;
        assert!(reqwest::get(&url).await.is_err());
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = local_server(&dir).await;
        server.shutdown();
        server.shutdown(); // Second call should be safe
    }

    #[tokio::test]
    async fn busy_port_is_a_bind_error() {
        let held = tokio::net::TcpListener::bind(localhost()).await.unwrap();
        let addr = held.local_addr().unwrap();
        let panel = Arc::new(Panel::new(Arc::new(MemoryStore::new())));

        let err = start_server_on(panel, addr).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
    }

    /// One panel fronting another: the HTTP API store speaks to a
    /// local-store-backed server through the JSON routes.
    #[tokio::test]
    async fn http_api_store_round_trip_against_panel_server() {
        let dir = tempfile::tempdir().unwrap();
        let server = local_server(&dir).await;
        let store =
            HttpApiStore::new(&format!("http://127.0.0.1:{}/api", server.session.port)).unwrap();

        let created = store.create(&payload("City Hospital")).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.created_at.is_some());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].matches(&payload("City Hospital")));

        let patch = HospitalPatch {
            telephone: Some(Some("+33 1 00 00 00 00".into())),
            website: Some(None),
            ..HospitalPatch::default()
        };
        let updated = store.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.telephone.as_deref(), Some("+33 1 00 00 00 00"));
        assert_eq!(updated.website, None);
        assert_eq!(updated.name, "City Hospital");

        let missing = store.update("nope", &patch).await.unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));

        let invalid = store.create(&payload(" ")).await.unwrap_err();
        match invalid {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Please fill in the required fields: name");
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        store.delete(&created.id).await.unwrap();
        store.delete(&created.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        drop(store);
        server.stop().await;
    }

    #[tokio::test]
    async fn live_channel_pushes_status_then_changes() {
        let dir = tempfile::tempdir().unwrap();
        let server = local_server(&dir).await;
        let port = server.session.port;

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://127.0.0.1:{port}/ws/live"))
            .await
            .expect("WS connect failed");

        let first = ws.next().await.unwrap().unwrap();
        let hello: serde_json::Value = match first {
            tungstenite::Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        };
        assert_eq!(hello["type"], "status_changed");
        assert_eq!(hello["label"], "• Connected");

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/hospitals"))
            .json(&payload("Saint Louis"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let changed = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(Ok(frame)) = ws.next().await {
                if let tungstenite::Message::Text(text) = frame {
                    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
                    if json["type"] == "cache_changed" {
                        return json;
                    }
                }
            }
            panic!("live channel closed");
        })
        .await
        .expect("cache change should be pushed");
        assert_eq!(changed["count"], 1);

        drop(ws);
        let mut server = server;
        server.shutdown();
    }
}
