//! Browser push channel at `/ws/live`.
//!
//! Forwards panel events (cache and status changes) as JSON text frames.
//! On connect the current status is sent first; a heartbeat frame follows
//! every 30 s so idle proxies keep the connection open.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::api::types::ApiContext;
use crate::panel::{Panel, PanelEvent};

/// Heartbeat interval: server sends a heartbeat frame every 30 seconds.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    tracing::debug!("Live channel upgrade accepted");
    let panel = ctx.panel.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, panel))
}

fn current_status(panel: &Panel) -> Option<PanelEvent> {
    let status = panel.status().ok()?;
    Some(PanelEvent::StatusChanged {
        label: status.label(),
        tone: status.tone(),
    })
}

async fn handle_ws(socket: WebSocket, panel: Arc<Panel>) {
    let (mut sink, mut stream) = socket.split();
    let mut events = panel.subscribe();

    if let Some(hello) = current_status(&panel) {
        match serde_json::to_string(&hello) {
            Ok(text) => {
                if sink.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Status frame not encoded"),
        }
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // Consume initial immediate tick

    loop {
        tokio::select! {
            event = events.recv() => {
                let frame = match event {
                    Ok(event) => serde_json::to_string(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Live channel lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                match frame {
                    Ok(text) => {
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Live frame not encoded"),
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {} // Browsers send nothing else; ping/pong handled by axum
                }
            }
            _ = heartbeat.tick() => {
                let frame = json!({
                    "type": "heartbeat",
                    "server_time": chrono::Utc::now().to_rfc3339(),
                });
                if sink.send(Message::Text(frame.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
    tracing::debug!("Live channel closed");
}
