//! Live-update listener for the hosted backend.
//!
//! Speaks the hosted realtime channel protocol (Phoenix-style JSON frames
//! over a WebSocket): join `realtime:hospitals_changes` with a
//! `postgres_changes` filter on the table, heartbeat every 30 s, and report
//! what happens as [`LiveEvent`]s. There is no resubscription; when the
//! transport ends the listener reports it and stops.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::config::HostedConfig;

/// Heartbeat interval expected by the realtime server.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Channel name shared with other clients of the same table.
const CHANNEL: &str = "hospitals_changes";

const PROTOCOL_VERSION: &str = "1.0.0";

/// Ref of the join message; the join acknowledgement echoes it.
const JOIN_REF: &str = "1";

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("Invalid realtime endpoint: {0}")]
    InvalidUrl(String),
    #[error("Realtime transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Realtime message encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Where and what to subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub socket_url: String,
    pub topic: String,
    pub table: String,
    pub access_token: String,
}

impl RealtimeConfig {
    /// Derive the realtime socket from the hosted REST endpoint:
    /// `https://host` becomes `wss://host/realtime/v1/websocket?apikey=..&vsn=1.0.0`.
    pub fn from_hosted(hosted: &HostedConfig) -> Result<Self, RealtimeError> {
        let mut url = Url::parse(hosted.url.trim_end_matches('/'))
            .map_err(|e| RealtimeError::InvalidUrl(format!("{}: {e}", hosted.url)))?;
        if url.scheme() != "https" || url.set_scheme("wss").is_err() {
            return Err(RealtimeError::InvalidUrl(hosted.url.clone()));
        }
        url.path_segments_mut()
            .map_err(|_| RealtimeError::InvalidUrl(hosted.url.clone()))?
            .pop_if_empty()
            .extend(["realtime", "v1", "websocket"]);
        url.query_pairs_mut()
            .append_pair("apikey", &hosted.anon_key)
            .append_pair("vsn", PROTOCOL_VERSION);

        Ok(Self {
            socket_url: url.to_string(),
            topic: format!("realtime:{CHANNEL}"),
            table: hosted.table.clone(),
            access_token: hosted.anon_key.clone(),
        })
    }

    /// The channel join frame.
    pub fn join_message(&self) -> Value {
        json!({
            "topic": self.topic,
            "event": "phx_join",
            "payload": {
                "config": {
                    "broadcast": { "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "*", "schema": "public", "table": self.table }
                    ]
                },
                "access_token": self.access_token,
            },
            "ref": JOIN_REF,
            "join_ref": JOIN_REF,
        })
    }
}

pub fn heartbeat_message(seq: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": seq.to_string(),
    })
}

/// What the listener reports to the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// Join acknowledged.
    Subscribed,
    /// A row of the table changed (insert, update or delete).
    Changed,
    ChannelError(String),
    Closed,
}

/// Map one incoming text frame to an event. Frames for other topics,
/// heartbeat replies and anything unparseable are ignored.
pub fn classify_frame(text: &str, topic: &str) -> Option<LiveEvent> {
    let frame: Value = serde_json::from_str(text).ok()?;
    if frame.get("topic").and_then(Value::as_str) != Some(topic) {
        return None;
    }
    let payload = frame.get("payload");
    let payload_status = payload
        .and_then(|p| p.get("status"))
        .and_then(Value::as_str);

    match frame.get("event").and_then(Value::as_str)? {
        "phx_reply" => {
            if frame.get("ref").and_then(Value::as_str) != Some(JOIN_REF) {
                return None;
            }
            match payload_status {
                Some("ok") => Some(LiveEvent::Subscribed),
                _ => Some(LiveEvent::ChannelError(
                    payload
                        .and_then(|p| p.pointer("/response/reason"))
                        .and_then(Value::as_str)
                        .unwrap_or("join refused")
                        .to_string(),
                )),
            }
        }
        "postgres_changes" => Some(LiveEvent::Changed),
        "phx_error" => Some(LiveEvent::ChannelError("channel error".into())),
        "phx_close" => Some(LiveEvent::Closed),
        "system" if payload_status == Some("error") => Some(LiveEvent::ChannelError(
            payload
                .and_then(|p| p.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("system error")
                .to_string(),
        )),
        _ => None,
    }
}

/// Run the listener in the background. Events go to `events`; the task
/// ends when the transport closes or the receiver is dropped.
pub fn spawn_listener(config: RealtimeConfig, events: mpsc::Sender<LiveEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match listen(&config, &events).await {
            Ok(()) => {
                tracing::info!(topic = %config.topic, "Realtime channel closed");
                let _ = events.send(LiveEvent::Closed).await;
            }
            Err(e) => {
                tracing::error!(topic = %config.topic, error = %e, "Realtime listener failed");
                let _ = events.send(LiveEvent::ChannelError(e.to_string())).await;
            }
        }
    })
}

async fn listen(
    config: &RealtimeConfig,
    events: &mpsc::Sender<LiveEvent>,
) -> Result<(), RealtimeError> {
    let (socket, _) = tokio_tungstenite::connect_async(config.socket_url.as_str()).await?;
    let (mut sink, mut stream) = socket.split();

    sink.send(Message::Text(config.join_message().to_string()))
        .await?;
    tracing::info!(topic = %config.topic, "Realtime join sent");

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;
    let mut seq: u64 = 1;

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = classify_frame(&text, &config.topic) {
                            tracing::debug!(?event, "Realtime event");
                            if events.send(event).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
            _ = heartbeat.tick() => {
                seq += 1;
                sink.send(Message::Text(heartbeat_message(seq).to_string())).await?;
            }
        }
    }
}
