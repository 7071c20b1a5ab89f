//! WebSocket fanout: one broadcast channel shared by every connected client,
//! carrying pre-serialized JSON envelopes (§6).

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::Sender;

use crate::state::AdapterState;

#[derive(Debug, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn new(kind: &'static str, timestamp: DateTime<Utc>, data: serde_json::Value) -> Self {
        Self { kind, timestamp, data }
    }
}

/// Serializes `envelope` and sends it to every connected client. A channel
/// with no subscribers is not an error (no clients connected yet).
pub fn broadcast_event(sender: &Sender<String>, envelope: Envelope) {
    match serde_json::to_string(&envelope) {
        Ok(json) => {
            let _ = sender.send(json);
        }
        Err(err) => tracing::warn!(error = %err, "failed to serialize broadcast envelope"),
    }
}

pub async fn ws_upgrade(
    Path(client_id): Path<String>,
    State(state): State<Arc<AdapterState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

async fn handle_socket(mut socket: WebSocket, client_id: String, state: Arc<AdapterState>) {
    let mut rx = state.events.subscribe();
    tracing::info!(client_id, "websocket client connected");
    loop {
        match rx.recv().await {
            Ok(payload) => {
                if socket.send(Message::Text(payload)).await.is_err() {
                    tracing::warn!(client_id, "websocket send failed, dropping client");
                    break;
                }
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(client_id, skipped, "websocket client lagged, dropping missed events");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::info!(client_id, "websocket client disconnected");
}
