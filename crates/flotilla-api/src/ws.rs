//! `WebSocket` handler for the live state update feed.
//!
//! Clients connect to `GET /ws` and receive a JSON-encoded
//! [`FeedEnvelope`] for every registry mutation and liveness transition,
//! plus a periodic heartbeat envelope so idle connections stay open.
//!
//! Delivery is best-effort per observer: a client that falls behind skips
//! lagged envelopes and resumes from the oldest retained one; a client
//! whose socket errors is dropped, which is also its deregistration from
//! the fanout.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use chrono::Utc;
use flotilla_types::FeedEnvelope;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming feed envelopes.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_feed(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: subscribe to the broadcast channel,
/// forward each envelope as a text frame, and tick the heartbeat.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("feed client connected");

    let mut rx = state.subscribe();
    let mut heartbeat = tokio::time::interval(state.feed.heartbeat_interval());
    // The first interval tick completes immediately; consume it so the
    // first heartbeat goes out one full interval after connect.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            // Receive a feed envelope from the ingest bridge or monitor.
            result = rx.recv() => {
                match result {
                    Ok(envelope) => {
                        if send_envelope(&mut socket, &envelope).await.is_err() {
                            debug!("feed client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "feed client lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("broadcast channel closed, shutting down feed");
                        return;
                    }
                }
            }
            // Keep the connection alive while the fleet is quiet.
            _ = heartbeat.tick() => {
                let envelope = FeedEnvelope::heartbeat(Utc::now());
                if send_envelope(&mut socket, &envelope).await.is_err() {
                    debug!("feed client disconnected (heartbeat failed)");
                    return;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("feed client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!("feed client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("feed socket error: {e}");
                        return;
                    }
                    _ => {
                        // Ignore text/binary frames from the client; the
                        // feed is one-way.
                    }
                }
            }
        }
    }
}

/// Serialize one envelope and send it as a text frame.
///
/// A value that fails to serialize is logged and skipped rather than
/// treated as a connection failure.
async fn send_envelope(socket: &mut WebSocket, envelope: &FeedEnvelope) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(envelope) {
        Ok(j) => j,
        Err(e) => {
            warn!("failed to serialize feed envelope: {e}");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
