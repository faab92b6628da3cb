//! WebSocket handler: the transport for drawing sessions.
//!
//! DESIGN
//! ======
//! On upgrade, assigns a connection ID, registers a per-connection channel
//! with the hub, and enters a `select!` loop:
//! - Incoming client frames → parse → hub dispatch
//! - Frames queued for this connection → forward to the socket
//!
//! The hub decides who receives what; this module only moves JSON text
//! between the socket and the channel.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → hub `open` queues the bootstrap on our own channel
//! 2. Client sends frames → hub `dispatch`
//! 3. Close, socket error, or the transport detaching a lagging channel →
//!    hub `close` → peers get `user-disconnected`

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::frame::Frame;
use crate::services::registry::ConnectionId;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();

    // Per-connection channel for frames addressed to this client.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.channel_capacity);
    state.open(connection_id, client_tx).await;

    info!(%connection_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => dispatch_text(&state, connection_id, text.as_str()).await,
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            frame = client_rx.recv() => {
                let Some(frame) = frame else {
                    warn!(%connection_id, "ws: outbound channel closed, dropping client");
                    break;
                };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    state.close(connection_id).await;
    info!(%connection_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse one inbound text message and hand it to the hub. Unparsable text
/// is logged and dropped; the connection stays open.
async fn dispatch_text(state: &AppState, connection_id: ConnectionId, text: &str) {
    let frame = match Frame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%connection_id, error = %e, "ws: invalid inbound frame");
            return;
        }
    };
    debug!(%connection_id, event = %frame.event, "ws: recv frame");
    state.dispatch(connection_id, &frame).await;
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match frame.to_json() {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, event = %frame.event, "ws: failed to serialize frame");
            return Ok(());
        }
    };
    debug!(event = %frame.event, "ws: send frame");
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
