//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds a single `Hub` behind one async mutex: the drawing session (registry,
//! drawing store, color allocator) and the channel transport that reaches
//! every live socket. Each connection event locks the hub, runs one session
//! step, enqueues the resulting frames, and unlocks. Enqueueing never waits,
//! so the lock is held only for the in-memory work.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::frame::Frame;
use crate::services::registry::ConnectionId;
use crate::services::session::{BOOTSTRAP_FRAMES, Session, SessionStats};
use crate::services::transport::{ChannelTransport, Transport};

// =============================================================================
// HUB
// =============================================================================

/// Session plus the sockets it talks to. Always accessed under one lock.
#[derive(Default)]
pub struct Hub {
    pub session: Session,
    pub transport: ChannelTransport,
}

impl Hub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new connection's channel and send its bootstrap.
    pub fn open(&mut self, id: ConnectionId, tx: mpsc::Sender<Frame>) {
        self.transport.attach(id, tx);
        let out = self.session.connect(id);
        self.transport.deliver_all(out);
    }

    /// Apply one inbound frame from `id`.
    pub fn dispatch(&mut self, id: ConnectionId, frame: &Frame) {
        let out = self.session.handle_frame(id, frame);
        self.transport.deliver_all(out);
    }

    /// Detach `id` and announce the departure to whoever is left.
    pub fn close(&mut self, id: ConnectionId) {
        self.transport.detach(id);
        let out = self.session.disconnect(id);
        self.transport.deliver_all(out);
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Smallest per-connection channel: the whole bootstrap plus one live frame.
pub const MIN_CHANNEL_CAPACITY: usize = BOOTSTRAP_FRAMES + 1;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the hub is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Mutex<Hub>>,
    /// Capacity of each connection's outbound frame channel. Never below
    /// [`MIN_CHANNEL_CAPACITY`].
    pub channel_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub::new())),
            channel_capacity: channel_capacity.max(MIN_CHANNEL_CAPACITY),
        }
    }

    pub async fn open(&self, id: ConnectionId, tx: mpsc::Sender<Frame>) {
        self.hub.lock().await.open(id, tx);
    }

    pub async fn dispatch(&self, id: ConnectionId, frame: &Frame) {
        self.hub.lock().await.dispatch(id, frame);
    }

    pub async fn close(&self, id: ConnectionId) {
        self.hub.lock().await.close(id);
    }

    pub async fn stats(&self) -> SessionStats {
        self.hub.lock().await.session.stats()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
