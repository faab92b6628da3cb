//! Transport seam: who receives an outbound frame.
//!
//! DESIGN
//! ======
//! The session coordinator never sends anything itself. It returns a list of
//! [`Outbound`] frames, each tagged with a [`Delivery`] mode, and the caller
//! hands that list to a [`Transport`]. The WebSocket route uses
//! [`ChannelTransport`]: one bounded channel per connection, drained into the
//! socket by that connection's own task.
//!
//! Delivery never waits. A recipient whose channel is full or closed is
//! detached on the spot: its sender is dropped, so its socket task drains
//! what is already queued, closes the socket, and runs the normal disconnect.
//! The client then reconnects and receives a fresh bootstrap instead of
//! drawing on a canvas that has silently diverged.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::warn;

use super::registry::ConnectionId;
use crate::frame::Frame;

// =============================================================================
// TYPES
// =============================================================================

/// Recipient set for one outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Only this connection.
    ToOne(ConnectionId),
    /// Every connection except this one (usually the originator).
    AllExcept(ConnectionId),
    /// Every connection, originator included.
    All,
}

impl Delivery {
    /// Whether `recipient` is addressed by this delivery mode.
    #[must_use]
    pub fn includes(self, recipient: ConnectionId) -> bool {
        match self {
            Self::ToOne(target) => target == recipient,
            Self::AllExcept(excluded) => excluded != recipient,
            Self::All => true,
        }
    }
}

/// A frame paired with its recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub delivery: Delivery,
    pub frame: Frame,
}

impl Outbound {
    #[must_use]
    pub fn to_one(id: ConnectionId, frame: Frame) -> Self {
        Self { delivery: Delivery::ToOne(id), frame }
    }

    #[must_use]
    pub fn all_except(id: ConnectionId, frame: Frame) -> Self {
        Self { delivery: Delivery::AllExcept(id), frame }
    }

    #[must_use]
    pub fn all(frame: Frame) -> Self {
        Self { delivery: Delivery::All, frame }
    }
}

/// Anything that can fan frames out to live connections.
pub trait Transport {
    fn deliver(&mut self, delivery: Delivery, frame: &Frame);

    /// Deliver a coordinator's outbound list in order.
    fn deliver_all(&mut self, outbound: Vec<Outbound>) {
        for out in outbound {
            self.deliver(out.delivery, &out.frame);
        }
    }
}

// =============================================================================
// CHANNEL TRANSPORT
// =============================================================================

/// Per-connection outbound channels, keyed by connection id.
#[derive(Default)]
pub struct ChannelTransport {
    peers: HashMap<ConnectionId, mpsc::Sender<Frame>>,
}

impl ChannelTransport {
    /// Start routing frames for `id` into `tx`.
    pub fn attach(&mut self, id: ConnectionId, tx: mpsc::Sender<Frame>) {
        self.peers.insert(id, tx);
    }

    /// Stop routing frames for `id`. Returns whether it was attached.
    pub fn detach(&mut self, id: ConnectionId) -> bool {
        self.peers.remove(&id).is_some()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Transport for ChannelTransport {
    fn deliver(&mut self, delivery: Delivery, frame: &Frame) {
        if let Delivery::ToOne(id) = delivery {
            let lagging = self.peers.get(&id).is_some_and(|tx| !try_deliver(id, tx, frame));
            if lagging {
                self.peers.remove(&id);
            }
            return;
        }

        self.peers
            .retain(|id, tx| !delivery.includes(*id) || try_deliver(*id, tx, frame));
    }
}

/// Queue `frame` without waiting. `false` means the peer must be detached.
fn try_deliver(id: ConnectionId, tx: &mpsc::Sender<Frame>, frame: &Frame) -> bool {
    match tx.try_send(frame.clone()) {
        Ok(()) => true,
        Err(e) => {
            warn!(connection_id = %id, event = %frame.event, error = %e, "transport: peer detached");
            false
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
