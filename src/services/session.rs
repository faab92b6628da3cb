//! Session coordinator: maps connection events to store writes and frames.
//!
//! DESIGN
//! ======
//! `Session` owns the three pieces of shared state (connection registry,
//! drawing store, color allocator). Every entry point takes `&mut self`,
//! performs its mutation, and returns the frames that should go out along
//! with who receives them. Nothing here sends, awaits, or locks; the route
//! layer serializes calls and applies the returned [`Outbound`] list.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` → current-user-info, load-drawing, active-users-list to the
//!    new connection, then user-connected to everyone else
//! 2. `handle_frame` → element-update / update-username / clear-canvas
//! 3. `disconnect` → user-disconnected to everyone (once)
//!
//! ERROR HANDLING
//! ==============
//! Malformed client frames and frames from unknown connections are logged
//! and dropped. No error frame is ever sent back and the connection stays
//! open.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::drawing::{DrawingElement, DrawingStore, ElementError, Upsert};
use super::palette::ColorAllocator;
use super::registry::{ConnectionId, ConnectionRegistry};
use super::transport::Outbound;
use crate::frame::{self, Frame};

// =============================================================================
// CLIENT MESSAGES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown client event: {0}")]
    UnknownEvent(String),
    #[error("invalid element: {0}")]
    Element(#[from] ElementError),
    #[error("username must be a string")]
    UsernameNotString,
}

/// A decoded client → server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    ElementUpdate(DrawingElement),
    UpdateUsername(String),
    ClearCanvas,
}

impl TryFrom<&Frame> for ClientMessage {
    type Error = ProtocolError;

    fn try_from(req: &Frame) -> Result<Self, Self::Error> {
        match req.event.as_str() {
            frame::ELEMENT_UPDATE => Ok(Self::ElementUpdate(DrawingElement::try_from(req.data.clone())?)),
            frame::UPDATE_USERNAME => match &req.data {
                serde_json::Value::String(name) => Ok(Self::UpdateUsername(name.clone())),
                _ => Err(ProtocolError::UsernameNotString),
            },
            frame::CLEAR_CANVAS => Ok(Self::ClearCanvas),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// Counts exposed on the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub users: usize,
    pub elements: usize,
    pub colors_allocated: u64,
}

// =============================================================================
// SESSION
// =============================================================================

/// Frames queued to a new connection by [`Session::connect`] before anything
/// else can reach it.
pub const BOOTSTRAP_FRAMES: usize = 3;

#[derive(Default)]
pub struct Session {
    registry: ConnectionRegistry,
    drawing: DrawingStore,
    colors: ColorAllocator,
}

impl Session {
    #[cfg(test)]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn drawing(&self) -> &DrawingStore {
        &self.drawing
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            users: self.registry.len(),
            elements: self.drawing.len(),
            colors_allocated: self.colors.allocated(),
        }
    }

    /// Register a new connection and build its bootstrap.
    pub fn connect(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let color = self.colors.next_color();
        let user = match self.registry.register(id, guest_name(), color) {
            Ok(user) => user,
            Err(e) => {
                warn!(connection_id = %id, error = %e, "session: connect ignored");
                return Vec::new();
            }
        };

        let drawing = self.drawing.snapshot();
        let users = self.registry.list_all();
        info!(
            connection_id = %id,
            username = %user.username,
            %color,
            elements = drawing.len(),
            users = users.len(),
            "session: user connected"
        );

        vec![
            Outbound::to_one(id, Frame::with_payload(frame::CURRENT_USER_INFO, &user)),
            Outbound::to_one(id, Frame::with_payload(frame::LOAD_DRAWING, &drawing)),
            Outbound::to_one(id, Frame::with_payload(frame::ACTIVE_USERS_LIST, &users)),
            Outbound::all_except(id, Frame::with_payload(frame::USER_CONNECTED, &user)),
        ]
    }

    /// Decode one inbound frame and apply it.
    pub fn handle_frame(&mut self, id: ConnectionId, req: &Frame) -> Vec<Outbound> {
        match ClientMessage::try_from(req) {
            Ok(msg) => self.handle_message(id, msg),
            Err(e) => {
                warn!(connection_id = %id, event = %req.event, error = %e, "session: malformed frame ignored");
                Vec::new()
            }
        }
    }

    pub fn handle_message(&mut self, id: ConnectionId, msg: ClientMessage) -> Vec<Outbound> {
        if self.registry.get(id).is_none() {
            debug!(connection_id = %id, "session: message from unknown connection ignored");
            return Vec::new();
        }

        match msg {
            ClientMessage::ElementUpdate(element) => self.element_update(id, element),
            ClientMessage::UpdateUsername(name) => self.rename(id, &name),
            ClientMessage::ClearCanvas => self.clear_canvas(id),
        }
    }

    /// Upsert and relay to everyone but the author.
    fn element_update(&mut self, id: ConnectionId, element: DrawingElement) -> Vec<Outbound> {
        let frame = Frame::with_payload(frame::ELEMENT_UPDATE, &element);
        let outcome = self.drawing.upsert(element);
        if outcome == Upsert::Inserted {
            debug!(connection_id = %id, elements = self.drawing.len(), "session: element added");
        }
        vec![Outbound::all_except(id, frame)]
    }

    fn rename(&mut self, id: ConnectionId, proposed: &str) -> Vec<Outbound> {
        let Some(user) = self.registry.rename(id, proposed) else {
            debug!(connection_id = %id, "session: rename rejected");
            return Vec::new();
        };
        info!(connection_id = %id, username = %user.username, "session: user renamed");
        vec![Outbound::all(Frame::with_payload(frame::USER_UPDATED, &user))]
    }

    fn clear_canvas(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let removed = self.drawing.clear();
        info!(connection_id = %id, removed, "session: canvas cleared");
        vec![Outbound::all(Frame::bare(frame::CLEAR_CANVAS))]
    }

    /// Forget a connection. Safe to call more than once.
    pub fn disconnect(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let Some(user) = self.registry.remove(id) else {
            debug!(connection_id = %id, "session: disconnect for unknown connection");
            return Vec::new();
        };
        info!(connection_id = %id, username = %user.username, "session: user disconnected");
        vec![Outbound::all(Frame::new(frame::USER_DISCONNECTED, user.id.to_string()))]
    }
}

/// Default display name for a new connection.
#[must_use]
pub fn guest_name() -> String {
    let n: u32 = rand::rng().random_range(0..1000);
    format!("Guest-{n}")
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
