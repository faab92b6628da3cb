//! Frame: the universal message type on the drawing socket.
//!
//! ARCHITECTURE
//! ============
//! Every WebSocket text message is one JSON Frame. Clients send frames named
//! after the event they raise (`element-update`, `update-username`,
//! `clear-canvas`); the server answers with frames named after the event it
//! announces (`load-drawing`, `user-connected`, ...).
//!
//! DESIGN
//! ======
//! - The payload is an arbitrary JSON value: an element object, a bare string,
//!   an array of records, or nothing at all.
//! - The WS handler parses frames and hands them to the session coordinator;
//!   it never inspects `data` itself.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// =============================================================================
// EVENT NAMES
// =============================================================================

/// Server → new client: the caller's own user record.
pub const CURRENT_USER_INFO: &str = "current-user-info";

/// Server → new client: ordered snapshot of the drawing store.
pub const LOAD_DRAWING: &str = "load-drawing";

/// Server → new client: every connected user, including the caller.
pub const ACTIVE_USERS_LIST: &str = "active-users-list";

/// Server → peers: a new connection joined.
pub const USER_CONNECTED: &str = "user-connected";

/// Both directions: one element created or changed.
pub const ELEMENT_UPDATE: &str = "element-update";

/// Client → server: rename request carrying a bare string.
pub const UPDATE_USERNAME: &str = "update-username";

/// Server → everyone: a rename was accepted.
pub const USER_UPDATED: &str = "user-updated";

/// Both directions: wipe the canvas.
pub const CLEAR_CANVAS: &str = "clear-canvas";

/// Server → everyone: a connection went away. Payload is the connection id.
pub const USER_DISCONNECTED: &str = "user-disconnected";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid frame json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame event is empty")]
    MissingEvent,
}

/// The universal message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    /// Milliseconds since Unix epoch. Stamped on server frames, optional inbound.
    #[serde(default)]
    pub ts: i64,
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    /// Create a frame carrying `data` for `event`.
    pub fn new(event: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        Self { event: event.into(), data: data.into(), ts: now_ms() }
    }

    /// Create a frame with no payload (`clear-canvas`).
    pub fn bare(event: impl Into<String>) -> Self {
        Self::new(event, serde_json::Value::Null)
    }

    /// Serialize `payload` into a frame. Falls back to a bare frame if the
    /// payload cannot be represented as JSON.
    pub fn with_payload<T: Serialize>(event: impl Into<String>, payload: &T) -> Self {
        let event = event.into();
        match serde_json::to_value(payload) {
            Ok(data) => Self::new(event, data),
            Err(e) => {
                tracing::warn!(%event, error = %e, "frame: payload not serializable");
                Self::bare(event)
            }
        }
    }
}

// =============================================================================
// CODEC
// =============================================================================

impl Frame {
    /// Parse one inbound text message.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Json`] for text that is not a frame object and
    /// [`FrameError::MissingEvent`] when `event` is blank.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let frame: Self = serde_json::from_str(text)?;
        if frame.event.trim().is_empty() {
            return Err(FrameError::MissingEvent);
        }
        Ok(frame)
    }

    /// Encode for the wire.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the payload contains non-serializable values.
    pub fn to_json(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
