//! Connection registry: who is connected right now.
//!
//! DESIGN
//! ======
//! One `UserRecord` per open connection, keyed by `ConnectionId`. Records are
//! created on connect, renamed in place, and removed on close. Listing
//! returns records in connection order so every bootstrap sees the same
//! roster layout.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest display name kept after trimming, in characters.
pub const MAX_DISPLAY_NAME_CHARS: usize = 20;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection already registered: {0}")]
    AlreadyRegistered(ConnectionId),
}

/// Transport-assigned identity of one connection. Stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A connected participant, as shown to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: ConnectionId,
    pub username: String,
    pub color: String,
}

struct Entry {
    /// Registration order, used to keep listings stable.
    seq: u64,
    record: UserRecord,
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Default)]
pub struct ConnectionRegistry {
    users: HashMap<ConnectionId, Entry>,
    next_seq: u64,
}

impl ConnectionRegistry {
    /// Add a record for a freshly opened connection.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if the id is already live.
    pub fn register(
        &mut self,
        id: ConnectionId,
        username: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<UserRecord, RegistryError> {
        if self.users.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        let record = UserRecord { id, username: username.into(), color: color.into() };
        self.users.insert(id, Entry { seq: self.next_seq, record: record.clone() });
        self.next_seq += 1;
        Ok(record)
    }

    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&UserRecord> {
        self.users.get(&id).map(|entry| &entry.record)
    }

    /// Apply a rename request. Returns the updated record, or `None` when the
    /// connection is unknown or the name is blank after trimming.
    pub fn rename(&mut self, id: ConnectionId, proposed: &str) -> Option<UserRecord> {
        let entry = self.users.get_mut(&id)?;
        let name = normalize_display_name(proposed)?;
        entry.record.username = name;
        Some(entry.record.clone())
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<UserRecord> {
        self.users.remove(&id).map(|entry| entry.record)
    }

    /// Snapshot of every record in connection order.
    #[must_use]
    pub fn list_all(&self) -> Vec<UserRecord> {
        let mut entries: Vec<&Entry> = self.users.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.record.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Trim and cap a proposed display name. `None` if nothing is left.
#[must_use]
pub fn normalize_display_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_DISPLAY_NAME_CHARS).collect())
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
