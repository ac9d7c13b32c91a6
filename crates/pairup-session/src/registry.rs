//! The connection registry: tracks every live channel's state.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is NOT thread-safe by itself — it uses a plain
//! `HashMap`, not a concurrent one. This is intentional: the registry is
//! owned by the lobby coordinator, which is itself accessed through a
//! single mutex at the server layer. Keeping it simple here avoids hidden
//! locking overhead and keeps every mutation on the one serialization
//! point the design requires.

use std::collections::HashMap;

use pairup_transport::ConnectionId;

use crate::{Connection, ConnectionError};

/// Registry of all live connections, keyed by connection id.
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Registers a fresh connection for the given id.
    ///
    /// Registering an already-known id overwrites the previous state and
    /// logs a warning — transport ids are unique per channel, so a repeat
    /// indicates a bug upstream, not a client mistake.
    pub fn register(&mut self, id: ConnectionId) {
        if self
            .connections
            .insert(id, Connection::new(id))
            .is_some()
        {
            tracing::warn!(%id, "re-registering known connection, overwriting");
        }
    }

    /// Looks up a connection by id.
    ///
    /// `None` means "stale or already disconnected" — callers should treat
    /// it as a no-op condition, not an error.
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Mutable lookup, for the coordinator's back-reference maintenance.
    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    /// Sets a connection's display name.
    ///
    /// # Errors
    /// - [`ConnectionError::InvalidName`] — empty name; nothing is mutated.
    /// - [`ConnectionError::NotRegistered`] — unknown id.
    pub fn set_name(
        &mut self,
        id: ConnectionId,
        name: &str,
    ) -> Result<(), ConnectionError> {
        if name.is_empty() {
            return Err(ConnectionError::InvalidName);
        }
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or(ConnectionError::NotRegistered(id))?;
        connection.set_name(name.to_string());
        Ok(())
    }

    /// Removes a connection and returns its final state (including any
    /// active-room back-reference, which the coordinator uses to compose
    /// the room departure). `None` for unknown ids.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    /// Iterates over all live connections.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Returns the live-connection count.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `ConnectionRegistry`, following the naming
    //! convention `test_{function}_{scenario}_{expected}`.

    use super::*;
    use pairup_protocol::RoomCode;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    // =====================================================================
    // register() / get()
    // =====================================================================

    #[test]
    fn test_register_new_connection_is_nameless_and_roomless() {
        let mut reg = ConnectionRegistry::new();

        reg.register(cid(1));

        let conn = reg.get(cid(1)).expect("should exist");
        assert_eq!(conn.id(), cid(1));
        assert!(conn.name().is_none());
        assert!(conn.room().is_none());
    }

    #[test]
    fn test_register_known_id_overwrites_prior_state() {
        // Not fatal, but the fresh state must win: the old channel is gone.
        let mut reg = ConnectionRegistry::new();
        reg.register(cid(1));
        reg.set_name(cid(1), "alice").unwrap();

        reg.register(cid(1));

        let conn = reg.get(cid(1)).unwrap();
        assert!(conn.name().is_none(), "overwrite must reset the name");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_get_unknown_id_returns_none() {
        let reg = ConnectionRegistry::new();
        assert!(reg.get(cid(99)).is_none());
    }

    // =====================================================================
    // set_name()
    // =====================================================================

    #[test]
    fn test_set_name_stores_name() {
        let mut reg = ConnectionRegistry::new();
        reg.register(cid(1));

        reg.set_name(cid(1), "alice").expect("should succeed");

        assert_eq!(reg.get(cid(1)).unwrap().name(), Some("alice"));
    }

    #[test]
    fn test_set_name_empty_rejected_without_mutation() {
        let mut reg = ConnectionRegistry::new();
        reg.register(cid(1));
        reg.set_name(cid(1), "alice").unwrap();

        let result = reg.set_name(cid(1), "");

        assert!(matches!(result, Err(ConnectionError::InvalidName)));
        assert_eq!(
            reg.get(cid(1)).unwrap().name(),
            Some("alice"),
            "failed rename must not clobber the old name"
        );
    }

    #[test]
    fn test_set_name_overwrites_previous_name() {
        let mut reg = ConnectionRegistry::new();
        reg.register(cid(1));
        reg.set_name(cid(1), "alice").unwrap();

        reg.set_name(cid(1), "bob").unwrap();

        assert_eq!(reg.get(cid(1)).unwrap().name(), Some("bob"));
    }

    #[test]
    fn test_set_name_unknown_id_returns_not_registered() {
        let mut reg = ConnectionRegistry::new();

        let result = reg.set_name(cid(9), "ghost");

        assert!(
            matches!(result, Err(ConnectionError::NotRegistered(c)) if c == cid(9))
        );
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[test]
    fn test_remove_returns_final_state() {
        let mut reg = ConnectionRegistry::new();
        reg.register(cid(1));
        reg.get_mut(cid(1))
            .unwrap()
            .set_room(RoomCode::from("abcd1234"));

        let conn = reg.remove(cid(1)).expect("should return the connection");

        assert_eq!(conn.room(), Some(&RoomCode::from("abcd1234")));
        assert!(reg.get(cid(1)).is_none());
    }

    #[test]
    fn test_remove_unknown_id_returns_none() {
        let mut reg = ConnectionRegistry::new();
        assert!(reg.remove(cid(9)).is_none());
    }

    // =====================================================================
    // len() / is_empty()
    // =====================================================================

    #[test]
    fn test_len_tracks_connection_count() {
        let mut reg = ConnectionRegistry::new();
        assert_eq!(reg.len(), 0);
        assert!(reg.is_empty());

        reg.register(cid(1));
        reg.register(cid(2));
        assert_eq!(reg.len(), 2);

        reg.remove(cid(1));
        assert_eq!(reg.len(), 1);
        assert!(!reg.is_empty());
    }

    #[test]
    fn test_take_room_clears_back_reference() {
        let mut reg = ConnectionRegistry::new();
        reg.register(cid(1));
        reg.get_mut(cid(1))
            .unwrap()
            .set_room(RoomCode::from("abcd1234"));

        let taken = reg.get_mut(cid(1)).unwrap().take_room();

        assert_eq!(taken, Some(RoomCode::from("abcd1234")));
        assert!(reg.get(cid(1)).unwrap().room().is_none());
        assert!(reg.get_mut(cid(1)).unwrap().take_room().is_none());
    }
}
