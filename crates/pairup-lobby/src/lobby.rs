//! The lobby coordinator: composes the two registries atomically.
//!
//! Every public operation here is one client action (create, join, leave,
//! disconnect, rename) applied to both registries as a unit. The caller
//! holds a single lock around each call, so an operation either fully
//! applies or — on rejection — touches nothing; no interleaving can
//! observe a half-applied state.
//!
//! Operations return outcome values instead of emitting anything: the
//! event router decides who gets notified and when the open-room listing
//! is rebroadcast. This keeps every piece of delivery policy out of the
//! state layer.

use pairup_protocol::{RoomCode, RoomListEntry};
use pairup_session::{Connection, ConnectionError, ConnectionRegistry};
use pairup_transport::ConnectionId;

use crate::room::{Room, RoomChange};
use crate::{LobbyConfig, LobbyError, RoomRegistry};

/// Result of a successful join: who was already sitting in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The prior sole occupant, to be notified with `opponent_connect`.
    pub opponent: ConnectionId,
}

/// A departure from a room and what it did to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The room that was departed.
    pub room: RoomCode,
    /// Whether the room was destroyed or reopened. Either way the open
    /// room set changed, so the caller must rebroadcast the listing.
    pub change: RoomChange,
}

/// Everything the router needs to react to a closed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// The opponent at the moment of disconnect, to be notified with
    /// `opponent_disconnect`. `None` when the connection was roomless or
    /// alone in its room.
    pub opponent: Option<ConnectionId>,
    /// The room departure, if the connection was in a room.
    pub departure: Option<Departure>,
    /// Live connections remaining after removal, for diagnostics.
    pub remaining: usize,
}

/// The lobby coordinator.
///
/// Owns the connection registry and the room registry with sole write
/// access. The raw maps are never exposed; read access for listings and
/// consistency checks goes through the iterator accessors.
pub struct Lobby {
    connections: ConnectionRegistry,
    rooms: RoomRegistry,
}

impl Lobby {
    /// Creates an empty lobby with the given configuration.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            rooms: RoomRegistry::new(config.departure_policy),
        }
    }

    // -- Connection lifecycle ---------------------------------------------

    /// Registers a newly opened channel.
    pub fn register(&mut self, id: ConnectionId) {
        self.connections.register(id);
    }

    /// Handles a closed channel: captures the opponent, departs any active
    /// room, and removes the connection.
    ///
    /// Safe for stale ids (a disconnect racing an earlier disconnect, or a
    /// room already mutated by a just-processed event): every step
    /// degrades to a no-op.
    pub fn disconnect(&mut self, id: ConnectionId) -> DisconnectOutcome {
        let opponent = self.opponent_of(id);
        let departure = self.leave_room(id);
        if self.connections.remove(id).is_none() {
            tracing::debug!(%id, "disconnect for unknown connection");
        }
        DisconnectOutcome {
            opponent,
            departure,
            remaining: self.connections.len(),
        }
    }

    /// Sets a connection's display name. Empty names are rejected.
    pub fn set_name(
        &mut self,
        id: ConnectionId,
        name: &str,
    ) -> Result<(), ConnectionError> {
        self.connections.set_name(id, name)
    }

    /// Returns the live-connection count.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // -- Room operations --------------------------------------------------

    /// Creates a room owned by `id` and points their back-reference at it.
    ///
    /// # Errors
    /// - [`LobbyError::NoSuchConnection`] — unregistered id.
    /// - [`LobbyError::AlreadyInRoom`] — the connection has an active
    ///   room; nothing is mutated.
    pub fn create_room(
        &mut self,
        id: ConnectionId,
    ) -> Result<RoomCode, LobbyError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or(LobbyError::NoSuchConnection(id))?;
        if let Some(current) = connection.room() {
            return Err(LobbyError::AlreadyInRoom(id, current.clone()));
        }
        let code = self.rooms.create(id);
        connection.set_room(code.clone());
        Ok(code)
    }

    /// Takes the second seat of the room with the given code.
    ///
    /// # Errors
    /// Rejections leave both registries untouched:
    /// - [`LobbyError::NoSuchConnection`] — unregistered id.
    /// - [`LobbyError::AlreadyInRoom`] — the joiner has an active room.
    /// - [`LobbyError::NoSuchRoom`] / [`LobbyError::RoomFull`] — from the
    ///   room registry.
    pub fn join_room(
        &mut self,
        id: ConnectionId,
        code: RoomCode,
    ) -> Result<JoinOutcome, LobbyError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or(LobbyError::NoSuchConnection(id))?;
        if let Some(current) = connection.room() {
            return Err(LobbyError::AlreadyInRoom(id, current.clone()));
        }
        let opponent = self.rooms.join(&code, id)?;
        connection.set_room(code);
        Ok(JoinOutcome { opponent })
    }

    /// Departs the connection's active room, if any.
    ///
    /// `None` — and no mutation at all — when the connection is unknown or
    /// roomless, so calling this twice in a row is a harmless no-op.
    /// Under the teardown policy the departure also evicts the remaining
    /// member: their back-reference is cleared here and the
    /// [`Departure::change`] names them for re-homing to the lobby group.
    pub fn leave_room(&mut self, id: ConnectionId) -> Option<Departure> {
        let connection = self.connections.get_mut(id)?;
        let code = connection.take_room()?;
        let change = self.rooms.remove_member(&code, id);
        if let RoomChange::Destroyed {
            evicted: Some(evicted),
        } = change
        {
            match self.connections.get_mut(evicted) {
                Some(survivor) => {
                    survivor.take_room();
                }
                None => {
                    tracing::warn!(%evicted, "evicted member not registered");
                }
            }
        }
        Some(Departure { room: code, change })
    }

    // -- Read access ------------------------------------------------------

    /// The other member of `id`'s active room. `None` when `id` is
    /// unknown, roomless, or its room's sole occupant.
    pub fn opponent_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        let code = self.connections.get(id)?.room()?;
        let Some(room) = self.rooms.get(code) else {
            tracing::warn!(%id, %code, "active-room points at a missing room");
            return None;
        };
        room.members().iter().copied().find(|&member| member != id)
    }

    /// A connection's display name, if set.
    pub fn name_of(&self, id: ConnectionId) -> Option<&str> {
        self.connections.get(id)?.name()
    }

    /// The listing of rooms with a free seat.
    pub fn open_rooms(&self) -> Vec<RoomListEntry> {
        self.rooms.open_rooms()
    }

    /// Looks up a room by code.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Iterates over live rooms.
    pub fn iter_rooms(&self) -> impl Iterator<Item = (&RoomCode, &Room)> {
        self.rooms.iter()
    }

    /// Looks up a connection by id.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Iterates over live connections.
    pub fn iter_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(LobbyConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
