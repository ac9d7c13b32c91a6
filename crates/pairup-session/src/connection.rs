//! The data structure representing one client's live channel session.

use pairup_protocol::RoomCode;
use pairup_transport::ConnectionId;

/// A single client's state on the server.
///
/// Created when the channel opens (no name, no room), mutated by
/// name-setting and by the lobby's room operations, destroyed when the
/// channel closes.
///
/// The `room` field is a back-reference only: the room itself is owned by
/// the room registry, and a `Connection` never outlives its registration.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    name: Option<String>,
    room: Option<RoomCode>,
}

impl Connection {
    /// Creates a fresh, nameless, roomless connection.
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            name: None,
            room: None,
        }
    }

    /// The transport-assigned id this state belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The display name, if one has been set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// The code of the room this connection is currently in, if any.
    pub fn room(&self) -> Option<&RoomCode> {
        self.room.as_ref()
    }

    /// Points the back-reference at a room. Coordinator use only: must be
    /// paired with the corresponding room-registry mutation.
    pub fn set_room(&mut self, code: RoomCode) {
        self.room = Some(code);
    }

    /// Clears and returns the back-reference. Coordinator use only.
    pub fn take_room(&mut self) -> Option<RoomCode> {
        self.room.take()
    }
}
