//! Error types for the lobby layer.

use pairup_protocol::RoomCode;
use pairup_transport::ConnectionId;

/// Errors that can occur during lobby operations.
///
/// None of these are fatal: the router converts every variant into a
/// `false`/`null` result for the requester. The client is responsible for
/// re-issuing a request after a rejection.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The operation referenced a connection id that isn't registered —
    /// typically a race with a just-processed disconnect.
    #[error("no such connection: {0}")]
    NoSuchConnection(ConnectionId),

    /// The room code is unknown.
    #[error("no such room: {0}")]
    NoSuchRoom(RoomCode),

    /// The room already has both seats taken.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The connection is already in a room. One room at a time: allowing
    /// a second membership would strand a ghost entry in the first room's
    /// member list.
    #[error("connection {0} is already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomCode),
}
