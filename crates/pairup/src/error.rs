//! Unified error type for the Pairup server.

use pairup_lobby::LobbyError;
use pairup_protocol::ProtocolError;
use pairup_session::ConnectionError;
use pairup_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `pairup` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PairupError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A connection-registry error (unknown connection, invalid name).
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A lobby error (no such room, room full, already in a room).
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
