//! Error types for the session layer.

use pairup_transport::ConnectionId;

/// Errors that can occur during connection-state operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// No connection is registered under the given id.
    ///
    /// Usually a race with a just-processed disconnect: the caller holds
    /// a stale id, not a broken invariant. Callers convert this to a
    /// `false` result rather than treating it as fatal.
    #[error("no connection registered for {0}")]
    NotRegistered(ConnectionId),

    /// The display name was rejected (empty names are not allowed).
    #[error("display name must not be empty")]
    InvalidName,
}
