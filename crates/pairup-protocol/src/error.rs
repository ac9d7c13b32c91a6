//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// `#[derive(thiserror::Error)]` auto-generates the `std::error::Error`
/// trait implementation; the `#[error("...")]` attributes define the
/// human-readable message for each variant.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `"type"` tag, missing
    /// required fields, or truncated messages. The router treats this as
    /// a malformed inbound event: logged and dropped, never fatal.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level even though it
    /// deserialized cleanly.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
