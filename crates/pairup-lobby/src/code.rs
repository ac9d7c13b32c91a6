//! Room code generation.
//!
//! A room code doubles as the room's only access control — whoever holds
//! it can take the second seat — so codes come from a cryptographically
//! secure source and are long enough that guessing one of the handful of
//! live codes over the network is impractical, while staying short enough
//! to read out loud.
//!
//! Generation is pure and infallible. Uniqueness against live rooms is
//! not this module's job: the room registry re-generates on collision
//! rather than ever overwriting an existing room.

use pairup_protocol::RoomCode;
use rand::Rng;

/// Length of a room code in hex characters.
pub const CODE_LEN: usize = 8;

/// Generates a fresh random room code.
///
/// `rand::rng()` is a thread-local CSPRNG; four random bytes are formatted
/// as eight lowercase hex characters (`{:02x}` = lowercase hex, zero-padded
/// to two digits per byte).
pub fn generate() -> RoomCode {
    let mut rng = rand::rng();
    let bytes: [u8; CODE_LEN / 2] = rng.random();
    RoomCode(bytes.iter().map(|b| format!("{b:02x}")).collect())
}
