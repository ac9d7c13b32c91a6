//! Connection state tracking for Pairup.
//!
//! This crate owns the server's record of each live client channel:
//!
//! 1. **Registration** — a [`Connection`] is created the moment a channel
//!    opens and destroyed when it closes; there is no handshake and no
//!    authentication (the connection id *is* the identity).
//! 2. **Display name** — optional, set once meaningfully via `set_name`.
//! 3. **Active room** — a back-reference to the room the connection is in,
//!    if any. The reference is maintained by the lobby coordinator; this
//!    crate never decides room membership on its own.
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby layer (above)  ← composes this registry with the room registry
//!     ↕
//! Session layer (this crate)  ← who is connected, what are they called
//!     ↕
//! Transport layer (below)  ← provides ConnectionId
//! ```

mod connection;
mod error;
mod registry;

pub use connection::Connection;
pub use error::ConnectionError;
pub use registry::ConnectionRegistry;
