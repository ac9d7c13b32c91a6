//! # Pairup
//!
//! A real-time matchmaking lobby server for two-player games.
//!
//! Clients connect over a persistent WebSocket channel, create or discover
//! two-seat rooms by short shareable codes, and exchange relayed events
//! with their paired opponent until one side disconnects or resigns. The
//! lobby audience — every connection not currently in a room — receives a
//! pushed refresh of the open-room listing whenever room existence or
//! open/full status changes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pairup::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PairupError> {
//!     let server = PairupServerBuilder::new()
//!         .bind("0.0.0.0:4000")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod router;
mod server;

pub use error::PairupError;
pub use server::{PairupServer, PairupServerBuilder};

/// The commonly-needed names, importable in one line.
pub mod prelude {
    pub use crate::{PairupError, PairupServer, PairupServerBuilder};
    pub use pairup_lobby::{
        DeparturePolicy, Lobby, LobbyConfig, LobbyError, RoomChange,
    };
    pub use pairup_protocol::{
        Audience, ClientEvent, Codec, JsonCodec, ProtocolError, RoomCode,
        RoomListEntry, ServerEvent,
    };
    pub use pairup_session::{Connection, ConnectionError, ConnectionRegistry};
    pub use pairup_transport::{ConnectionId, Switchboard, TransportError};
}
