//! Wire protocol for Pairup.
//!
//! This crate defines the "language" that clients and the lobby server
//! speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomCode`], etc.) —
//!   the named events that travel on the wire, as closed tagged unions.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the lobby
//! (connection/room state). It doesn't know about connections or rooms —
//! it only knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent/ServerEvent) → Lobby (registries)
//! ```
//!
//! Every event is one JSON object tagged by its wire name:
//! `{"type": "join_room", "code": "9f2ac481"}`. There is no envelope —
//! the underlying channel already guarantees ordering, and the service
//! makes no delivery promises beyond best effort.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{Audience, ClientEvent, RoomCode, RoomListEntry, ServerEvent};
