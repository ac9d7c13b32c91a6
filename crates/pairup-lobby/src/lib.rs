//! Room lifecycle and lobby coordination for Pairup.
//!
//! The [`Lobby`] owns the only two pieces of shared mutable state in the
//! service — the connection registry and the room registry — and is the
//! sole writer to both. Callers (the event router) never see the raw maps;
//! every mutation goes through a coordinator operation that leaves the
//! cross-registry invariants intact:
//!
//! - an active-room back-reference always names an existing room that
//!   contains the connection;
//! - a room's member list only contains registered connections;
//! - a room holds one or two members, never zero, never three;
//! - room codes are unique among live rooms.
//!
//! # Key types
//!
//! - [`Lobby`] — the coordinator; composes both registries atomically
//! - [`RoomRegistry`] — room ownership, join/departure, open-room listing
//! - [`Room`] — one two-seat room's member list
//! - [`LobbyConfig`] / [`DeparturePolicy`] — what happens to a room when
//!   one of two members departs
//! - [`code`] — the room code generator

mod config;
mod error;
mod lobby;
mod registry;
mod room;

pub mod code;

pub use config::{DeparturePolicy, LobbyConfig};
pub use error::LobbyError;
pub use lobby::{Departure, DisconnectOutcome, JoinOutcome, Lobby};
pub use registry::RoomRegistry;
pub use room::{ROOM_CAPACITY, Room, RoomChange};
