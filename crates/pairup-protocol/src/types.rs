//! Core protocol types for Pairup's wire format.
//!
//! This module defines every event that travels "on the wire" between a
//! client and the lobby server. The protocol is a closed pair of tagged
//! unions: [`ClientEvent`] for everything a client may send, and
//! [`ServerEvent`] for everything the server may emit. An event name that
//! isn't a variant here simply fails to decode — the router logs it and
//! moves on, so arbitrary data can never be forwarded to another client
//! under an attacker-chosen event name.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A short, shareable room code.
///
/// This is a "newtype wrapper" around `String`:
///
/// 1. **Type safety**: a room code can't be confused with a display name
///    or any other string in a function signature.
/// 2. **Single meaning**: the code is both the room's identity and its
///    only access control — whoever holds it can join.
///
/// `#[serde(transparent)]` makes it serialize as a plain JSON string, so
/// `RoomCode("9f2ac481")` becomes just `"9f2ac481"` on the wire.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Audience — who should receive an emission?
// ---------------------------------------------------------------------------

/// A delivery target for server emissions.
///
/// The router hands each outbound event to the switchboard together with
/// an audience: either the implicit lobby group (every connection not
/// currently in a room, the recipients of listing refreshes) or one
/// room's broadcast group. Direct-to-requester and direct-to-opponent
/// sends address a single connection id instead and don't go through a
/// group at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Every connection that is not currently in a room.
    Lobby,
    /// The members of one room.
    Room(RoomCode),
}

// ---------------------------------------------------------------------------
// Room listing
// ---------------------------------------------------------------------------

/// A summary of one open room in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    /// The room's code.
    pub code: RoomCode,
    /// Number of members currently in the room (always 1 for a listed
    /// room: full rooms are omitted from listings).
    pub members: usize,
}

// ---------------------------------------------------------------------------
// ClientEvent — everything a client may send
// ---------------------------------------------------------------------------

/// Events sent from a client to the server.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` produces internally
/// tagged JSON whose tag is the wire event name:
///
/// ```json
/// { "type": "join_room", "code": "9f2ac481" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// "Open a new room for me." Answered with
    /// [`ServerEvent::CreateRoomRes`].
    CreateRoom,

    /// "Put me in this room." Answered with [`ServerEvent::JoinRoomRes`];
    /// the room's current occupant is notified with
    /// [`ServerEvent::OpponentConnect`].
    JoinRoom { code: RoomCode },

    /// "Show me the open rooms." Answered with
    /// [`ServerEvent::ListRoomsRes`].
    ListRooms,

    /// "Set my display name." Empty names are rejected. Answered with
    /// [`ServerEvent::SetNameRes`].
    SetName { name: String },

    /// "Tell my opponent which color they play." Relayed verbatim as
    /// [`ServerEvent::SetOpponentColor`]; no acknowledgement.
    SetOpponentColor { color: String },

    /// "Push my display name to my opponent." Delivered to the opponent
    /// as [`ServerEvent::GetOpponentNameRes`].
    SendName,

    /// "What is my opponent called?" Answered directly when the name is
    /// known; relayed to the opponent as [`ServerEvent::GetOpponentName`]
    /// when they haven't named themselves yet.
    GetOpponentName,

    /// "I resign." Relayed to the opponent; acknowledged with
    /// [`ServerEvent::ResignRes`].
    Resign,

    /// "Let's play again." Relayed to the opponent; acknowledged with
    /// [`ServerEvent::PlayAgainRes`].
    PlayAgain,

    /// "I'm leaving the post-game lobby." Relayed to the opponent;
    /// acknowledged with [`ServerEvent::OpponentLeaveLobbyRes`].
    OpponentLeaveLobby,

    /// An opaque payload for the paired opponent.
    ///
    /// The value is relayed untouched, but always under the `opponent`
    /// event name — clients cannot smuggle arbitrary event names through
    /// this channel.
    Opponent { data: serde_json::Value },
}

// ---------------------------------------------------------------------------
// ServerEvent — everything the server may emit
// ---------------------------------------------------------------------------

/// Events sent from the server to a client.
///
/// Same wire format as [`ClientEvent`]: one JSON object, internally tagged
/// with the wire event name. Results for fallible requests carry either
/// the requested value or a `null`/`false` payload; failures are never
/// surfaced as connection errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Result of [`ClientEvent::CreateRoom`]: the new room's code, or
    /// `null` if the request was rejected.
    CreateRoomRes { code: Option<RoomCode> },

    /// Result of [`ClientEvent::JoinRoom`].
    JoinRoomRes { ok: bool },

    /// Listing refresh pushed to the lobby audience whenever room
    /// existence or open/full status changes.
    ListRooms { rooms: Vec<RoomListEntry> },

    /// Direct reply to [`ClientEvent::ListRooms`].
    ListRoomsRes { rooms: Vec<RoomListEntry> },

    /// Result of [`ClientEvent::SetName`].
    SetNameRes { ok: bool },

    /// Relayed color assignment from the opponent.
    SetOpponentColor { color: String },

    /// "Your room is now full — an opponent arrived."
    OpponentConnect,

    /// "Your opponent's connection closed."
    OpponentDisconnect,

    /// Relayed name request: "your opponent wants your name; send it."
    GetOpponentName,

    /// The opponent's display name (`null` when there is no opponent or
    /// they are unnamed).
    GetOpponentNameRes { name: Option<String> },

    /// Relayed resignation from the opponent.
    Resign,

    /// Result of [`ClientEvent::Resign`]: whether an opponent existed to
    /// be notified.
    ResignRes { ok: bool },

    /// Relayed rematch offer from the opponent.
    PlayAgain,

    /// Result of [`ClientEvent::PlayAgain`].
    PlayAgainRes { ok: bool },

    /// Relayed "leaving the lobby" notice from the opponent.
    OpponentLeaveLobby,

    /// Result of [`ClientEvent::OpponentLeaveLobby`].
    OpponentLeaveLobbyRes { ok: bool },

    /// Relayed opaque payload from the opponent.
    Opponent { data: serde_json::Value },

    /// Emitted (with `ok: false`) when an [`ClientEvent::Opponent`]
    /// payload had no opponent to go to.
    OpponentRes { ok: bool },
}

// =========================================================================
// Tests
// =========================================================================
