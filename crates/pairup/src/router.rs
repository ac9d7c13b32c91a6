//! Per-connection event router.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!
//!   1. Register the connection and attach it to the switchboard; a fresh
//!      connection belongs to the lobby broadcast group.
//!   2. Loop: select between inbound socket data (decode → dispatch one
//!      coordinator call → emit results) and the connection's outbound
//!      queue (encode → write to the socket).
//!   3. On any exit — clean close, transport error, malformed stream —
//!      run the disconnect path: notify the opponent, re-home an evicted
//!      survivor, detach, and rebroadcast the listing if a room changed.
//!
//! Malformed or unknown inbound events are logged and swallowed; they
//! never kill the task or leave the registries half-mutated. Within one
//! handler, registry mutation always completes (and the lobby lock is
//! released) before any switchboard work: if the room-group join then
//! fails, the requester is told the operation failed even though the
//! registry already changed — that window is accepted by design.
//!
//! Lock order everywhere: lobby first, switchboard second.

use std::sync::Arc;

use pairup_lobby::{Departure, RoomChange};
use pairup_protocol::{Audience, ClientEvent, Codec, RoomCode, ServerEvent};
use pairup_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::PairupError;
use crate::server::{LobbySwitchboard, ServerState};

/// Drives a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) {
    let id = conn.id();
    let (tx, mut rx) = mpsc::unbounded_channel();

    {
        let mut lobby = state.lobby.lock().await;
        lobby.register(id);
        tracing::info!(%id, count = lobby.connection_count(), "connection opened");
    }
    {
        let mut switchboard = state.switchboard.lock().await;
        switchboard.attach(id, tx);
        if let Err(e) = switchboard.join_group(id, Audience::Lobby) {
            tracing::warn!(%id, error = %e, "lobby group join failed");
        }
    }

    if let Err(e) = pump(&conn, &state, id, &mut rx).await {
        tracing::debug!(%id, error = %e, "connection ended with error");
    }

    finalize_disconnect(&state, id).await;
}

/// The connection's event loop: socket in, queue out.
async fn pump<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    rx: &mut UnboundedReceiver<ServerEvent>,
) -> Result<(), PairupError> {
    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    let event: ClientEvent = match state.codec.decode(&data) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::debug!(%id, error = %e, "unrecognized event, ignoring");
                            continue;
                        }
                    };
                    dispatch(state, id, event).await;
                }
                Ok(None) => return Ok(()),
                Err(e) => return Err(e.into()),
            },
            outbound = rx.recv() => match outbound {
                Some(event) => {
                    let bytes = state.codec.encode(&event)?;
                    conn.send(&bytes).await?;
                }
                // Queue closed: the switchboard detached us.
                None => return Ok(()),
            },
        }
    }
}

/// Maps one inbound event to exactly one coordinator call plus emissions.
async fn dispatch<C: Codec>(
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    event: ClientEvent,
) {
    match event {
        ClientEvent::CreateRoom => handle_create_room(state, id).await,
        ClientEvent::JoinRoom { code } => handle_join_room(state, id, code).await,
        ClientEvent::ListRooms => handle_list_rooms(state, id).await,
        ClientEvent::SetName { name } => handle_set_name(state, id, &name).await,
        ClientEvent::SetOpponentColor { color } => {
            handle_set_opponent_color(state, id, color).await;
        }
        ClientEvent::SendName => handle_send_name(state, id).await,
        ClientEvent::GetOpponentName => handle_get_opponent_name(state, id).await,
        ClientEvent::Resign => {
            relay_with_ack(state, id, ServerEvent::Resign, |ok| {
                ServerEvent::ResignRes { ok }
            })
            .await;
        }
        ClientEvent::PlayAgain => {
            relay_with_ack(state, id, ServerEvent::PlayAgain, |ok| {
                ServerEvent::PlayAgainRes { ok }
            })
            .await;
        }
        ClientEvent::OpponentLeaveLobby => {
            relay_with_ack(state, id, ServerEvent::OpponentLeaveLobby, |ok| {
                ServerEvent::OpponentLeaveLobbyRes { ok }
            })
            .await;
        }
        ClientEvent::Opponent { data } => {
            handle_opponent_payload(state, id, data).await;
        }
    }
}

/// Queues an event for one connection, logging instead of propagating:
/// an undeliverable result means the recipient is already going away.
fn deliver(switchboard: &LobbySwitchboard, id: ConnectionId, event: ServerEvent) {
    if let Err(e) = switchboard.send(id, event) {
        tracing::debug!(%id, error = %e, "event undeliverable");
    }
}

async fn handle_create_room<C: Codec>(state: &Arc<ServerState<C>>, id: ConnectionId) {
    let (created, listing) = {
        let mut lobby = state.lobby.lock().await;
        let created = lobby.create_room(id);
        let listing = created.is_ok().then(|| lobby.open_rooms());
        (created, listing)
    };

    let mut switchboard = state.switchboard.lock().await;
    match created {
        Ok(code) => {
            switchboard.leave_group(id, &Audience::Lobby);
            let response = match switchboard.join_group(id, Audience::Room(code.clone())) {
                Ok(()) => ServerEvent::CreateRoomRes { code: Some(code) },
                Err(e) => {
                    tracing::warn!(%id, %code, error = %e, "room group join failed after create");
                    ServerEvent::CreateRoomRes { code: None }
                }
            };
            deliver(&switchboard, id, response);
            if let Some(rooms) = listing {
                switchboard.broadcast(&Audience::Lobby, ServerEvent::ListRooms { rooms }, None);
            }
        }
        Err(e) => {
            tracing::debug!(%id, error = %e, "create_room rejected");
            deliver(&switchboard, id, ServerEvent::CreateRoomRes { code: None });
        }
    }
}

async fn handle_join_room<C: Codec>(
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    code: RoomCode,
) {
    let (joined, listing) = {
        let mut lobby = state.lobby.lock().await;
        let joined = lobby.join_room(id, code.clone());
        let listing = joined.is_ok().then(|| lobby.open_rooms());
        (joined, listing)
    };

    let mut switchboard = state.switchboard.lock().await;
    match joined {
        Ok(outcome) => {
            switchboard.leave_group(id, &Audience::Lobby);
            let ok = match switchboard.join_group(id, Audience::Room(code.clone())) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(%id, %code, error = %e, "room group join failed after join");
                    false
                }
            };
            deliver(&switchboard, id, ServerEvent::JoinRoomRes { ok });
            deliver(&switchboard, outcome.opponent, ServerEvent::OpponentConnect);
            if let Some(rooms) = listing {
                switchboard.broadcast(&Audience::Lobby, ServerEvent::ListRooms { rooms }, None);
            }
        }
        Err(e) => {
            tracing::debug!(%id, %code, error = %e, "join_room rejected");
            deliver(&switchboard, id, ServerEvent::JoinRoomRes { ok: false });
        }
    }
}

async fn handle_list_rooms<C: Codec>(state: &Arc<ServerState<C>>, id: ConnectionId) {
    let rooms = state.lobby.lock().await.open_rooms();
    let switchboard = state.switchboard.lock().await;
    deliver(&switchboard, id, ServerEvent::ListRoomsRes { rooms });
}

async fn handle_set_name<C: Codec>(
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    name: &str,
) {
    let result = state.lobby.lock().await.set_name(id, name);
    if let Err(e) = &result {
        tracing::debug!(%id, error = %e, "set_name rejected");
    }
    let switchboard = state.switchboard.lock().await;
    deliver(&switchboard, id, ServerEvent::SetNameRes { ok: result.is_ok() });
}

async fn handle_set_opponent_color<C: Codec>(
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    color: String,
) {
    let opponent = state.lobby.lock().await.opponent_of(id);
    match opponent {
        Some(opponent) => {
            let switchboard = state.switchboard.lock().await;
            deliver(&switchboard, opponent, ServerEvent::SetOpponentColor { color });
        }
        None => {
            tracing::debug!(%id, "set_opponent_color with no opponent, dropping");
        }
    }
}

async fn handle_send_name<C: Codec>(state: &Arc<ServerState<C>>, id: ConnectionId) {
    let (opponent, name) = {
        let lobby = state.lobby.lock().await;
        (lobby.opponent_of(id), lobby.name_of(id).map(String::from))
    };
    match opponent {
        Some(opponent) => {
            let switchboard = state.switchboard.lock().await;
            deliver(&switchboard, opponent, ServerEvent::GetOpponentNameRes { name });
        }
        None => {
            tracing::debug!(%id, "send_name with no opponent, dropping");
        }
    }
}

async fn handle_get_opponent_name<C: Codec>(state: &Arc<ServerState<C>>, id: ConnectionId) {
    let (opponent, opponent_name) = {
        let lobby = state.lobby.lock().await;
        let opponent = lobby.opponent_of(id);
        let name = opponent.and_then(|o| lobby.name_of(o).map(String::from));
        (opponent, name)
    };

    let switchboard = state.switchboard.lock().await;
    match (opponent, opponent_name) {
        (Some(_), Some(name)) => {
            deliver(&switchboard, id, ServerEvent::GetOpponentNameRes { name: Some(name) });
        }
        // Unnamed opponent: ask them to push their name with send_name.
        (Some(opponent), None) => {
            deliver(&switchboard, opponent, ServerEvent::GetOpponentName);
        }
        (None, _) => {
            deliver(&switchboard, id, ServerEvent::GetOpponentNameRes { name: None });
        }
    }
}

/// The resign / play_again / opponent_leave_lobby family: relay the bare
/// event to the opponent and acknowledge the requester with whether an
/// opponent existed.
async fn relay_with_ack<C: Codec>(
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    relay: ServerEvent,
    ack: impl FnOnce(bool) -> ServerEvent,
) {
    let opponent = state.lobby.lock().await.opponent_of(id);
    let switchboard = state.switchboard.lock().await;
    match opponent {
        Some(opponent) => {
            deliver(&switchboard, opponent, relay);
            deliver(&switchboard, id, ack(true));
        }
        None => deliver(&switchboard, id, ack(false)),
    }
}

async fn handle_opponent_payload<C: Codec>(
    state: &Arc<ServerState<C>>,
    id: ConnectionId,
    data: serde_json::Value,
) {
    let opponent = state.lobby.lock().await.opponent_of(id);
    let switchboard = state.switchboard.lock().await;
    match opponent {
        Some(opponent) => {
            deliver(&switchboard, opponent, ServerEvent::Opponent { data });
        }
        None => deliver(&switchboard, id, ServerEvent::OpponentRes { ok: false }),
    }
}

/// The disconnect path. Runs on every handler exit and is safe even when
/// the connection's room was already torn down by a just-processed event.
async fn finalize_disconnect<C: Codec>(state: &Arc<ServerState<C>>, id: ConnectionId) {
    let (outcome, listing) = {
        let mut lobby = state.lobby.lock().await;
        let outcome = lobby.disconnect(id);
        let listing = outcome.departure.is_some().then(|| lobby.open_rooms());
        (outcome, listing)
    };

    let mut switchboard = state.switchboard.lock().await;
    if let Some(opponent) = outcome.opponent {
        deliver(&switchboard, opponent, ServerEvent::OpponentDisconnect);
    }
    if let Some(Departure {
        room,
        change: RoomChange::Destroyed {
            evicted: Some(evicted),
        },
    }) = &outcome.departure
    {
        // The survivor belongs to the lobby audience again.
        switchboard.leave_group(*evicted, &Audience::Room(room.clone()));
        if let Err(e) = switchboard.join_group(*evicted, Audience::Lobby) {
            tracing::warn!(%evicted, error = %e, "lobby group rejoin failed");
        }
    }
    switchboard.detach(id);
    if let Some(rooms) = listing {
        switchboard.broadcast(&Audience::Lobby, ServerEvent::ListRooms { rooms }, None);
    }
    tracing::info!(%id, count = outcome.remaining, "connection closed");
}
