//! Integration tests for the lobby coordinator.
//!
//! These drive multi-step create/join/leave/disconnect sequences and
//! re-check the cross-registry invariants after every operation:
//!
//! 1. an active-room back-reference names an existing room containing the
//!    connection;
//! 2. room member lists only contain registered connections;
//! 3. rooms hold one or two members while they exist;
//! 4. a room is absent from the registry iff its count would be zero
//!    (implied by 3: no zero-member room is ever observable).

use pairup_lobby::{
    DeparturePolicy, Lobby, LobbyConfig, LobbyError, ROOM_CAPACITY, RoomChange,
};
use pairup_transport::ConnectionId;
use rand::Rng;

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn teardown_lobby() -> Lobby {
    Lobby::new(LobbyConfig {
        departure_policy: DeparturePolicy::Teardown,
    })
}

fn reserve_lobby() -> Lobby {
    Lobby::new(LobbyConfig {
        departure_policy: DeparturePolicy::Reserve,
    })
}

/// Asserts every cross-registry invariant. Called after each step of a
/// sequence so a violation is pinned to the operation that introduced it.
fn assert_consistent(lobby: &Lobby, context: &str) {
    for connection in lobby.iter_connections() {
        if let Some(code) = connection.room() {
            let room = lobby
                .room(code)
                .unwrap_or_else(|| panic!("{context}: {} references missing room {code}", connection.id()));
            assert!(
                room.contains(connection.id()),
                "{context}: room {code} does not list {}",
                connection.id()
            );
        }
    }
    for (code, room) in lobby.iter_rooms() {
        assert!(
            (1..=ROOM_CAPACITY).contains(&room.member_count()),
            "{context}: room {code} has {} members",
            room.member_count()
        );
        for &member in room.members() {
            assert!(
                lobby.connection(member).is_some(),
                "{context}: room {code} lists unregistered {member}"
            );
        }
    }
}

// =========================================================================
// Membership bounds
// =========================================================================

#[test]
fn test_member_count_stays_within_bounds_across_sequence() {
    let mut lobby = teardown_lobby();
    for i in 1..=4 {
        lobby.register(cid(i));
    }

    let code = lobby.create_room(cid(1)).unwrap();
    assert_consistent(&lobby, "after create");
    assert_eq!(lobby.room(&code).unwrap().member_count(), 1);

    lobby.join_room(cid(2), code.clone()).unwrap();
    assert_consistent(&lobby, "after join");
    assert_eq!(lobby.room(&code).unwrap().member_count(), 2);

    // A third and fourth join attempt must fail and change nothing.
    for i in [3, 4] {
        let result = lobby.join_room(cid(i), code.clone());
        assert!(matches!(result, Err(LobbyError::RoomFull(_))));
        assert_consistent(&lobby, "after rejected join");
        assert_eq!(lobby.room(&code).unwrap().member_count(), 2);
        assert!(lobby.connection(cid(i)).unwrap().room().is_none());
    }
}

#[test]
fn test_room_absent_iff_count_would_be_zero() {
    let mut lobby = reserve_lobby();
    lobby.register(cid(1));
    lobby.register(cid(2));

    let code = lobby.create_room(cid(1)).unwrap();
    lobby.join_room(cid(2), code.clone()).unwrap();

    // 2 → 1: room persists under the reserve policy.
    let departure = lobby.leave_room(cid(1)).unwrap();
    assert_eq!(departure.change, RoomChange::Reopened);
    assert_consistent(&lobby, "after first leave");
    assert_eq!(lobby.room(&code).unwrap().member_count(), 1);

    // 1 → 0: room must vanish, never exist empty.
    let departure = lobby.leave_room(cid(2)).unwrap();
    assert_eq!(departure.change, RoomChange::Destroyed { evicted: None });
    assert_consistent(&lobby, "after second leave");
    assert!(lobby.room(&code).is_none());
}

// =========================================================================
// Disconnect scenarios
// =========================================================================

#[test]
fn test_disconnect_sole_member_destroys_room_and_listing_entry() {
    let mut lobby = teardown_lobby();
    lobby.register(cid(1));
    lobby.register(cid(2));
    let code = lobby.create_room(cid(1)).unwrap();
    assert_eq!(lobby.open_rooms().len(), 1);

    let outcome = lobby.disconnect(cid(1));

    assert_eq!(outcome.opponent, None, "sole occupant has no opponent");
    let departure = outcome.departure.expect("was in a room");
    assert_eq!(departure.room, code);
    assert_eq!(departure.change, RoomChange::Destroyed { evicted: None });
    assert_consistent(&lobby, "after disconnect");
    assert!(lobby.open_rooms().is_empty());
}

#[test]
fn test_disconnect_one_of_two_teardown_erases_room() {
    let mut lobby = teardown_lobby();
    lobby.register(cid(1));
    lobby.register(cid(2));
    let code = lobby.create_room(cid(1)).unwrap();
    lobby.join_room(cid(2), code.clone()).unwrap();

    let outcome = lobby.disconnect(cid(1));

    assert_eq!(outcome.opponent, Some(cid(2)));
    assert_eq!(
        outcome.departure.unwrap().change,
        RoomChange::Destroyed {
            evicted: Some(cid(2))
        }
    );
    assert_consistent(&lobby, "after disconnect");
    assert!(lobby.room(&code).is_none(), "room must leave no trace");
    assert!(lobby.open_rooms().is_empty());
    // The survivor is free to pair up again.
    assert!(lobby.create_room(cid(2)).is_ok());
}

#[test]
fn test_disconnect_one_of_two_reserve_keeps_open_room() {
    let mut lobby = reserve_lobby();
    lobby.register(cid(1));
    lobby.register(cid(2));
    let code = lobby.create_room(cid(1)).unwrap();
    lobby.join_room(cid(2), code.clone()).unwrap();
    assert!(lobby.open_rooms().is_empty(), "full room must not be listed");

    let outcome = lobby.disconnect(cid(1));

    assert_eq!(outcome.opponent, Some(cid(2)));
    assert_eq!(outcome.departure.unwrap().change, RoomChange::Reopened);
    assert_consistent(&lobby, "after disconnect");
    let listing = lobby.open_rooms();
    assert_eq!(listing.len(), 1, "reopened room must be listed again");
    assert_eq!(listing[0].code, code);
    assert_eq!(listing[0].members, 1);
}

#[test]
fn test_disconnect_is_safe_after_room_already_gone() {
    // A disconnect may race an event that already tore the room down.
    let mut lobby = teardown_lobby();
    lobby.register(cid(1));
    lobby.register(cid(2));
    let code = lobby.create_room(cid(1)).unwrap();
    lobby.join_room(cid(2), code).unwrap();

    // cid(2)'s departure tears the room down and evicts cid(1)...
    lobby.disconnect(cid(2));
    assert_consistent(&lobby, "after first disconnect");

    // ...so cid(1)'s disconnect finds no room, which must be fine.
    let outcome = lobby.disconnect(cid(1));
    assert_eq!(outcome.departure, None);
    assert_eq!(outcome.remaining, 0);
    assert_consistent(&lobby, "after second disconnect");
}

// =========================================================================
// Full pairing scenario
// =========================================================================

#[test]
fn test_pairing_lifecycle_create_join_relay_disconnect() {
    let mut lobby = teardown_lobby();
    lobby.register(cid(1)); // A
    lobby.register(cid(2)); // B

    // A creates a room.
    let code = lobby.create_room(cid(1)).unwrap();
    assert_consistent(&lobby, "after create");

    // B joins; the outcome names A as the member to notify.
    let outcome = lobby.join_room(cid(2), code.clone()).unwrap();
    assert_eq!(outcome.opponent, cid(1));
    assert_consistent(&lobby, "after join");

    // Relay lookups resolve both directions while paired.
    assert_eq!(lobby.opponent_of(cid(2)), Some(cid(1)));
    assert_eq!(lobby.opponent_of(cid(1)), Some(cid(2)));

    // A disconnects: B is the opponent to notify, and the room is gone
    // from the listing.
    let outcome = lobby.disconnect(cid(1));
    assert_eq!(outcome.opponent, Some(cid(2)));
    assert_consistent(&lobby, "after disconnect");
    assert!(lobby.open_rooms().iter().all(|entry| entry.code != code));
    assert_eq!(lobby.opponent_of(cid(2)), None);
}

// =========================================================================
// Randomized sequences
// =========================================================================

#[test]
fn test_invariants_hold_under_random_operation_sequences() {
    // Drive both policies through a few hundred arbitrary operations.
    // Correctness here is only "the invariants hold and nothing panics";
    // the specific outcomes are covered by the directed tests above.
    for policy in [DeparturePolicy::Teardown, DeparturePolicy::Reserve] {
        let mut lobby = Lobby::new(LobbyConfig {
            departure_policy: policy,
        });
        let mut rng = rand::rng();
        let mut next_id: u64 = 0;
        let mut known: Vec<ConnectionId> = Vec::new();

        for step in 0..500 {
            let context = format!("{policy:?} step {step}");
            match rng.random_range(0..6u8) {
                0 => {
                    next_id += 1;
                    known.push(cid(next_id));
                    lobby.register(cid(next_id));
                }
                1 if !known.is_empty() => {
                    let id = known[rng.random_range(0..known.len())];
                    let _ = lobby.create_room(id);
                }
                2 if !known.is_empty() => {
                    let id = known[rng.random_range(0..known.len())];
                    let codes: Vec<_> =
                        lobby.open_rooms().into_iter().map(|e| e.code).collect();
                    if let Some(code) = codes.first() {
                        let _ = lobby.join_room(id, code.clone());
                    }
                }
                3 if !known.is_empty() => {
                    let id = known[rng.random_range(0..known.len())];
                    let _ = lobby.leave_room(id);
                }
                4 if !known.is_empty() => {
                    let index = rng.random_range(0..known.len());
                    let id = known.swap_remove(index);
                    lobby.disconnect(id);
                }
                _ => {
                    // Read-only probes must never disturb state.
                    if let Some(&id) = known.first() {
                        let _ = lobby.opponent_of(id);
                    }
                    let _ = lobby.open_rooms();
                }
            }
            assert_consistent(&lobby, &context);
        }
    }
}
