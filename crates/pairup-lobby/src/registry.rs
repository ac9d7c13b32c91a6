//! The room registry: owns every live room.

use std::collections::HashMap;

use pairup_protocol::{RoomCode, RoomListEntry};
use pairup_transport::ConnectionId;

use crate::room::{Room, RoomChange};
use crate::{DeparturePolicy, LobbyError, code};

/// Registry of all live rooms, keyed by room code.
///
/// Like the connection registry, this is a plain `HashMap` with no
/// internal locking — the lobby coordinator is its only owner and the
/// server serializes coordinator calls.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    policy: DeparturePolicy,
}

impl RoomRegistry {
    /// Creates an empty registry with the given departure policy.
    pub fn new(policy: DeparturePolicy) -> Self {
        Self {
            rooms: HashMap::new(),
            policy,
        }
    }

    /// Creates a room owned by `owner` and returns its code.
    ///
    /// Codes are re-generated until unused. A collision never overwrites
    /// an existing room; with 2^32 codes and a handful of live rooms the
    /// loop effectively runs once.
    pub fn create(&mut self, owner: ConnectionId) -> RoomCode {
        let code = loop {
            let candidate = code::generate();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(%candidate, "room code collision, regenerating");
        };
        self.rooms.insert(code.clone(), Room::new(owner));
        tracing::info!(%code, %owner, "room created");
        code
    }

    /// Adds `joiner` to the room and returns the prior occupant (the new
    /// opponent). This is the only 1→2 transition.
    ///
    /// # Errors
    /// - [`LobbyError::NoSuchRoom`] — unknown code; nothing is mutated.
    /// - [`LobbyError::RoomFull`] — both seats taken; nothing is mutated.
    pub fn join(
        &mut self,
        code: &RoomCode,
        joiner: ConnectionId,
    ) -> Result<ConnectionId, LobbyError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| LobbyError::NoSuchRoom(code.clone()))?;
        if room.is_full() {
            return Err(LobbyError::RoomFull(code.clone()));
        }
        let opponent = match room.members().first().copied() {
            Some(member) => member,
            None => {
                // 0-member rooms must not exist; drop the husk and treat
                // the code as unknown.
                tracing::warn!(%code, "empty room found in registry, removing");
                self.rooms.remove(code);
                return Err(LobbyError::NoSuchRoom(code.clone()));
            }
        };
        room.admit(joiner);
        tracing::info!(%code, %joiner, "member joined room");
        Ok(opponent)
    }

    /// Removes a member from their room and applies the departure policy.
    ///
    /// The room is deleted when it would be left empty, and also — under
    /// [`DeparturePolicy::Teardown`] — when a second member remains; that
    /// member is reported as `evicted` so the caller can clear their
    /// back-reference and return them to the lobby audience.
    pub fn remove_member(
        &mut self,
        code: &RoomCode,
        id: ConnectionId,
    ) -> RoomChange {
        let Some(room) = self.rooms.get_mut(code) else {
            tracing::warn!(%code, %id, "departure from a room missing from the registry");
            return RoomChange::Destroyed { evicted: None };
        };
        if !room.remove(id) {
            tracing::warn!(%code, %id, "departing member missing from its room");
        }

        let destroy = room.members().is_empty()
            || self.policy == DeparturePolicy::Teardown;
        if destroy {
            let evicted = room.members().first().copied();
            self.rooms.remove(code);
            tracing::info!(%code, "room destroyed");
            RoomChange::Destroyed { evicted }
        } else {
            tracing::debug!(%code, "room reopened with a single occupant");
            RoomChange::Reopened
        }
    }

    /// Looks up a room by code.
    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Iterates over all live rooms.
    pub fn iter(&self) -> impl Iterator<Item = (&RoomCode, &Room)> {
        self.rooms.iter()
    }

    /// Returns the listing of rooms with a free seat, sorted by code so
    /// repeated broadcasts are byte-identical for identical state. Full
    /// rooms exist in the registry but are omitted here.
    pub fn open_rooms(&self) -> Vec<RoomListEntry> {
        let mut rooms: Vec<RoomListEntry> = self
            .rooms
            .iter()
            .filter(|(_, room)| !room.is_full())
            .map(|(code, room)| RoomListEntry {
                code: code.clone(),
                members: room.member_count(),
            })
            .collect();
        rooms.sort_by(|a, b| a.code.cmp(&b.code));
        rooms
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn teardown_registry() -> RoomRegistry {
        RoomRegistry::new(DeparturePolicy::Teardown)
    }

    fn reserve_registry() -> RoomRegistry {
        RoomRegistry::new(DeparturePolicy::Reserve)
    }

    // =====================================================================
    // create()
    // =====================================================================

    #[test]
    fn test_create_returns_unique_codes() {
        let mut reg = teardown_registry();
        let mut codes = std::collections::HashSet::new();
        for i in 0..100 {
            assert!(codes.insert(reg.create(cid(i)).0));
        }
        assert_eq!(reg.len(), 100);
    }

    #[test]
    fn test_create_room_starts_with_owner_only() {
        let mut reg = teardown_registry();
        let code = reg.create(cid(1));

        let room = reg.get(&code).expect("room should exist");
        assert_eq!(room.members(), &[cid(1)]);
        assert!(!room.is_full());
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_returns_prior_occupant() {
        let mut reg = teardown_registry();
        let code = reg.create(cid(1));

        let opponent = reg.join(&code, cid(2)).expect("should join");

        assert_eq!(opponent, cid(1));
        assert!(reg.get(&code).unwrap().is_full());
    }

    #[test]
    fn test_join_unknown_code_fails() {
        let mut reg = teardown_registry();

        let result = reg.join(&RoomCode::from("deadbeef"), cid(1));

        assert!(matches!(result, Err(LobbyError::NoSuchRoom(_))));
    }

    #[test]
    fn test_join_full_room_fails_without_mutation() {
        let mut reg = teardown_registry();
        let code = reg.create(cid(1));
        reg.join(&code, cid(2)).unwrap();

        let result = reg.join(&code, cid(3));

        assert!(matches!(result, Err(LobbyError::RoomFull(_))));
        let room = reg.get(&code).unwrap();
        assert_eq!(room.members(), &[cid(1), cid(2)]);
    }

    // =====================================================================
    // remove_member()
    // =====================================================================

    #[test]
    fn test_remove_member_last_occupant_destroys_room() {
        let mut reg = teardown_registry();
        let code = reg.create(cid(1));

        let change = reg.remove_member(&code, cid(1));

        assert_eq!(change, RoomChange::Destroyed { evicted: None });
        assert!(reg.get(&code).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_member_teardown_evicts_survivor() {
        let mut reg = teardown_registry();
        let code = reg.create(cid(1));
        reg.join(&code, cid(2)).unwrap();

        let change = reg.remove_member(&code, cid(1));

        assert_eq!(
            change,
            RoomChange::Destroyed {
                evicted: Some(cid(2))
            }
        );
        assert!(reg.get(&code).is_none(), "teardown must erase the room");
    }

    #[test]
    fn test_remove_member_reserve_keeps_single_occupant_room() {
        let mut reg = reserve_registry();
        let code = reg.create(cid(1));
        reg.join(&code, cid(2)).unwrap();

        let change = reg.remove_member(&code, cid(1));

        assert_eq!(change, RoomChange::Reopened);
        let room = reg.get(&code).expect("room should persist");
        assert_eq!(room.members(), &[cid(2)]);
        assert!(!room.is_full());
    }

    #[test]
    fn test_remove_member_reserve_destroys_when_empty() {
        let mut reg = reserve_registry();
        let code = reg.create(cid(1));
        reg.join(&code, cid(2)).unwrap();
        reg.remove_member(&code, cid(1));

        let change = reg.remove_member(&code, cid(2));

        assert_eq!(change, RoomChange::Destroyed { evicted: None });
        assert!(reg.is_empty());
    }

    #[test]
    fn test_reserved_room_accepts_a_new_opponent() {
        let mut reg = reserve_registry();
        let code = reg.create(cid(1));
        reg.join(&code, cid(2)).unwrap();
        reg.remove_member(&code, cid(1));

        let opponent = reg.join(&code, cid(3)).expect("reopened room should accept");

        assert_eq!(opponent, cid(2));
        assert!(reg.get(&code).unwrap().is_full());
    }

    // =====================================================================
    // open_rooms()
    // =====================================================================

    #[test]
    fn test_open_rooms_omits_full_rooms() {
        let mut reg = teardown_registry();
        let open = reg.create(cid(1));
        let full = reg.create(cid(2));
        reg.join(&full, cid(3)).unwrap();

        let listing = reg.open_rooms();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].code, open);
        assert_eq!(listing[0].members, 1);
    }

    #[test]
    fn test_open_rooms_is_sorted_by_code() {
        let mut reg = teardown_registry();
        for i in 0..10 {
            reg.create(cid(i));
        }

        let listing = reg.open_rooms();

        let codes: Vec<&RoomCode> = listing.iter().map(|e| &e.code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_open_rooms_empty_registry() {
        let reg = teardown_registry();
        assert!(reg.open_rooms().is_empty());
    }
}
