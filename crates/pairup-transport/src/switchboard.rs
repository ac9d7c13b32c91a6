//! The switchboard: per-connection outbound queues plus broadcast groups.
//!
//! The switchboard is the server-side half of the messaging channel: it maps
//! each live connection id to an unbounded mpsc sender whose receiver is
//! drained by that connection's handler task, and it tracks which
//! connections belong to which broadcast group. It never touches the socket
//! itself — delivery into the queue is synchronous and infallible unless the
//! receiving task is gone.
//!
//! Generic over the group key `G` and the event type `E` so it carries no
//! dependency on any particular wire protocol.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use tokio::sync::mpsc::UnboundedSender;

use crate::{ConnectionId, TransportError};

/// Routes events to connections directly or by broadcast group.
pub struct Switchboard<G, E> {
    /// Outbound queue per attached connection.
    links: HashMap<ConnectionId, UnboundedSender<E>>,

    /// Membership sets per group. Empty sets are pruned so the map only
    /// holds groups with at least one member.
    groups: HashMap<G, HashSet<ConnectionId>>,
}

impl<G, E> Switchboard<G, E>
where
    G: Clone + Eq + Hash + fmt::Debug,
    E: Clone,
{
    /// Creates an empty switchboard.
    pub fn new() -> Self {
        Self {
            links: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Attaches a connection's outbound queue.
    ///
    /// Attaching an already-known id replaces the previous queue (logged —
    /// it indicates a connection-id reuse bug upstream).
    pub fn attach(&mut self, id: ConnectionId, sender: UnboundedSender<E>) {
        if self.links.insert(id, sender).is_some() {
            tracing::warn!(%id, "re-attaching known connection, replacing queue");
        }
    }

    /// Detaches a connection: drops its queue and removes it from every
    /// group. Safe to call for unknown ids.
    pub fn detach(&mut self, id: ConnectionId) {
        self.links.remove(&id);
        self.groups.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
    }

    /// Returns `true` if the connection has an attached queue.
    pub fn is_attached(&self, id: ConnectionId) -> bool {
        self.links.contains_key(&id)
    }

    /// Delivers an event to a single connection.
    pub fn send(&self, id: ConnectionId, event: E) -> Result<(), TransportError> {
        let link = self
            .links
            .get(&id)
            .ok_or(TransportError::NotAttached(id))?;
        link.send(event)
            .map_err(|_| TransportError::ConnectionClosed(id.to_string()))
    }

    /// Adds a connection to a broadcast group.
    ///
    /// Fails with [`TransportError::NotAttached`] if the connection has no
    /// queue — a group must never contain ids that cannot be delivered to.
    pub fn join_group(&mut self, id: ConnectionId, group: G) -> Result<(), TransportError> {
        if !self.links.contains_key(&id) {
            return Err(TransportError::NotAttached(id));
        }
        self.groups.entry(group).or_default().insert(id);
        Ok(())
    }

    /// Removes a connection from a broadcast group. No-op if the connection
    /// was not a member.
    pub fn leave_group(&mut self, id: ConnectionId, group: &G) {
        if let Some(members) = self.groups.get_mut(group) {
            members.remove(&id);
            if members.is_empty() {
                self.groups.remove(group);
            }
        }
    }

    /// Delivers an event to every member of a group, optionally excluding
    /// one connection. Returns the number of queues the event reached.
    ///
    /// Members whose queue is gone are skipped; group membership is pruned
    /// on [`detach`](Self::detach), so a miss here is a transient race, not
    /// an error.
    pub fn broadcast(&self, group: &G, event: E, except: Option<ConnectionId>) -> usize {
        let Some(members) = self.groups.get(group) else {
            return 0;
        };

        let mut delivered = 0;
        for &member in members {
            if Some(member) == except {
                continue;
            }
            match self.links.get(&member) {
                Some(link) if link.send(event.clone()).is_ok() => delivered += 1,
                _ => {
                    tracing::debug!(%member, ?group, "skipping unreachable group member");
                }
            }
        }
        delivered
    }

    /// Returns the number of members in a group.
    pub fn group_len(&self, group: &G) -> usize {
        self.groups.get(group).map_or(0, HashSet::len)
    }

    /// Returns the number of attached connections.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no connections are attached.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<G, E> Default for Switchboard<G, E>
where
    G: Clone + Eq + Hash + fmt::Debug,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
