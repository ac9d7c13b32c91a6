//! Lobby configuration.

/// What happens to a full room when one of its two members departs.
///
/// The two policies correspond to two different products: `Teardown`
/// treats a pairing as finished the moment it breaks (the survivor is
/// returned to the lobby and the code dies), `Reserve` treats the room as
/// a meeting point that can accept a replacement opponent under the same
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeparturePolicy {
    /// Tear the room down immediately. The remaining member is evicted
    /// back to the lobby audience and the code disappears from every
    /// listing.
    #[default]
    Teardown,

    /// Keep the room alive with its single remaining occupant. It counts
    /// as open again and reappears in listings until someone joins or the
    /// survivor disconnects.
    Reserve,
}

/// Configuration for a [`Lobby`](crate::Lobby) instance.
#[derive(Debug, Clone, Default)]
pub struct LobbyConfig {
    /// Room behavior when one of two members departs.
    pub departure_policy: DeparturePolicy,
}
