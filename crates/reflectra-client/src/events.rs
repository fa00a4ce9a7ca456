use reflectra_shared::types::UserId;
use tokio::sync::broadcast;

/// Backlog kept for slow relationship subscribers before they start lagging.
pub const RELATIONSHIP_EVENT_CAPACITY: usize = 64;

/// Confirmed change to a relationship cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipEvent {
    /// The cache was (re)built from a followee list.
    Seeded { count: usize },
    Followed(UserId),
    Unfollowed(UserId),
}

pub fn emit_event(tx: &broadcast::Sender<RelationshipEvent>, event: RelationshipEvent) {
    // No receivers is the common case for a screen-private cache.
    if tx.send(event).is_err() {
        tracing::trace!(?event, "no relationship subscribers");
    }
}
