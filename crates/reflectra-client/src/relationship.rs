//! Relationship cache: the set of user ids the signed-in user follows.
//!
//! Membership changes only after the backend confirms a follow or unfollow.
//! Toggles on the same target are serialized, so the call chosen by a later
//! toggle always reflects the outcome of the earlier one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use reflectra_shared::types::{User, UserId};
use reflectra_shared::{ReflectraError, Result, ValidationError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::SocialBackend;
use crate::events::{emit_event, RelationshipEvent, RELATIONSHIP_EVENT_CAPACITY};

/// Outcome of a confirmed toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
    Followed,
    Unfollowed,
}

impl FollowChange {
    pub fn is_following(self) -> bool {
        matches!(self, FollowChange::Followed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// The followee list has not arrived yet.
    Pending,
    Ready,
    /// The followee list could not be fetched; the set stays as it was.
    Failed(String),
}

#[derive(Debug)]
struct CacheState {
    following: HashSet<UserId>,
    status: CacheStatus,
    self_id: Option<UserId>,
}

#[derive(Debug)]
pub struct RelationshipCache {
    state: RwLock<CacheState>,
    /// One lock per target with a toggle in flight.
    toggles: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
    events: broadcast::Sender<RelationshipEvent>,
}

impl Default for RelationshipCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(RELATIONSHIP_EVENT_CAPACITY);
        Self {
            state: RwLock::new(CacheState {
                following: HashSet::new(),
                status: CacheStatus::Pending,
                self_id: None,
            }),
            toggles: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Replace the set with the ids of a fetched followee list.
    pub fn seed<I: IntoIterator<Item = UserId>>(&self, ids: I) {
        let count = {
            let mut state = self.state.write();
            state.following = ids.into_iter().collect();
            state.status = CacheStatus::Ready;
            state.following.len()
        };
        debug!(count, "relationship cache seeded");
        emit_event(&self.events, RelationshipEvent::Seeded { count });
    }

    pub fn seed_failed(&self, message: impl Into<String>) {
        self.state.write().status = CacheStatus::Failed(message.into());
    }

    /// Fetch the followee list and seed from it. On failure the set is left
    /// untouched and the status records the error.
    pub async fn load<B: SocialBackend>(&self, backend: &B) -> Result<Vec<User>> {
        match backend.following().await {
            Ok(users) => {
                self.seed(users.iter().map(|u| u.id));
                Ok(users)
            }
            Err(e) => {
                warn!(error = %e, "failed to load followee list");
                self.seed_failed(e.user_message());
                Err(e)
            }
        }
    }

    pub fn is_following(&self, id: UserId) -> bool {
        self.state.read().following.contains(&id)
    }

    pub fn snapshot(&self) -> HashSet<UserId> {
        self.state.read().following.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().following.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> CacheStatus {
        self.state.read().status.clone()
    }

    /// Record the signed-in user's id so that self-follows are refused locally.
    pub fn set_self_id(&self, id: UserId) {
        self.state.write().self_id = Some(id);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelationshipEvent> {
        self.events.subscribe()
    }

    fn toggle_slot(&self, target: UserId) -> ToggleSlot<'_> {
        let lock = self.toggles.lock().entry(target).or_default().clone();
        ToggleSlot {
            cache: self,
            target,
            lock,
        }
    }

    /// Follow `target` if not followed, otherwise unfollow it.
    ///
    /// The set is updated only after the backend confirms. A failed call
    /// leaves the set exactly as it was.
    pub async fn toggle_follow<B: SocialBackend>(
        &self,
        backend: &B,
        target: UserId,
    ) -> Result<FollowChange> {
        if self.state.read().self_id == Some(target) {
            return Err(ReflectraError::ValidationFailed(ValidationError::SelfFollow));
        }

        // Dropped after the guard, also when this future is abandoned.
        let slot = self.toggle_slot(target);
        let _serialized = slot.lock.lock().await;
        self.confirm_toggle(backend, target).await
    }

    async fn confirm_toggle<B: SocialBackend>(
        &self,
        backend: &B,
        target: UserId,
    ) -> Result<FollowChange> {
        let currently = self.is_following(target);
        let call = if currently {
            backend.unfollow(target).await
        } else {
            backend.follow(target).await
        };

        if let Err(e) = call {
            warn!(%target, currently, error = %e, "follow toggle failed");
            return Err(e);
        }

        let change = {
            let mut state = self.state.write();
            if currently {
                state.following.remove(&target);
                FollowChange::Unfollowed
            } else {
                state.following.insert(target);
                FollowChange::Followed
            }
        };
        info!(%target, ?change, "follow toggled");
        emit_event(
            &self.events,
            match change {
                FollowChange::Followed => RelationshipEvent::Followed(target),
                FollowChange::Unfollowed => RelationshipEvent::Unfollowed(target),
            },
        );
        Ok(change)
    }
}

/// A caller's claim on a target's toggle lock. The map entry goes away
/// with the last claim.
struct ToggleSlot<'a> {
    cache: &'a RelationshipCache,
    target: UserId,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for ToggleSlot<'_> {
    fn drop(&mut self) {
        let mut toggles = self.cache.toggles.lock();
        // Map entry plus ours: nobody else is waiting.
        if Arc::strong_count(&self.lock) <= 2 {
            toggles.remove(&self.target);
        }
    }
}
