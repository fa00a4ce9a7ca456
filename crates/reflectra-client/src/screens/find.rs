use std::sync::Arc;

use reflectra_shared::types::{AnnotatedUser, User, UserId};
use reflectra_shared::Result;
use tokio::sync::watch;

use super::scope::{scoped_call, ScreenState, Scoped};
use super::{load_current_user, seed_following, toggle_follow};
use crate::backend::SocialBackend;
use crate::projector;
use crate::relationship::{FollowChange, RelationshipCache};

#[derive(Debug, Default)]
pub struct FindState {
    me: Option<User>,
    /// Query the current results belong to.
    query: String,
    results: Vec<User>,
    loading: bool,
    notice: Option<String>,
}

impl ScreenState for FindState {
    fn notice_mut(&mut self) -> &mut Option<String> {
        &mut self.notice
    }
}

/// User directory with follow buttons.
pub struct FindScreen<B> {
    backend: B,
    cache: Arc<RelationshipCache>,
    scoped: Scoped<FindState>,
}

impl<B: SocialBackend> FindScreen<B> {
    pub fn new(backend: B) -> Self {
        Self::with_cache(backend, Arc::new(RelationshipCache::new()))
    }

    pub fn with_cache(backend: B, cache: Arc<RelationshipCache>) -> Self {
        Self {
            backend,
            cache,
            scoped: Scoped::new(FindState::default()),
        }
    }

    /// Load the current user, the followee list and every user.
    pub async fn mount(&self) {
        // A failed listing is already on the notice.
        let (_, _, _listing) = tokio::join!(
            load_current_user(&self.backend, &self.cache, &self.scoped, |s, me| s.me = Some(me)),
            seed_following(&self.backend, &self.cache, &self.scoped, |_, _| {}),
            self.search(""),
        );
    }

    /// Replace the results with users matching `query`. A response for a
    /// query that has since been replaced is dropped.
    pub async fn search(&self, query: &str) -> Result<Vec<AnnotatedUser>> {
        let query = query.trim().to_string();
        self.scoped.apply(|s| {
            s.query = query.clone();
            s.loading = true;
        });

        let outcome = scoped_call(&self.scoped, "search users", self.backend.search_users(&query)).await;
        self.scoped.apply(|s| {
            if s.query != query {
                return;
            }
            s.loading = false;
            match &outcome {
                Ok(users) => s.results = users.clone(),
                Err(_) => s.results.clear(),
            }
        });
        outcome.map(|users| projector::annotate_users(&users, &self.cache.snapshot()))
    }

    /// Current results, annotated against the cache as it is now.
    pub fn results(&self) -> Vec<AnnotatedUser> {
        let following = self.cache.snapshot();
        self.scoped
            .read(|s| projector::annotate_users(&s.results, &following))
    }

    pub fn current_user(&self) -> Option<User> {
        self.scoped.read(|s| s.me.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.scoped.read(|s| s.loading)
    }

    pub async fn toggle_follow(&self, target: UserId) -> Result<FollowChange> {
        toggle_follow(&self.backend, &self.cache, &self.scoped, target).await
    }

    pub fn cache(&self) -> &Arc<RelationshipCache> {
        &self.cache
    }

    pub fn notice(&self) -> Option<String> {
        self.scoped.notice()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.scoped.subscribe()
    }

    pub fn unmount(&self) {
        self.scoped.unmount(|s| s.loading = false);
    }
}
