use std::sync::Arc;

use reflectra_shared::protocol::NewPost;
use reflectra_shared::types::{AnnotatedUser, Post, User, UserId};
use reflectra_shared::{validation, ReflectraError, Result};
use tokio::sync::watch;
use tracing::info;

use super::scope::{scoped_call, ScreenState, Scoped};
use super::{load_current_user, seed_following, toggle_follow};
use crate::backend::SocialBackend;
use crate::projector;
use crate::relationship::{FollowChange, RelationshipCache};

#[derive(Debug, Default)]
pub struct FeedState {
    me: Option<User>,
    posts: Vec<Post>,
    /// `None` until a search has been run.
    search: Option<Vec<User>>,
    search_query: String,
    selected: Option<User>,
    notice: Option<String>,
}

impl ScreenState for FeedState {
    fn notice_mut(&mut self) -> &mut Option<String> {
        &mut self.notice
    }
}

/// Activity feed: posts by the user and their followees, publishing,
/// user search and a profile card for a selected search result.
pub struct FeedScreen<B> {
    backend: B,
    cache: Arc<RelationshipCache>,
    scoped: Scoped<FeedState>,
}

impl<B: SocialBackend> FeedScreen<B> {
    pub fn new(backend: B) -> Self {
        Self::with_cache(backend, Arc::new(RelationshipCache::new()))
    }

    pub fn with_cache(backend: B, cache: Arc<RelationshipCache>) -> Self {
        Self {
            backend,
            cache,
            scoped: Scoped::new(FeedState::default()),
        }
    }

    pub async fn mount(&self) {
        tokio::join!(
            load_current_user(&self.backend, &self.cache, &self.scoped, |s, me| s.me = Some(me)),
            seed_following(&self.backend, &self.cache, &self.scoped, |_, _| {}),
            self.load_posts(),
        );
    }

    async fn load_posts(&self) {
        match self.scoped.run(self.backend.posts()).await {
            None => {}
            Some(Ok(posts)) => {
                self.scoped.apply(|s| s.posts = posts);
            }
            Some(Err(err)) => self.scoped.report("load posts", &err),
        }
    }

    /// Posts authored by the current user or a followee.
    pub fn visible_posts(&self) -> Vec<Post> {
        let following = self.cache.snapshot();
        self.scoped.read(|s| {
            projector::visible_posts(&s.posts, &following, s.me.as_ref().map(|u| u.id))
        })
    }

    pub fn current_user(&self) -> Option<User> {
        self.scoped.read(|s| s.me.clone())
    }

    /// Publish a post and put the stored record at the top of the feed.
    pub async fn publish(&self, text: &str) -> Result<Post> {
        let content_text = match validation::post_body(text) {
            Ok(body) => body,
            Err(e) => {
                let err = ReflectraError::from(e);
                self.scoped.report("publish", &err);
                return Err(err);
            }
        };

        let post = scoped_call(
            &self.scoped,
            "publish",
            self.backend.create_post(&NewPost { content_text }),
        )
        .await?;
        info!(post = %post.id, "post published");
        self.scoped.apply(|s| {
            s.posts.insert(0, post.clone());
            s.notice = None;
        });
        Ok(post)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<AnnotatedUser>> {
        let query = query.trim().to_string();
        self.scoped.apply(|s| s.search_query = query.clone());

        let outcome = scoped_call(&self.scoped, "search users", self.backend.search_users(&query)).await;
        self.scoped.apply(|s| {
            if s.search_query == query {
                s.search = Some(outcome.as_ref().cloned().unwrap_or_default());
            }
        });
        outcome.map(|users| projector::annotate_users(&users, &self.cache.snapshot()))
    }

    pub fn search_results(&self) -> Option<Vec<AnnotatedUser>> {
        let following = self.cache.snapshot();
        self.scoped.read(|s| {
            s.search
                .as_ref()
                .map(|users| projector::annotate_users(users, &following))
        })
    }

    /// Open the profile card of a search result.
    pub fn select_profile(&self, id: UserId) -> Option<AnnotatedUser> {
        let user = self.scoped.read(|s| {
            s.search
                .as_ref()
                .and_then(|users| users.iter().find(|u| u.id == id).cloned())
        })?;
        self.scoped.apply(|s| s.selected = Some(user.clone()))?;
        Some(projector::annotate(&user, &self.cache.snapshot()))
    }

    /// The open profile card, with its follow flag taken from the cache.
    pub fn selected_profile(&self) -> Option<AnnotatedUser> {
        let following = self.cache.snapshot();
        self.scoped
            .read(|s| s.selected.as_ref().map(|u| projector::annotate(u, &following)))
    }

    pub fn close_profile(&self) {
        self.scoped.apply(|s| s.selected = None);
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
        self.scoped.unmount(|s| s.selected = None);
    }
}
