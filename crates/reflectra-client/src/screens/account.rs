use std::sync::Arc;

use reflectra_shared::protocol::ProfileUpdate;
use reflectra_shared::types::{Post, PostId, Profile, User, UserId};
use reflectra_shared::{validation, ReflectraError, Result};
use tokio::sync::watch;
use tracing::info;

use super::scope::{scoped_call, ScreenState, Scoped};
use super::{seed_following, toggle_follow};
use crate::backend::SocialBackend;
use crate::projector;
use crate::relationship::{FollowChange, RelationshipCache};

#[derive(Debug, Default)]
pub struct AccountState {
    profile: Option<Profile>,
    /// Followees as first fetched; filtered through the cache on read.
    roster: Vec<User>,
    posts: Vec<Post>,
    deleted: bool,
    notice: Option<String>,
}

impl ScreenState for AccountState {
    fn notice_mut(&mut self) -> &mut Option<String> {
        &mut self.notice
    }
}

/// The signed-in user's own page: profile form, own posts, followees.
pub struct AccountScreen<B> {
    backend: B,
    cache: Arc<RelationshipCache>,
    scoped: Scoped<AccountState>,
}

impl<B: SocialBackend> AccountScreen<B> {
    pub fn new(backend: B) -> Self {
        Self::with_cache(backend, Arc::new(RelationshipCache::new()))
    }

    pub fn with_cache(backend: B, cache: Arc<RelationshipCache>) -> Self {
        Self {
            backend,
            cache,
            scoped: Scoped::new(AccountState::default()),
        }
    }

    pub async fn mount(&self) {
        tokio::join!(
            self.load_profile(),
            seed_following(&self.backend, &self.cache, &self.scoped, |s, users| {
                s.roster = users
            }),
            self.load_posts(),
        );
    }

    async fn load_profile(&self) {
        match self.scoped.run(self.backend.profile()).await {
            None => {}
            Some(Ok(profile)) => {
                self.scoped.apply(|s| s.profile = Some(profile));
            }
            Some(Err(err)) => self.scoped.report("load profile", &err),
        }
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

    pub fn profile(&self) -> Option<Profile> {
        self.scoped.read(|s| s.profile.clone())
    }

    /// Posts written by the profile's username. Empty until the profile arrives.
    pub fn own_posts(&self) -> Vec<Post> {
        self.scoped.read(|s| match &s.profile {
            Some(profile) => projector::own_posts(&s.posts, &profile.username),
            None => Vec::new(),
        })
    }

    /// Followees still followed according to this screen's cache.
    pub fn following(&self) -> Vec<User> {
        let following = self.cache.snapshot();
        self.scoped
            .read(|s| projector::followed_users(&s.roster, &following))
    }

    pub async fn toggle_follow(&self, target: UserId) -> Result<FollowChange> {
        toggle_follow(&self.backend, &self.cache, &self.scoped, target).await
    }

    pub async fn save_profile(&self, update: ProfileUpdate) -> Result<()> {
        if let Err(e) = validation::profile_update(&update) {
            let err = ReflectraError::from(e);
            self.scoped.report("save profile", &err);
            return Err(err);
        }

        scoped_call(
            &self.scoped,
            "save profile",
            self.backend.update_profile(&update),
        )
        .await?;
        self.scoped.apply(|s| {
            // The backend renames the author of every existing post too.
            if let Some(old) = s.profile.as_ref().map(|p| p.username.clone()) {
                if old != update.name {
                    for post in s.posts.iter_mut().filter(|p| p.username == old) {
                        post.username = update.name.clone();
                    }
                }
            }
            s.profile = Some(Profile {
                username: update.name,
                email: update.email,
                bio: update.bio,
                mood_preference: update.mood,
            });
            s.notice = Some("Profile updated successfully!".to_string());
        });
        Ok(())
    }

    /// Delete one of the user's posts. It leaves the list only once the
    /// backend confirms.
    pub async fn delete_post(&self, id: PostId) -> Result<()> {
        scoped_call(&self.scoped, "delete post", self.backend.delete_post(id)).await?;
        info!(post = %id, "post deleted");
        self.scoped.apply(|s| s.posts.retain(|p| p.id != id));
        Ok(())
    }

    pub async fn delete_account(&self) -> Result<()> {
        scoped_call(&self.scoped, "delete account", self.backend.delete_account()).await?;
        self.scoped.apply(|s| {
            s.deleted = true;
            s.profile = None;
            s.notice = Some("Account deleted successfully.".to_string());
        });
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.scoped.read(|s| s.deleted)
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
        self.scoped.unmount(|_| {});
    }
}
