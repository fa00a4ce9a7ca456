//! Screens: fetch-on-mount state holders over a [`SocialBackend`].
//!
//! Each screen owns its state behind a [`Scoped`] and, unless handed a
//! shared one, its own [`RelationshipCache`]. Mount fetches run
//! concurrently and each result is applied as it arrives; views are
//! projected on read.

pub mod account;
pub mod auth;
pub mod feed;
pub mod find;
pub mod messages;
pub mod scope;
pub mod wellness;

pub use account::AccountScreen;
pub use auth::AuthScreen;
pub use feed::FeedScreen;
pub use find::FindScreen;
pub use messages::MessagesScreen;
pub use scope::{ScreenState, Scoped};
pub use wellness::WellnessScreen;

use reflectra_shared::types::{User, UserId};
use reflectra_shared::Result;

use crate::backend::SocialBackend;
use crate::relationship::{FollowChange, RelationshipCache};

/// Fetch the followee list and seed `cache` from it, unless unmounted first.
pub(crate) async fn seed_following<B, S>(
    backend: &B,
    cache: &RelationshipCache,
    scoped: &Scoped<S>,
    keep: impl FnOnce(&mut S, Vec<User>),
) where
    B: SocialBackend,
    S: ScreenState,
{
    match scoped.run(backend.following()).await {
        None => {}
        Some(Ok(users)) => {
            scoped.apply(|state| {
                cache.seed(users.iter().map(|u| u.id));
                keep(state, users);
            });
        }
        Some(Err(err)) => {
            scoped.report("load following", &err);
            scoped.apply(|_| cache.seed_failed(err.user_message()));
        }
    }
}

/// Fetch the signed-in user's record and arm the self-follow guard.
pub(crate) async fn load_current_user<B, S>(
    backend: &B,
    cache: &RelationshipCache,
    scoped: &Scoped<S>,
    keep: impl FnOnce(&mut S, User),
) where
    B: SocialBackend,
    S: ScreenState,
{
    match scoped.run(backend.current_user()).await {
        None => {}
        Some(Ok(me)) => {
            scoped.apply(|state| {
                cache.set_self_id(me.id);
                keep(state, me);
            });
        }
        Some(Err(err)) => scoped.report("load current user", &err),
    }
}

/// Toggle through the cache and surface the outcome on the screen.
///
/// The backend call is not raced against unmount so that a cache shared
/// with other screens never misses a confirmed change.
pub(crate) async fn toggle_follow<B, S>(
    backend: &B,
    cache: &RelationshipCache,
    scoped: &Scoped<S>,
    target: UserId,
) -> Result<FollowChange>
where
    B: SocialBackend,
    S: ScreenState,
{
    match cache.toggle_follow(backend, target).await {
        Ok(change) => {
            scoped.clear_notice();
            Ok(change)
        }
        Err(err) => {
            scoped.report("toggle follow", &err);
            Err(err)
        }
    }
}
