//! # reflectra-client
//!
//! Client core for the Reflectra social/wellness app:
//! - **Session accessor** resolving the backend origin and the stored credential
//! - **REST transport** with bearer injection and the auth-failure interceptor
//! - **Relationship cache** with confirm-then-update follow toggles
//! - **View projector** turning raw fetch results into render-ready lists
//! - **Screens** binding the above to a mount/unmount lifecycle

pub mod api;
pub mod backend;
pub mod config;
pub mod events;
pub mod projector;
pub mod relationship;
pub mod screens;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use api::ApiClient;
pub use backend::SocialBackend;
pub use config::ClientConfig;
pub use relationship::{FollowChange, RelationshipCache};
pub use session::{AuthFailure, Session, SessionConfig};

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn,reflectra_client=debug,reflectra_store=info";

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .try_init();
}
