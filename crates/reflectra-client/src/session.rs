//! Session accessor: backend origin and the persisted credential.
//!
//! The credential is never cached here. Every call re-reads the store so
//! that a login or logout performed elsewhere is picked up by the next
//! request.

use std::fmt;
use std::sync::Arc;

use reflectra_shared::constants::{LOCAL_HOSTNAMES, LOCAL_ORIGIN, PRODUCTION_ORIGIN};
use reflectra_shared::protocol::LoginResponse;
use reflectra_shared::{ReflectraError, Result};
use reflectra_store::{CredentialStore, StoredSession};
use tracing::{info, warn};

/// Map the hostname the client runs under to a backend origin.
pub fn origin_for_hostname(hostname: &str) -> &'static str {
    if LOCAL_HOSTNAMES.contains(&hostname) {
        LOCAL_ORIGIN
    } else {
        PRODUCTION_ORIGIN
    }
}

/// Details handed to the auth-failure hook after a protected call was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Path of the request that was refused.
    pub path: String,
    pub status: u16,
}

pub type AuthFailureHook = Arc<dyn Fn(&AuthFailure) + Send + Sync>;

/// Explicit session settings. Replaces any ambient "current location" lookup.
#[derive(Clone)]
pub struct SessionConfig {
    pub base_origin: String,
    /// Invoked once per rejected protected call, after the credential is cleared.
    /// Typically navigates to the login surface.
    pub on_auth_failure: AuthFailureHook,
}

impl SessionConfig {
    pub fn new(base_origin: impl Into<String>) -> Self {
        Self {
            base_origin: base_origin.into().trim_end_matches('/').to_string(),
            on_auth_failure: Arc::new(|failure: &AuthFailure| {
                info!(path = %failure.path, "session expired, login required");
            }),
        }
    }

    pub fn with_auth_failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AuthFailure) + Send + Sync + 'static,
    {
        self.on_auth_failure = Arc::new(hook);
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("base_origin", &self.base_origin)
            .finish_non_exhaustive()
    }
}

pub struct Session {
    config: SessionConfig,
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub fn new(config: SessionConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self { config, store }
    }

    pub fn current_origin(&self) -> &str {
        &self.config.base_origin
    }

    /// Bearer credential as stored right now, if any.
    ///
    /// A store that cannot be read is treated as signed out.
    pub fn current_credential(&self) -> Option<String> {
        match self.store.access_token() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read stored credential");
                None
            }
        }
    }

    /// Like [`Self::current_credential`] but fails fast when signed out.
    pub fn require_credential(&self) -> Result<String> {
        self.current_credential()
            .ok_or(ReflectraError::Unauthenticated)
    }

    /// Last-used display name, for greeting purposes only.
    pub fn display_name(&self) -> Option<String> {
        self.store.username().ok().flatten()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_credential().is_some()
    }

    pub fn sign_in(&self, login: &LoginResponse) -> Result<()> {
        self.store.save(&StoredSession {
            access_token: login.access.clone(),
            refresh_token: login.refresh.clone(),
            username: login.user.clone(),
        })?;
        info!(username = %login.user, "signed in");
        Ok(())
    }

    /// Replace the stored display name, keeping the tokens. No-op when
    /// signed out.
    pub fn set_display_name(&self, username: &str) -> Result<()> {
        let Some(access_token) = self.current_credential() else {
            return Ok(());
        };
        let refresh_token = self.store.refresh_token()?.unwrap_or_default();
        self.store.save(&StoredSession {
            access_token,
            refresh_token,
            username: username.to_string(),
        })?;
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.store.clear()?;
        info!("signed out");
        Ok(())
    }

    /// Clear the credential after the backend refused it, then notify the hook.
    pub(crate) fn expire(&self, failure: AuthFailure) {
        warn!(path = %failure.path, status = failure.status, "credential rejected by backend");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear rejected credential");
        }
        (self.config.on_auth_failure)(&failure);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use reflectra_store::MemoryStore;

    fn login_response() -> LoginResponse {
        LoginResponse {
            access: "acc-1".into(),
            refresh: "ref-1".into(),
            user: "alice".into(),
        }
    }

    #[test]
    fn test_origin_rule() {
        assert_eq!(origin_for_hostname("localhost"), LOCAL_ORIGIN);
        assert_eq!(origin_for_hostname("127.0.0.1"), LOCAL_ORIGIN);
        assert_eq!(origin_for_hostname("reflectra.app"), PRODUCTION_ORIGIN);
    }

    #[test]
    fn test_credential_reread_each_time() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(SessionConfig::new(LOCAL_ORIGIN), store.clone());
        assert_eq!(session.require_credential(), Err(ReflectraError::Unauthenticated));

        // Written behind the session's back.
        store
            .save(&StoredSession {
                access_token: "external".into(),
                refresh_token: "r".into(),
                username: "bob".into(),
            })
            .unwrap();
        assert_eq!(session.current_credential().as_deref(), Some("external"));

        session.sign_in(&login_response()).unwrap();
        assert_eq!(session.current_credential().as_deref(), Some("acc-1"));
        assert_eq!(session.display_name().as_deref(), Some("alice"));

        session.sign_out().unwrap();
        assert!(!session.is_signed_in());
        assert_eq!(session.display_name(), None);
    }

    #[test]
    fn test_set_display_name_keeps_tokens() {
        let session = Session::new(SessionConfig::new(LOCAL_ORIGIN), Arc::new(MemoryStore::new()));
        session.set_display_name("ghost").unwrap();
        assert_eq!(session.display_name(), None);

        session.sign_in(&login_response()).unwrap();
        session.set_display_name("alice2").unwrap();
        assert_eq!(session.display_name().as_deref(), Some("alice2"));
        assert_eq!(session.current_credential().as_deref(), Some("acc-1"));
    }

    #[test]
    fn test_expire_clears_and_notifies() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let config = SessionConfig::new("http://example.test/").with_auth_failure_hook(move |f| {
            assert_eq!(f.status, 401);
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(config.base_origin, "http://example.test");

        let session = Session::new(config, Arc::new(MemoryStore::new()));
        session.sign_in(&login_response()).unwrap();
        session.expire(AuthFailure {
            path: "/api/posts/".into(),
            status: 401,
        });

        assert!(!session.is_signed_in());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
