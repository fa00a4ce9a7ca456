//! The persisted session as seen by the rest of the client.

use std::collections::HashMap;

use parking_lot::Mutex;
use reflectra_shared::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY};

use crate::database::Database;
use crate::error::Result;
use crate::models::StoredSession;

/// Read-many, write-rare access to the persisted credential.
///
/// Several screens (and other processes, for the SQLite implementation) may
/// share one store. No reader may assume the value it saw earlier is still
/// current; callers re-read immediately before each use.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Persist all three session fields together.
    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Remove all three session fields together.
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        self.get(REFRESH_TOKEN_KEY)
    }

    /// Last-used display name.
    fn username(&self) -> Result<Option<String>> {
        self.get(USERNAME_KEY)
    }
}

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY];

impl CredentialStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_value(key)?.map(|v| v.value))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        self.put_values(&[
            (ACCESS_TOKEN_KEY, session.access_token.as_str()),
            (REFRESH_TOKEN_KEY, session.refresh_token.as_str()),
            (USERNAME_KEY, session.username.as_str()),
        ])?;
        tracing::debug!(username = %session.username, "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let removed = self.delete_values(&SESSION_KEYS)?;
        tracing::debug!(removed, "session cleared");
        Ok(())
    }
}

/// Volatile store for tests and sessions that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a signed-in session.
    pub fn signed_in(session: &StoredSession) -> Self {
        let store = Self::new();
        let mut values = store.values.lock();
        values.insert(ACCESS_TOKEN_KEY.into(), session.access_token.clone());
        values.insert(REFRESH_TOKEN_KEY.into(), session.refresh_token.clone());
        values.insert(USERNAME_KEY.into(), session.username.clone());
        drop(values);
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let mut values = self.values.lock();
        values.insert(ACCESS_TOKEN_KEY.into(), session.access_token.clone());
        values.insert(REFRESH_TOKEN_KEY.into(), session.refresh_token.clone());
        values.insert(USERNAME_KEY.into(), session.username.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut values = self.values.lock();
        for key in SESSION_KEYS {
            values.remove(key);
        }
        Ok(())
    }
}
