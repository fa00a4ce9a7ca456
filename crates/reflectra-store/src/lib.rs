//! # reflectra-store
//!
//! Client-local persistence for the Reflectra session: the bearer access
//! token, the refresh token and the last-used display name.
//!
//! The values live in a small SQLite database under the platform data
//! directory. Every consumer talks to them through the [`CredentialStore`]
//! trait so that an in-memory [`MemoryStore`] can stand in for tests and
//! throwaway sessions.

pub mod credentials;
pub mod database;
pub mod migrations;
pub mod models;
pub mod values;

mod error;

pub use credentials::{CredentialStore, MemoryStore};
pub use database::Database;
pub use error::StoreError;
pub use models::*;
