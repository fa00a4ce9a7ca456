//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the CLI runs against a local backend with
//! zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use reflectra_shared::constants::DEFAULT_TIMEOUT_SECS;

use crate::session::origin_for_hostname;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hostname the client considers itself served from.
    /// Env: `REFLECTRA_HOSTNAME`
    /// Default: `localhost`
    pub hostname: String,

    /// Explicit backend origin, bypassing the hostname rule.
    /// Env: `REFLECTRA_API_ORIGIN`
    pub api_origin: Option<String>,

    /// Per-request transport timeout.
    /// Env: `REFLECTRA_TIMEOUT_SECS`
    /// Default: 15 seconds
    pub timeout: Duration,

    /// Directory holding the session database.
    /// Env: `REFLECTRA_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            api_origin: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("REFLECTRA_HOSTNAME") {
            if !host.trim().is_empty() {
                config.hostname = host.trim().to_string();
            }
        }

        if let Some(origin) = lookup("REFLECTRA_API_ORIGIN") {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() {
                config.api_origin = Some(origin.to_string());
            }
        }

        if let Some(val) = lookup("REFLECTRA_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %val, "Invalid REFLECTRA_TIMEOUT_SECS, using default");
                }
            }
        }

        if let Some(dir) = lookup("REFLECTRA_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        config
    }

    /// Origin every request is sent to.
    pub fn base_origin(&self) -> String {
        self.api_origin
            .clone()
            .unwrap_or_else(|| origin_for_hostname(&self.hostname).to_string())
    }
}
