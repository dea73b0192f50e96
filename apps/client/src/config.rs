//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::api::DEFAULT_REQUEST_TIMEOUT;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
const DEFAULT_PROFILE_URL: &str = "https://api.github.com";
const PREFERENCES_FILE: &str = "preferences.db";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the word-link backend.
    pub backend_url: String,
    /// Base URL of the identity profile service.
    pub profile_url: String,
    /// Session cookie of a logged-in user, e.g. `JSESSIONID=abc`.
    pub session_cookie: Option<String>,
    /// Directory holding local state.
    pub data_dir: PathBuf,
    /// Upper bound for a single backend request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Read configuration from `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            backend_url: non_empty("WORDLINK_BACKEND_URL")
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            profile_url: non_empty("WORDLINK_PROFILE_URL")
                .unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string()),
            session_cookie: non_empty("WORDLINK_SESSION_COOKIE"),
            data_dir: non_empty("WORDLINK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            request_timeout: non_empty("WORDLINK_REQUEST_TIMEOUT_SECS")
                .and_then(|raw| parse_timeout(&raw))
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Path of the local preference database.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!(value = raw, "ignoring invalid WORDLINK_REQUEST_TIMEOUT_SECS");
            None
        }
    }
}

fn default_data_dir() -> PathBuf {
    // Fall back to the current dir when there is no local data dir
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordlink")
}
