use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Credentials loaded once per process, see [`load`].
static CREDENTIALS: OnceLock<Credentials> = OnceLock::new();

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("credential file not found: {0}")]
    NotFound(String),

    #[error("failed to read credential file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("credential file {path} is not valid JSON: {source}")]
    Invalid {
        path: String,
        source: serde_json::Error,
    },

    #[error("credential file is missing the `{0}` field or it is empty")]
    MissingField(&'static str),
}

/// The two secrets needed to talk to the NYT crosswords service.
/// Immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    user_id: String,
    cookie: String,
}

impl Credentials {
    /// Read and validate credentials from a JSON file.
    /// Both fields must be present and non-empty; anything else is a fatal
    /// configuration error, not something to retry or degrade around.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::NotFound(display));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| {
            ConfigError::Unreadable {
                path: display.clone(),
                source,
            }
        })?;
        let creds: Credentials = serde_json::from_str(&contents).map_err(|source| {
            ConfigError::Invalid {
                path: display,
                source,
            }
        })?;
        if creds.user_id.is_empty() {
            return Err(ConfigError::MissingField("user_id"));
        }
        if creds.cookie.is_empty() {
            return Err(ConfigError::MissingField("cookie"));
        }
        Ok(creds)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_cookie(&self) -> &str {
        &self.cookie
    }
}

/// Load credentials, memoized for the remainder of the process.
/// The file is read at most once; every later call returns the same value
/// without touching the filesystem. Credentials are static per run, so no
/// invalidation hook exists.
pub fn load(path: &Path) -> Result<&'static Credentials, ConfigError> {
    if let Some(creds) = CREDENTIALS.get() {
        return Ok(creds);
    }
    let creds = Credentials::from_file(path)?;
    debug!(user_id = %creds.user_id, "Loaded credentials");
    Ok(CREDENTIALS.get_or_init(|| creds))
}

// Serde treats a JSON `null` as a missing field for plain `String`, so a
// null `user_id`/`cookie` already fails at parse time; the empty-string
// checks above cover the remaining degenerate case.
