//! Path resolution for the credential file and the on-disk cache.
//!
//! The cache lives at `<platform cache dir>/crossword-stats/` with one
//! subdirectory per user id. Credentials are read from
//! `<platform config dir>/crossword-stats/user_info.json`, overridable with
//! the `CROSSWORD_STATS_USER_INFO` environment variable.

use std::path::PathBuf;

use anyhow::Result;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "crossword-stats";

/// Credential file name in the config directory
const USER_INFO_FILE: &str = "user_info.json";

/// Environment variable overriding the credential file path
const USER_INFO_ENV: &str = "CROSSWORD_STATS_USER_INFO";

/// Root directory for cached remote payloads.
pub fn cache_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME))
}

/// Location of the credential file.
/// The env override is checked first so one-off runs can point anywhere;
/// otherwise the platform config directory is used.
pub fn credentials_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(USER_INFO_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
    Ok(config_dir.join(APP_NAME).join(USER_INFO_FILE))
}
