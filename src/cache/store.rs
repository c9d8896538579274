use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cache entry {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },
}

/// On-disk cache of raw remote payloads, one file per resource.
/// Entry paths are derived deterministically from `(user_id, name)`.
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Path of the entry for `name` under the given user's subdirectory.
    pub fn entry_path(&self, user_id: &str, name: &str) -> PathBuf {
        self.root.join(user_id).join(format!("{}.json", name))
    }

    /// Read a cache entry, returning `Ok(None)` on a miss.
    ///
    /// A miss is a missing file, or - when `max_age` is given - a file whose
    /// modification time is older than the window. Entries with no `max_age`
    /// never expire. Unparseable content is reported as
    /// [`CacheError::Corrupt`] so the caller can treat it as a miss and
    /// re-fetch.
    pub fn read(&self, path: &Path, max_age: Option<Duration>) -> Result<Option<Value>, CacheError> {
        if !path.exists() {
            return Ok(None);
        }

        if let Some(max_age) = max_age {
            let mtime = std::fs::metadata(path)
                .and_then(|m| m.modified())
                .map_err(|source| CacheError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            if !is_fresh(mtime, SystemTime::now(), max_age) {
                debug!(path = %path.display(), "Cache entry stale");
                return Ok(None);
            }
        }

        let contents = std::fs::read_to_string(path).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value = serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Cache hit");
        Ok(Some(value))
    }

    /// Write an entry, creating missing parent directories.
    /// The body is written verbatim; concurrent invocations are last-writer-
    /// wins with no atomicity guarantee.
    pub fn write(&self, path: &Path, body: &str) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(path, body).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), bytes = body.len(), "Cache entry written");
        Ok(())
    }
}

/// Freshness predicate over explicit times, kept pure so the mtime
/// arithmetic is testable without manufacturing old files.
/// An mtime in the future (clock skew, coarse filesystem timestamps) counts
/// as fresh.
fn is_fresh(mtime: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    match now.duration_since(mtime) {
        Ok(age) => age <= max_age,
        Err(_) => true,
    }
}
