//! Cache-first resolution of the three remote resources.
//!
//! Every cached operation follows the same shape: derive the entry path,
//! return the stored JSON verbatim on a hit, otherwise fetch, persist, and
//! return. Puzzle details are immutable historical records and never expire;
//! account stats get a bounded freshness window; the puzzle listing covers a
//! trailing date window that shifts daily, so it is never cached (a
//! range-string cache key would pin stale results forever).

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::cache::CacheStore;

use super::{ApiClient, ApiError};

/// Account stats change with every solve; refetch after 12 hours.
const STATS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Cache entry name for the stats payload
const STATS_ENTRY: &str = "stats";

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cache(#[from] crate::cache::CacheError),
}

/// Resolves logical resource requests to parsed JSON, consulting the local
/// cache before the network and writing fresh results back.
pub struct Fetcher {
    client: ApiClient,
    cache: CacheStore,
    credentials: Credentials,
}

impl Fetcher {
    pub fn new(client: ApiClient, cache: CacheStore, credentials: Credentials) -> Self {
        Self {
            client,
            cache,
            credentials,
        }
    }

    /// Daily puzzles in `[start, stop]`. Always fetched live.
    pub fn puzzles(&self, start: NaiveDate, stop: NaiveDate) -> Result<Value, FetchError> {
        let url = format!("puzzles {}..{}", start, stop);
        let body = self
            .client
            .puzzle_list(self.credentials.user_id(), start, stop)?;
        Ok(extract_results(&url, &body)?)
    }

    /// Whole-account stats and streaks, cached for up to 12 hours.
    pub fn stats(&self) -> Result<Value, FetchError> {
        let path = self
            .cache
            .entry_path(self.credentials.user_id(), STATS_ENTRY);

        if let Some(cached) = self.read_cached(&path, Some(STATS_MAX_AGE))? {
            return Ok(cached);
        }

        let body = self.client.stats_and_streaks(self.credentials.user_id())?;
        let results = extract_results("stats-and-streaks", &body)?;
        self.cache.write(&path, &results.to_string())?;
        Ok(results)
    }

    /// Full solve record for one puzzle. A finished puzzle never changes,
    /// so the cache entry is valid indefinitely.
    pub fn puzzle(&self, puzzle_id: u64) -> Result<Value, FetchError> {
        let path = self
            .cache
            .entry_path(self.credentials.user_id(), &puzzle_id.to_string());

        if let Some(cached) = self.read_cached(&path, None)? {
            return Ok(cached);
        }

        let body = self
            .client
            .puzzle_detail(puzzle_id, self.credentials.session_cookie())?;
        let parsed: Value = serde_json::from_str(&body).map_err(|source| {
            ApiError::InvalidResponse {
                url: format!("game/{}.json", puzzle_id),
                source,
            }
        })?;
        // Raw body, not a re-serialization: the entry must be byte-identical
        // to what the service returned.
        self.cache.write(&path, &body)?;
        Ok(parsed)
    }

    /// Cache read that downgrades a corrupt entry to a miss.
    /// The stale or corrupt file is left in place; a successful refetch
    /// overwrites it.
    fn read_cached(
        &self,
        path: &std::path::Path,
        max_age: Option<Duration>,
    ) -> Result<Option<Value>, FetchError> {
        match self.cache.read(path, max_age) {
            Ok(hit) => Ok(hit),
            Err(crate::cache::CacheError::Corrupt { path, source }) => {
                warn!(path = %path, error = %source, "Corrupt cache entry, refetching");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// The listing and stats endpoints wrap their payload in a `results` field;
/// callers only ever want the payload.
fn extract_results(url: &str, body: &str) -> Result<Value, ApiError> {
    let mut parsed: Value = serde_json::from_str(body).map_err(|source| {
        ApiError::InvalidResponse {
            url: url.to_string(),
            source,
        }
    })?;
    match parsed.get_mut("results") {
        Some(results) => {
            debug!(url, "Extracted results");
            Ok(results.take())
        }
        None => Err(ApiError::MissingResults(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // Nothing listens here, so any test that hits this address fails fast
    // with a network error - which is exactly how the tests below prove
    // whether an operation touched the network at all.
    const UNROUTABLE: &str = "http://127.0.0.1:1";

    fn fetcher(cache_root: PathBuf) -> Fetcher {
        let creds: Credentials =
            serde_json::from_str(r#"{"user_id": "u1", "cookie": "c1"}"#).unwrap();
        Fetcher::new(
            ApiClient::with_base_url(UNROUTABLE),
            CacheStore::new(cache_root),
            creds,
        )
    }

    #[test]
    fn test_extract_results() {
        let body = r#"{"status": "OK", "results": [{"puzzle_id": 42}]}"#;
        let results = extract_results("test", body).unwrap();
        assert_eq!(results, serde_json::json!([{"puzzle_id": 42}]));
    }

    #[test]
    fn test_extract_results_missing() {
        let err = extract_results("test", r#"{"status": "OK"}"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingResults(_)));
    }

    #[test]
    fn test_extract_results_not_json() {
        let err = extract_results("test", "<html>").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    #[test]
    fn test_puzzle_cache_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let f = fetcher(dir.path().to_path_buf());

        let body = r#"{"calcs": {"secondsSpentSolving": 612}, "board": {"cells": []}}"#;
        std::fs::create_dir_all(dir.path().join("u1")).unwrap();
        std::fs::write(dir.path().join("u1/42.json"), body).unwrap();

        // The client points at an unroutable address, so this only succeeds
        // if the cached entry satisfied the request.
        let value = f.puzzle(42).unwrap();
        assert_eq!(value["calcs"]["secondsSpentSolving"], 612);
    }

    #[test]
    fn test_fresh_stats_cache_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let f = fetcher(dir.path().to_path_buf());

        let body = r#"{"streaks": {"current_streak": 7}}"#;
        std::fs::create_dir_all(dir.path().join("u1")).unwrap();
        std::fs::write(dir.path().join("u1/stats.json"), body).unwrap();

        // Just written, well inside the 12 hour window
        let value = f.stats().unwrap();
        assert_eq!(value["streaks"]["current_streak"], 7);
    }

    #[test]
    fn test_puzzle_miss_reaches_network_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let f = fetcher(dir.path().to_path_buf());

        let err = f.puzzle(42).unwrap_err();
        assert!(matches!(err, FetchError::Api(ApiError::Network(_))));
        // Failed fetch leaves no cache entry behind
        assert!(!dir.path().join("u1/42.json").exists());
    }

    #[test]
    fn test_corrupt_puzzle_entry_triggers_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let f = fetcher(dir.path().to_path_buf());

        std::fs::create_dir_all(dir.path().join("u1")).unwrap();
        std::fs::write(dir.path().join("u1/42.json"), "{torn write").unwrap();

        // Corruption downgrades to a miss, and the miss path hits the
        // (unroutable) network rather than surfacing the bad entry.
        let err = f.puzzle(42).unwrap_err();
        assert!(matches!(err, FetchError::Api(ApiError::Network(_))));
        // The corrupt entry is untouched until a successful refetch
        assert_eq!(
            std::fs::read_to_string(dir.path().join("u1/42.json")).unwrap(),
            "{torn write"
        );
    }

    // One-shot HTTP server on a loopback port, answering every request in
    // this test with the given status and body.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_non_success_status_is_remote_service_error() {
        let dir = tempfile::tempdir().unwrap();
        let base_url = serve_once("404 Not Found", "no such puzzle");
        let creds: Credentials =
            serde_json::from_str(r#"{"user_id": "u1", "cookie": "c1"}"#).unwrap();
        let f = Fetcher::new(
            ApiClient::with_base_url(base_url),
            CacheStore::new(dir.path().to_path_buf()),
            creds,
        );

        let err = f.puzzle(42).unwrap_err();
        match err {
            FetchError::Api(ApiError::RemoteService { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(body, "no such puzzle");
            }
            other => panic!("expected RemoteService error, got {:?}", other),
        }
        // The failed operation leaves the cache untouched
        assert!(!dir.path().join("u1/42.json").exists());
    }

    #[test]
    fn test_successful_fetch_writes_raw_body() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"calcs": {"secondsSpentSolving": 612}}"#;
        let base_url = serve_once("200 OK", body);
        let creds: Credentials =
            serde_json::from_str(r#"{"user_id": "u1", "cookie": "c1"}"#).unwrap();
        let f = Fetcher::new(
            ApiClient::with_base_url(base_url),
            CacheStore::new(dir.path().to_path_buf()),
            creds,
        );

        let value = f.puzzle(42).unwrap();
        assert_eq!(value["calcs"]["secondsSpentSolving"], 612);
        // Entry holds the exact bytes received, not a re-serialization
        assert_eq!(
            std::fs::read_to_string(dir.path().join("u1/42.json")).unwrap(),
            body
        );
    }

    #[test]
    fn test_stale_stats_entry_is_refetched_and_overwritten() {
        use std::time::SystemTime;

        let dir = tempfile::tempdir().unwrap();
        let fresh = r#"{"status": "OK", "results": {"streaks": {"current_streak": 9}}}"#;
        let base_url = serve_once("200 OK", fresh);
        let creds: Credentials =
            serde_json::from_str(r#"{"user_id": "u1", "cookie": "c1"}"#).unwrap();
        let f = Fetcher::new(
            ApiClient::with_base_url(base_url),
            CacheStore::new(dir.path().to_path_buf()),
            creds,
        );

        // Seed a stats entry and backdate it past the 12 hour window
        let stats_path = dir.path().join("u1/stats.json");
        std::fs::create_dir_all(dir.path().join("u1")).unwrap();
        std::fs::write(&stats_path, r#"{"streaks": {"current_streak": 7}}"#).unwrap();
        let old = SystemTime::now() - Duration::from_secs(13 * 3600);
        let file = std::fs::File::options().write(true).open(&stats_path).unwrap();
        file.set_modified(old).unwrap();

        let value = f.stats().unwrap();
        assert_eq!(value["streaks"]["current_streak"], 9);
        // The stale entry was overwritten with the fresh results payload
        let on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
        assert_eq!(on_disk["streaks"]["current_streak"], 9);
    }

    #[test]
    fn test_puzzle_list_is_never_cached() {
        let dir = tempfile::tempdir().unwrap();
        let f = fetcher(dir.path().to_path_buf());

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let stop = NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
        // Live passthrough: always a network attempt, never a cache file.
        let err = f.puzzles(start, stop).unwrap_err();
        assert!(matches!(err, FetchError::Api(ApiError::Network(_))));
    }
}
