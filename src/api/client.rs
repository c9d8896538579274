//! Low-level client for the NYT crosswords endpoints.
//!
//! Three read-only GETs: the puzzle listing and the stats/streaks summary
//! are identified by the user id in the URL path; the per-puzzle detail
//! additionally requires the `nyt-s` session cookie header.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::debug;

use super::ApiError;

/// Base URL for the crosswords service
pub const DEFAULT_BASE_URL: &str = "https://nyt-games-prd.appspot.com/svc/crosswords";

/// Header carrying the session cookie on puzzle-detail requests
const SESSION_HEADER: &str = "nyt-s";

/// The stats endpoint wants an explicit start of history.
/// 2014-01-01 predates any modern account's first solve.
const STATS_DATE_START: &str = "2014-01-01";

/// HTTP client for the crosswords service.
/// Clone is cheap - reqwest::blocking::Client uses Arc internally for
/// connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the production service.
    /// No timeout is applied; the underlying client's defaults stand, per
    /// this tool's interactive, supervised usage.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against an alternate base URL (tests point this at
    /// an unroutable address to prove cache hits skip the network).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// `GET {base}/v3/{uid}/puzzles.json` - daily puzzles in a date range,
    /// ascending by print date. Unauthenticated.
    pub fn puzzle_list(
        &self,
        user_id: &str,
        start: NaiveDate,
        stop: NaiveDate,
    ) -> Result<String, ApiError> {
        let url = format!("{}/v3/{}/puzzles.json", self.base_url, user_id);
        let date_start = start.to_string();
        let date_end = stop.to_string();
        let request = self.client.get(&url).query(&[
            ("publish_type", "daily"),
            ("sort_order", "asc"),
            ("sort_by", "print_date"),
            ("date_start", date_start.as_str()),
            ("date_end", date_end.as_str()),
        ]);
        self.send(&url, request)
    }

    /// `GET {base}/v3/{uid}/stats-and-streaks.json` - whole-account solve
    /// stats and streak history. Unauthenticated.
    pub fn stats_and_streaks(&self, user_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/v3/{}/stats-and-streaks.json", self.base_url, user_id);
        let request = self.client.get(&url).query(&[
            ("date_start", STATS_DATE_START),
            ("start_on_monday", "true"),
        ]);
        self.send(&url, request)
    }

    /// `GET {base}/v6/game/{puzzle_id}.json` - full per-cell solve record
    /// for one puzzle. Requires the session cookie.
    pub fn puzzle_detail(
        &self,
        puzzle_id: u64,
        session_cookie: &str,
    ) -> Result<String, ApiError> {
        let url = format!("{}/v6/game/{}.json", self.base_url, puzzle_id);
        let request = self.client.get(&url).header(SESSION_HEADER, session_cookie);
        self.send(&url, request)
    }

    /// Issue the request and return the raw body on 2xx.
    /// A non-success status fails the operation with the status and body;
    /// nothing is retried.
    fn send(
        &self,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<String, ApiError> {
        debug!(url, "GET");
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }
        debug!(url, status = %status, bytes = body.len(), "Response received");
        Ok(body)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
