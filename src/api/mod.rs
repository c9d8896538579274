//! HTTP client and cache-first fetcher for the NYT crosswords service.
//!
//! `ApiClient` speaks to the three read-only endpoints; `Fetcher` layers the
//! local cache on top, so callers only ever see parsed JSON.

pub mod client;
pub mod error;
pub mod fetcher;

pub use client::ApiClient;
pub use error::ApiError;
pub use fetcher::{FetchError, Fetcher};
