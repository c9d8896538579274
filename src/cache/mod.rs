//! Local caching of remote JSON payloads.
//!
//! Entries live under `<cache_root>/<user_id>/` and hold the raw JSON
//! exactly as received. Freshness is the file's own modification time -
//! there is no manifest and no embedded timestamp.

pub mod store;

pub use store::{CacheError, CacheStore};
