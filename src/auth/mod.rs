//! Credential handling.
//!
//! Credentials are two opaque strings - a NYT user id and the `nyt-s`
//! session cookie - read once per process from a local JSON file.

pub mod credentials;

pub use credentials::{load, ConfigError, Credentials};
