use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("remote service returned {status}: {body}")]
    RemoteService {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        source: serde_json::Error,
    },

    #[error("response from {0} has no `results` field")]
    MissingResults(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::RemoteService {
            status,
            body: Self::truncate_body(body),
        }
    }
}
