use thiserror::Error;

/// Errors returned by [`crate::CommerceClient`].
///
/// URLs carried by variants are paths only; query strings may hold the
/// consumer secret and never leave the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("request to {path} timed out")]
    Timeout { path: String },

    #[error("rate limited by the commerce API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("unexpected HTTP status {status} from {path}")]
    UnexpectedStatus { status: u16, path: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("pagination limit reached for {path}: exceeded {max_pages} pages")]
    PaginationLimit { path: String, max_pages: usize },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let path = err.url().map(|u| u.path().to_owned()).unwrap_or_default();
        if err.is_timeout() {
            return ClientError::Timeout { path };
        }
        ClientError::Http(err.without_url())
    }
}
