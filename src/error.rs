//! Error types for the search library.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Provider-side failures (`Http`, `Timeout`, `Protocol`, `Parse`) never
/// escape [`Search`](crate::Search); they are logged and turned into empty
/// results. `InvalidQuery` and `Config` are raised at the boundary only.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed (connection, timeout or non-2xx status).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the transport timeout.
    #[error("Search timeout exceeded")]
    Timeout,

    /// A structural token or container expected in the provider response is missing.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Operation not supported by this engine.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Whether a fresh attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SearchError::InvalidQuery(_) | SearchError::Config(_) | SearchError::Unsupported(_)
        )
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}
