//! Error types for backend queries and analysis requests

use thiserror::Error;

/// Errors raised while talking to a metrics backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configured base URL cannot be used
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status
    #[error("{backend} query failed with status {status}: {message}")]
    Status {
        backend: &'static str,
        status: u16,
        message: String,
    },

    /// Backend answered 200 but reported a query error
    #[error("{backend} query failed: {message}")]
    Query {
        backend: &'static str,
        message: String,
    },

    /// Response body could not be decoded
    #[error("failed to decode {backend} response: {message}")]
    Decode {
        backend: &'static str,
        message: String,
    },
}

/// Errors surfaced by the analysis engine to its callers
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Pod discovery failed, nothing can be analyzed
    #[error("failed to get active pods: {0}")]
    Discovery(#[source] BackendError),

    /// A required top-level query failed
    #[error("failed to query {what}: {source}")]
    Query {
        what: &'static str,
        #[source]
        source: BackendError,
    },

    /// Caller supplied unusable parameters
    #[error("{0}")]
    InvalidInput(String),

    /// Nothing matched the request
    #[error("{0}")]
    NotFound(String),
}

impl AnalysisError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Returns true if the error was caused by the caller rather than the backend
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_))
    }
}
