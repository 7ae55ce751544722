//! Error types for gateway operations.

use thiserror::Error;

/// Failure of an external data fetch.
///
/// Variants split into retryable (transport trouble) and fatal (the request
/// will not succeed by asking again). See [`GatewayError::is_retryable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Could not reach the remote service.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Non-success HTTP status other than authentication failures.
    #[error("HTTP status {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Response could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Response had no data for the requested date.
    #[error("data not available: {0}")]
    DataUnavailable(String),

    /// Some requested identifiers came back null or not at all.
    #[error("missing data for {ids:?}")]
    MissingData {
        /// Offending identifiers.
        ids: Vec<String>,
    },
}

impl GatewayError {
    /// Returns true when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::HttpStatus { status, .. } => {
                matches!(status, 404 | 408 | 429) || *status >= 500
            }
            Self::Authentication(_)
            | Self::MalformedResponse(_)
            | Self::DataUnavailable(_)
            | Self::MissingData { .. } => false,
        }
    }

    /// Creates a missing data error naming the identifiers.
    #[must_use]
    pub fn missing_data<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingData {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}
