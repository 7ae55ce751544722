//! Error types for core domain types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Portfolio parameters violate their invariants.
    #[error("Invalid parameters for portfolio '{portfolio}': {reason}")]
    InvalidParameters {
        /// Portfolio identifier.
        portfolio: String,
        /// Why the parameters were rejected.
        reason: String,
    },

    /// Two positions share the same (portfolio, security) key.
    #[error("Duplicate position: {benchmark_id}")]
    DuplicatePosition {
        /// Composite benchmark identifier of the duplicate.
        benchmark_id: String,
    },

    /// Two weight tables cannot be combined.
    #[error("Weight table mismatch: {reason}")]
    TableMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Identifier could not be parsed.
    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier {
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Date string could not be parsed.
    #[error("Invalid date '{0}': expected YYYYMMDD")]
    InvalidDate(String),
}

impl CoreError {
    /// Creates an invalid parameters error.
    #[must_use]
    pub fn invalid_parameters(portfolio: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            portfolio: portfolio.into(),
            reason: reason.into(),
        }
    }

    /// Creates a table mismatch error.
    #[must_use]
    pub fn table_mismatch(reason: impl Into<String>) -> Self {
        Self::TableMismatch {
            reason: reason.into(),
        }
    }
}
