//! Engine error types.

use thiserror::Error;

use cascade_allocation::AllocationError;
use cascade_config::ConfigError;
use cascade_ext_file::StoreError;
use cascade_traits::GatewayError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
///
/// Run-level variants abort the whole run; the others are caught at the
/// fund boundary and become that fund's error message.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No fund is configured to run.
    #[error("No active funds configured")]
    NoActiveFunds,

    /// The requested fund is not in the active list.
    #[error("Unknown fund: {fund}. Available: [{}]", .available.join(", "))]
    UnknownFund {
        /// Requested fund.
        fund: String,
        /// Configured funds.
        available: Vec<String>,
    },

    /// A configured fund has no registered strategy.
    #[error("No strategy registered for fund '{0}'")]
    UnregisteredFund(String),

    /// The builder is missing a component.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Shared market data fetch failed.
    #[error("Market data fetch failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Rules could not be resolved for a fund.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Allocation rejected its input.
    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    /// Compliance checks reported errors.
    #[error("Validation errors: {}", .errors.join("; "))]
    ValidationFailed {
        /// Every error of every portfolio.
        errors: Vec<String>,
    },

    /// Reading or writing the store failed.
    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),
}
