//! Error types for the allocation engine.
//!
//! Business outcomes (a capped position, an empty overflow tier) are not
//! errors. These variants cover malformed input only.

use thiserror::Error;

use cascade_core::CoreError;

/// Result type for allocation operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Errors that can occur while computing weights.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// A tier's market caps sum to zero, so no ratio can be formed.
    #[error("Zero allocation basis in {tier} for portfolio '{portfolio}'")]
    ZeroAllocationBasis {
        /// Portfolio being computed.
        portfolio: String,
        /// Tier whose denominator was zero.
        tier: String,
    },

    /// A ratio-weighted security has no market cap.
    #[error("Missing market cap for '{id}'")]
    MissingMarketCap {
        /// Security identifier.
        id: String,
    },

    /// A market cap is negative.
    #[error("Negative market cap for '{id}': {value}")]
    NegativeMarketCap {
        /// Security identifier.
        id: String,
        /// The offending value.
        value: f64,
    },

    /// A market cap is NaN or infinite.
    #[error("Non-finite market cap for '{id}'")]
    NonFiniteMarketCap {
        /// Security identifier.
        id: String,
    },

    /// A fixed-weight sentinel reached ratio math.
    #[error("Fixed-weight security '{id}' cannot be market-cap weighted")]
    FixedWeightInRatio {
        /// Security identifier.
        id: String,
    },

    /// A sleeve is smaller than the anchor weight it must hold.
    #[error("Portfolio '{portfolio}': {sleeve} allocation {allocation} is below base weight {base_weight}")]
    AllocationBelowBase {
        /// Portfolio identifier.
        portfolio: String,
        /// `equity` or `fixed income`.
        sleeve: String,
        /// Sleeve allocation (%).
        allocation: f64,
        /// Base weight (%).
        base_weight: f64,
    },

    /// Tier layout is inconsistent.
    #[error("Invalid tier layout: {reason}")]
    InvalidLayout {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A fund is registered twice.
    #[error("Fund '{fund}' is already registered")]
    DuplicateFund {
        /// Fund identifier.
        fund: String,
    },

    /// Core type construction failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AllocationError {
    /// Creates a zero allocation basis error.
    #[must_use]
    pub fn zero_basis(portfolio: impl Into<String>, tier: impl Into<String>) -> Self {
        Self::ZeroAllocationBasis {
            portfolio: portfolio.into(),
            tier: tier.into(),
        }
    }

    /// Creates an invalid layout error.
    #[must_use]
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            reason: reason.into(),
        }
    }
}
