//! # Cascade Core
//!
//! Core types shared by every Cascade crate.
//!
//! - **Identifiers**: [`SecurityId`], [`PortfolioId`], [`FundId`]
//! - **Market data**: [`MarketSnapshot`] holding market caps, fixed-weight
//!   sentinels and period returns for one calculation date
//! - **Parameters**: [`PortfolioParameters`] for a single portfolio profile
//! - **Output**: [`Position`] and [`WeightTable`], the per-fund result
//!
//! ## Example
//!
//! ```rust
//! use cascade_core::prelude::*;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
//! let snapshot = MarketSnapshot::new(date)
//!     .with_market_cap("I01018", 82_031_193.018944)
//!     .with_fixed_weight("I00010");
//!
//! assert_eq!(snapshot.len(), 2);
//! let params = PortfolioParameters::new("LSE80", 80.0, 20.0, 19.25).unwrap();
//! assert_eq!(params.portfolio_id.as_str(), "LSE80");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dates;
pub mod error;
pub mod ids;
pub mod market;
pub mod portfolio;
pub mod weights;

pub use error::{CoreError, CoreResult};
pub use ids::{FundId, IdentifierMap, PortfolioId, SecurityId};
pub use market::{MarketCap, MarketSnapshot, ReturnValue, Security};
pub use portfolio::PortfolioParameters;
pub use weights::{Position, WeightTable};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dates::{compact, parse_compact, us_slash};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::ids::{FundId, IdentifierMap, PortfolioId, SecurityId};
    pub use crate::market::{MarketCap, MarketSnapshot, ReturnValue, Security};
    pub use crate::portfolio::PortfolioParameters;
    pub use crate::weights::{Position, WeightTable};
}
