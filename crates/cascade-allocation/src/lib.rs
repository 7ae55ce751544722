//! # Cascade Allocation
//!
//! Tiered waterfall allocation under a per-position cap.
//!
//! - [`AllocationEngine`]: pure weight computation for one portfolio
//! - [`TierLayout`]: which security sits in which tier
//! - [`attach_returns`]: joins period returns onto a computed table
//! - [`FundStrategy`] / [`FundRegistry`]: explicit fund-to-strategy map
//! - [`LifeStrategyFund`]: the built-in four-profile fund
//!
//! ## Example
//!
//! ```rust
//! use cascade_allocation::{FundStrategy, LifeStrategyFund};
//! use cascade_core::MarketSnapshot;
//! use chrono::NaiveDate;
//!
//! let fund = LifeStrategyFund::new().unwrap();
//! let date = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
//!
//! let mut market = MarketSnapshot::new(date);
//! for id in fund.market_cap_ids() {
//!     market = market.with_market_cap(id, 1_000_000.0);
//! }
//! for id in fund.fixed_weight_ids() {
//!     market = market.with_fixed_weight(id);
//! }
//!
//! let table = fund.compute(&market).unwrap();
//! assert_eq!(table.len(), 4 * 14);
//! assert_eq!(table.weight("LSE80", "I00010"), Some(19.25));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod enrich;
pub mod error;
pub mod layout;
pub mod lifestrategy;
pub mod strategy;

pub use engine::{waterfall_pool, AllocationEngine};
pub use enrich::attach_returns;
pub use error::{AllocationError, AllocationResult};
pub use layout::TierLayout;
pub use lifestrategy::{lifestrategy_layout, LifeStrategyFund, LIFESTRATEGY_BASE_WEIGHT, LIFESTRATEGY_FUND_ID};
pub use strategy::{FundRegistry, FundStrategy};
