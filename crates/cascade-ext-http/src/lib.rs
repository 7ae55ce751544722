//! # Cascade Ext HTTP
//!
//! [`MarketDataGateway`](cascade_traits::MarketDataGateway) implementation
//! backed by a formula time-series HTTP API.
//!
//! - [`FormulaApiClient`]: request building, response validation, error mapping
//! - [`RetryPolicy`]: exponential backoff for retryable failures only
//! - [`formula`]: the market-cap and return formula strings

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
pub mod formula;
mod retry;

pub use client::{FormulaApiClient, MetricTable, MARKET_CAP_COLUMN};
pub use retry::RetryPolicy;
