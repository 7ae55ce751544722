//! # Cascade Traits
//!
//! Trait definitions for the Cascade allocation pipeline.
//!
//! This crate contains ONLY trait definitions and their error taxonomy.
//! Implementations live in extension crates (`cascade-ext-http`) or in tests.
//!
//! ## Module Structure
//!
//! - [`market_data`]: the [`MarketDataGateway`] used for the shared fetch
//! - [`error`]: [`GatewayError`] with its retryable/fatal split

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod market_data;

pub use error::GatewayError;
pub use market_data::{MarketCapTable, MarketDataGateway, ReturnTable};
