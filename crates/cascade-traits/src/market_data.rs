//! Market data gateway trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use cascade_core::{IdentifierMap, ReturnValue, SecurityId};

use crate::error::GatewayError;

/// Market-cap index values keyed by security.
pub type MarketCapTable = BTreeMap<SecurityId, f64>;

/// Period returns keyed by security. Individual entries may be
/// [`ReturnValue::NoData`].
pub type ReturnTable = BTreeMap<SecurityId, ReturnValue>;

/// Remote source of market caps and period returns.
///
/// Implementations own their retry policy. A returned error has already
/// exhausted retries or was fatal on the first attempt.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Fetches market-cap index values for every id on `date`.
    ///
    /// Every requested id must come back with a numeric value, otherwise
    /// [`GatewayError::MissingData`] names the offenders.
    async fn market_caps(
        &self,
        ids: &[SecurityId],
        date: NaiveDate,
    ) -> Result<MarketCapTable, GatewayError>;

    /// Fetches period returns for every internal id of `identifiers`.
    ///
    /// Every id must appear in the response; a null return for an id is
    /// tolerated and reported as [`ReturnValue::NoData`].
    async fn returns(
        &self,
        identifiers: &IdentifierMap,
        date: NaiveDate,
    ) -> Result<ReturnTable, GatewayError>;
}
