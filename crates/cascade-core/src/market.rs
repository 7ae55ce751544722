//! Market data snapshot for one calculation date.
//!
//! The snapshot is assembled once per run from the gateway's market-cap and
//! return tables and is read-only afterwards. Every fund computes against a
//! shared reference to it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::SecurityId;

/// Market-cap index value of a security.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarketCap {
    /// Value observed from the data vendor.
    Observed(f64),
    /// Sentinel for fixed-weight securities. Never valid in ratio math.
    FixedWeight,
}

/// Period return attached to a security or position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ReturnValue {
    /// Return reported by the vendor.
    Value(f64),
    /// Vendor had no return for this security.
    #[default]
    NoData,
}

impl ReturnValue {
    /// Returns the value, if present.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NoData => None,
        }
    }

    /// Returns true when no data is available.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

impl From<Option<f64>> for ReturnValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::NoData, Self::Value)
    }
}

impl fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.9}"),
            Self::NoData => write!(f, "no data"),
        }
    }
}

/// A security as seen by the allocation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    /// Security identifier.
    pub id: SecurityId,
    /// Market cap, absent when the vendor was not asked for it.
    pub market_cap: Option<MarketCap>,
    /// Period return.
    pub period_return: ReturnValue,
}

impl Security {
    /// Creates a security with no market data attached.
    pub fn new(id: impl Into<SecurityId>) -> Self {
        Self {
            id: id.into(),
            market_cap: None,
            period_return: ReturnValue::NoData,
        }
    }
}

/// Immutable market data for one calculation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    date: NaiveDate,
    securities: BTreeMap<SecurityId, Security>,
}

impl MarketSnapshot {
    /// Creates an empty snapshot for a date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            securities: BTreeMap::new(),
        }
    }

    /// Sets an observed market cap.
    pub fn with_market_cap(mut self, id: impl Into<SecurityId>, value: f64) -> Self {
        self.entry(id.into()).market_cap = Some(MarketCap::Observed(value));
        self
    }

    /// Marks a security as fixed-weight.
    pub fn with_fixed_weight(mut self, id: impl Into<SecurityId>) -> Self {
        self.entry(id.into()).market_cap = Some(MarketCap::FixedWeight);
        self
    }

    /// Sets the period return of a security.
    pub fn with_return(mut self, id: impl Into<SecurityId>, value: ReturnValue) -> Self {
        self.entry(id.into()).period_return = value;
        self
    }

    fn entry(&mut self, id: SecurityId) -> &mut Security {
        self.securities
            .entry(id.clone())
            .or_insert_with(|| Security::new(id))
    }

    /// Calculation date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Looks up a security.
    pub fn security(&self, id: &SecurityId) -> Option<&Security> {
        self.securities.get(id)
    }

    /// Market cap of a security, if known.
    pub fn market_cap(&self, id: &SecurityId) -> Option<MarketCap> {
        self.securities.get(id).and_then(|s| s.market_cap)
    }

    /// Period return of a security; [`ReturnValue::NoData`] when unknown.
    pub fn period_return(&self, id: &SecurityId) -> ReturnValue {
        self.securities
            .get(id)
            .map_or(ReturnValue::NoData, |s| s.period_return)
    }

    /// Iterates over all securities in identifier order.
    pub fn securities(&self) -> impl Iterator<Item = &Security> {
        self.securities.values()
    }

    /// Number of securities.
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// Returns true if the snapshot holds no securities.
    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }
}
