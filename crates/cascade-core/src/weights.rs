//! Positions and the per-fund weight table.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::{FundId, PortfolioId, SecurityId};
use crate::market::ReturnValue;

/// One computed weight, keyed by (portfolio, security).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Portfolio profile the position belongs to.
    pub portfolio_id: PortfolioId,
    /// Security held.
    pub security_id: SecurityId,
    /// Weight in percent. `None` when the weight could not be determined.
    pub weight: Option<f64>,
    /// Period return of the security.
    pub period_return: ReturnValue,
}

impl Position {
    /// Creates a position with a weight and no return data.
    pub fn new(
        portfolio_id: impl Into<PortfolioId>,
        security_id: impl Into<SecurityId>,
        weight: f64,
    ) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            security_id: security_id.into(),
            weight: Some(weight),
            period_return: ReturnValue::NoData,
        }
    }

    /// Creates a position whose weight is unknown.
    pub fn missing(portfolio_id: impl Into<PortfolioId>, security_id: impl Into<SecurityId>) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            security_id: security_id.into(),
            weight: None,
            period_return: ReturnValue::NoData,
        }
    }

    /// Sets the period return.
    pub fn with_return(mut self, period_return: ReturnValue) -> Self {
        self.period_return = period_return;
        self
    }

    /// Composite identifier `{portfolio}_{security}`.
    pub fn benchmark_id(&self) -> String {
        format!("{}_{}", self.portfolio_id, self.security_id)
    }

    /// Splits a benchmark identifier back into its parts.
    ///
    /// Portfolio identifiers never contain `_`, so the first underscore is
    /// the separator.
    pub fn split_benchmark_id(benchmark_id: &str) -> CoreResult<(PortfolioId, SecurityId)> {
        match benchmark_id.split_once('_') {
            Some((portfolio, security)) if !portfolio.is_empty() && !security.is_empty() => {
                Ok((PortfolioId::new(portfolio), SecurityId::new(security)))
            }
            _ => Err(CoreError::InvalidIdentifier {
                value: benchmark_id.to_string(),
                reason: "expected {portfolio}_{security}".to_string(),
            }),
        }
    }
}

/// Ordered positions of one fund for one calculation date.
///
/// The date and fund are fixed at creation. Tables are never edited in
/// place; combinators return a new table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    fund_id: FundId,
    date: NaiveDate,
    positions: Vec<Position>,
}

impl WeightTable {
    /// Creates an empty table.
    pub fn new(fund_id: impl Into<FundId>, date: NaiveDate) -> Self {
        Self {
            fund_id: fund_id.into(),
            date,
            positions: Vec::new(),
        }
    }

    /// Creates a table from positions, rejecting duplicate keys.
    pub fn from_positions(
        fund_id: impl Into<FundId>,
        date: NaiveDate,
        positions: Vec<Position>,
    ) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(positions.len());
        for position in &positions {
            if !seen.insert((&position.portfolio_id, &position.security_id)) {
                return Err(CoreError::DuplicatePosition {
                    benchmark_id: position.benchmark_id(),
                });
            }
        }
        Ok(Self {
            fund_id: fund_id.into(),
            date,
            positions,
        })
    }

    /// Appends the positions of another table of the same fund and date.
    pub fn merge(self, other: WeightTable) -> CoreResult<Self> {
        if self.fund_id != other.fund_id || self.date != other.date {
            return Err(CoreError::table_mismatch(format!(
                "cannot merge {}@{} with {}@{}",
                self.fund_id, self.date, other.fund_id, other.date
            )));
        }
        let mut positions = self.positions;
        positions.extend(other.positions);
        Self::from_positions(self.fund_id, self.date, positions)
    }

    /// Returns a new table with every position transformed.
    pub fn map_positions<F>(&self, f: F) -> Self
    where
        F: FnMut(&Position) -> Position,
    {
        Self {
            fund_id: self.fund_id.clone(),
            date: self.date,
            positions: self.positions.iter().map(f).collect(),
        }
    }

    /// Fund identifier.
    pub fn fund_id(&self) -> &FundId {
        &self.fund_id
    }

    /// Calculation date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// All positions in insertion order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Positions of one portfolio.
    pub fn portfolio<'a>(
        &'a self,
        portfolio_id: &'a PortfolioId,
    ) -> impl Iterator<Item = &'a Position> + 'a {
        self.positions
            .iter()
            .filter(move |p| &p.portfolio_id == portfolio_id)
    }

    /// Distinct portfolio identifiers in first-seen order.
    pub fn portfolio_ids(&self) -> Vec<PortfolioId> {
        let mut ids: Vec<PortfolioId> = Vec::new();
        for position in &self.positions {
            if !ids.contains(&position.portfolio_id) {
                ids.push(position.portfolio_id.clone());
            }
        }
        ids
    }

    /// Looks up a position by its composite key.
    pub fn get(&self, portfolio_id: &PortfolioId, security_id: &SecurityId) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| &p.portfolio_id == portfolio_id && &p.security_id == security_id)
    }

    /// Weight of a position, if the position exists and has a weight.
    pub fn weight(&self, portfolio_id: &str, security_id: &str) -> Option<f64> {
        self.positions
            .iter()
            .find(|p| p.portfolio_id.as_str() == portfolio_id && p.security_id.as_str() == security_id)
            .and_then(|p| p.weight)
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the table has no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 21).unwrap()
    }

    #[test]
    fn test_benchmark_id_round_trip() {
        let position = Position::new("LSE80", "180948", 2.5);
        assert_eq!(position.benchmark_id(), "LSE80_180948");

        let (portfolio, security) = Position::split_benchmark_id("LSE80_180948").unwrap();
        assert_eq!(portfolio.as_str(), "LSE80");
        assert_eq!(security.as_str(), "180948");

        assert!(Position::split_benchmark_id("LSE80").is_err());
        assert!(Position::split_benchmark_id("_SP50").is_err());
    }

    #[test]
    fn test_duplicate_positions_rejected() {
        let err = WeightTable::from_positions(
            "fund",
            date(),
            vec![Position::new("LSE80", "SP50", 1.0), Position::new("LSE80", "SP50", 2.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::DuplicatePosition {
                benchmark_id: "LSE80_SP50".to_string()
            }
        );
    }

    #[test]
    fn test_merge_and_portfolio_views() {
        let a = WeightTable::from_positions("fund", date(), vec![Position::new("LSE20", "I00010", 19.25)])
            .unwrap();
        let b = WeightTable::from_positions(
            "fund",
            date(),
            vec![Position::new("LSE80", "I00010", 19.25), Position::new("LSE80", "SP50", 6.6)],
        )
        .unwrap();

        let merged = a.merge(b).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged.portfolio_ids(),
            vec![PortfolioId::new("LSE20"), PortfolioId::new("LSE80")]
        );
        let lse80 = PortfolioId::new("LSE80");
        assert_eq!(merged.portfolio(&lse80).count(), 2);
        assert_relative_eq!(merged.weight("LSE80", "SP50").unwrap(), 6.6);
    }

    #[test]
    fn test_merge_rejects_other_date() {
        let a = WeightTable::new("fund", date());
        let b = WeightTable::new("fund", date().succ_opt().unwrap());
        assert!(matches!(a.merge(b), Err(CoreError::TableMismatch { .. })));
    }

    #[test]
    fn test_map_positions_leaves_source_untouched() {
        let table =
            WeightTable::from_positions("fund", date(), vec![Position::new("LSE80", "SP50", 6.6)]).unwrap();
        let enriched = table.map_positions(|p| p.clone().with_return(ReturnValue::Value(0.1)));

        assert!(table.positions()[0].period_return.is_no_data());
        assert_eq!(enriched.positions()[0].period_return, ReturnValue::Value(0.1));
        assert_eq!(enriched.date(), table.date());
    }
}
