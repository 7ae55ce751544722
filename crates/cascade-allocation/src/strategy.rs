//! Fund strategies and the registry that maps fund identifiers to them.
//!
//! The registry is assembled once at startup and passed by reference to
//! the orchestrator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cascade_core::{FundId, IdentifierMap, MarketSnapshot, PortfolioParameters, SecurityId, WeightTable};

use crate::error::{AllocationError, AllocationResult};
use crate::lifestrategy::LifeStrategyFund;

/// Weight computation for one fund.
pub trait FundStrategy: Send + Sync {
    /// Fund identifier.
    fn fund_id(&self) -> &FundId;

    /// Portfolio profiles the fund publishes.
    fn portfolios(&self) -> &[PortfolioParameters];

    /// Securities whose market caps must be fetched.
    fn market_cap_ids(&self) -> Vec<SecurityId>;

    /// Securities held at a fixed weight (no market cap needed).
    fn fixed_weight_ids(&self) -> Vec<SecurityId>;

    /// Internal-to-vendor identifiers for the returns fetch.
    fn return_identifiers(&self) -> IdentifierMap;

    /// Computes the weight table for every portfolio, returns attached.
    fn compute(&self, market: &MarketSnapshot) -> AllocationResult<WeightTable>;
}

/// Registry of fund strategies keyed by fund identifier.
#[derive(Clone, Default)]
pub struct FundRegistry {
    strategies: BTreeMap<FundId, Arc<dyn FundStrategy>>,
}

impl FundRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in fund.
    pub fn with_defaults() -> AllocationResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(LifeStrategyFund::new()?))?;
        Ok(registry)
    }

    /// Registers a strategy. A fund id can be registered only once.
    pub fn register(&mut self, strategy: Arc<dyn FundStrategy>) -> AllocationResult<()> {
        let id = strategy.fund_id().clone();
        if self.strategies.contains_key(&id) {
            return Err(AllocationError::DuplicateFund { fund: id.to_string() });
        }
        self.strategies.insert(id, strategy);
        Ok(())
    }

    /// Looks up a strategy.
    pub fn get(&self, fund_id: &FundId) -> Option<Arc<dyn FundStrategy>> {
        self.strategies.get(fund_id).cloned()
    }

    /// Returns true if the fund is registered.
    pub fn contains(&self, fund_id: &FundId) -> bool {
        self.strategies.contains_key(fund_id)
    }

    /// Registered fund identifiers in order.
    pub fn ids(&self) -> Vec<FundId> {
        self.strategies.keys().cloned().collect()
    }

    /// Number of registered funds.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for FundRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundRegistry")
            .field("funds", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifestrategy::LIFESTRATEGY_FUND_ID;

    #[test]
    fn test_defaults_contain_lifestrategy() {
        let registry = FundRegistry::with_defaults().unwrap();
        let id = FundId::new(LIFESTRATEGY_FUND_ID);
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id).unwrap().portfolios().len(), 4);
        assert!(registry.get(&FundId::new("unknown")).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = FundRegistry::with_defaults().unwrap();
        let err = registry
            .register(Arc::new(LifeStrategyFund::new().unwrap()))
            .unwrap_err();
        assert_eq!(
            err,
            AllocationError::DuplicateFund {
                fund: LIFESTRATEGY_FUND_ID.to_string()
            }
        );
    }
}
