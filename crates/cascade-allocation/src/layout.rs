//! Tier layout: which securities sit in which tier.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cascade_core::SecurityId;

use crate::error::{AllocationError, AllocationResult};

/// Assignment of securities to allocation tiers.
///
/// Fixed income has an anchor (tier 1) and a market-cap weighted pool
/// (tier 3). Equity has an anchor (tier 1), a core tier (tier 2), a regional
/// tier (tier 3) containing the primary region, and a single overflow
/// security (tier 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLayout {
    /// Fixed income tier 1, held at the base weight.
    pub fixed_income_anchor: SecurityId,
    /// Fixed income tier 3, market-cap weighted with redistribution.
    pub fixed_income_pool: Vec<SecurityId>,
    /// Equity tier 1, held at the base weight.
    pub equity_anchor: SecurityId,
    /// Equity tier 2.
    pub equity_core: Vec<SecurityId>,
    /// Equity tier 3.
    pub equity_regional: Vec<SecurityId>,
    /// Tier 3 security whose cap gates the overflow tier.
    pub primary_region: SecurityId,
    /// Equity tier 4, takes the residual when the primary region is capped.
    pub equity_overflow: SecurityId,
}

impl TierLayout {
    /// Checks that every tier is populated and no security appears twice.
    pub fn validate(&self) -> AllocationResult<()> {
        if self.fixed_income_pool.is_empty() {
            return Err(AllocationError::invalid_layout("fixed income pool is empty"));
        }
        if self.equity_core.is_empty() {
            return Err(AllocationError::invalid_layout("equity core tier is empty"));
        }
        if self.equity_regional.is_empty() {
            return Err(AllocationError::invalid_layout("equity regional tier is empty"));
        }
        if !self.equity_regional.contains(&self.primary_region) {
            return Err(AllocationError::invalid_layout(format!(
                "primary region '{}' is not in the regional tier",
                self.primary_region
            )));
        }

        let mut seen = HashSet::new();
        for id in self.all_ids() {
            if !seen.insert(id.clone()) {
                return Err(AllocationError::invalid_layout(format!(
                    "'{id}' appears in more than one tier"
                )));
            }
        }
        Ok(())
    }

    /// Securities whose market caps feed ratio math (incl. the overflow).
    pub fn market_cap_ids(&self) -> Vec<SecurityId> {
        let mut ids = self.fixed_income_pool.clone();
        ids.extend(self.equity_core.iter().cloned());
        ids.extend(self.equity_regional.iter().cloned());
        ids.push(self.equity_overflow.clone());
        ids
    }

    /// Securities held at a fixed weight.
    pub fn fixed_weight_ids(&self) -> Vec<SecurityId> {
        vec![self.fixed_income_anchor.clone(), self.equity_anchor.clone()]
    }

    /// All securities in output order.
    pub fn all_ids(&self) -> Vec<SecurityId> {
        let mut ids = vec![self.fixed_income_anchor.clone()];
        ids.extend(self.fixed_income_pool.iter().cloned());
        ids.push(self.equity_anchor.clone());
        ids.extend(self.equity_core.iter().cloned());
        ids.extend(self.equity_regional.iter().cloned());
        ids.push(self.equity_overflow.clone());
        ids
    }
}
