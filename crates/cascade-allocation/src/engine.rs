//! Tiered waterfall allocation.
//!
//! Turns a [`MarketSnapshot`] and one set of [`PortfolioParameters`] into the
//! weights of a single portfolio. The engine is pure: it reads the snapshot,
//! never mutates it, and returns a fresh [`WeightTable`].
//!
//! # Fixed income waterfall
//!
//! 1. The anchor is fixed at the base weight.
//! 2. The pool splits `fixed_income_allocation - base_weight` by market-cap
//!    share.
//! 3. Pool weights above the base weight are clamped and the excess summed.
//! 4. The excess is redistributed once, proportionally to the uncapped
//!    weights of the securities that were not clamped.
//! 5. Final pool weight is `min(base_weight, redistributed weight)`.
//!
//! Step 4 is a single pass. A security pushed over the cap by the
//! redistribution is clamped in step 5 and its surplus is dropped, so the
//! sleeve can come out under-subscribed.
//!
//! # Equity cascade
//!
//! 1. The anchor is fixed at the base weight.
//! 2. Core securities split `equity_allocation - base_weight` by market-cap
//!    share, each capped at the base weight.
//! 3. Regional securities split what remains after the anchor and the
//!    actual core weights, each capped. Nothing remaining means all zero.
//! 4. The overflow security takes `equity_allocation - (everything above)`,
//!    floored at zero, but only when the primary region hit the cap.

use cascade_core::{
    FundId, MarketCap, MarketSnapshot, PortfolioParameters, Position, SecurityId, WeightTable,
};
use tracing::debug;

use crate::error::{AllocationError, AllocationResult};
use crate::layout::TierLayout;

/// Computes portfolio weights for a fixed tier layout.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    layout: TierLayout,
}

impl AllocationEngine {
    /// Creates an engine after validating the layout.
    pub fn new(layout: TierLayout) -> AllocationResult<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    /// The tier layout.
    pub fn layout(&self) -> &TierLayout {
        &self.layout
    }

    /// Computes the weights of one portfolio.
    ///
    /// Positions come out in layout order: fixed income anchor, fixed income
    /// pool, equity anchor, core, regional, overflow. Returns carry
    /// [`cascade_core::ReturnValue::NoData`] until enriched.
    pub fn compute(
        &self,
        fund_id: &FundId,
        market: &MarketSnapshot,
        params: &PortfolioParameters,
    ) -> AllocationResult<WeightTable> {
        params.validate()?;
        check_sleeve(params, "fixed income", params.fixed_income_allocation)?;
        check_sleeve(params, "equity", params.equity_allocation)?;

        let mut weights = self.fixed_income_weights(market, params)?;
        weights.extend(self.equity_weights(market, params)?);

        let positions = weights
            .into_iter()
            .map(|(security, weight)| Position::new(params.portfolio_id.clone(), security, weight))
            .collect();
        Ok(WeightTable::from_positions(
            fund_id.clone(),
            market.date(),
            positions,
        )?)
    }

    // =========================================================================
    // FIXED INCOME
    // =========================================================================

    fn fixed_income_weights(
        &self,
        market: &MarketSnapshot,
        params: &PortfolioParameters,
    ) -> AllocationResult<Vec<(SecurityId, f64)>> {
        let portfolio = params.portfolio_id.as_str();
        let base = params.base_weight;
        let pool = &self.layout.fixed_income_pool;

        let caps = pool_market_caps(market, pool)?;
        let total: f64 = caps.iter().sum();
        if total <= 0.0 {
            return Err(AllocationError::zero_basis(portfolio, "fixed income tier 3"));
        }
        debug!(portfolio, total_market_cap = total, "fixed income tier 3 basis");

        let remaining = params.fixed_income_allocation - base;
        let pool_weights = waterfall_pool(remaining, &caps, total, base);

        let mut weights = Vec::with_capacity(pool.len() + 1);
        weights.push((self.layout.fixed_income_anchor.clone(), base));
        for (security, weight) in pool.iter().zip(pool_weights) {
            debug!(portfolio, security = %security, weight, "fixed income tier 3 weight");
            weights.push((security.clone(), weight));
        }
        Ok(weights)
    }

    // =========================================================================
    // EQUITY
    // =========================================================================

    fn equity_weights(
        &self,
        market: &MarketSnapshot,
        params: &PortfolioParameters,
    ) -> AllocationResult<Vec<(SecurityId, f64)>> {
        let portfolio = params.portfolio_id.as_str();
        let base = params.base_weight;
        let equity = params.equity_allocation;
        let layout = &self.layout;

        // Tier 2
        let core_caps = pool_market_caps(market, &layout.equity_core)?;
        let core_total: f64 = core_caps.iter().sum();
        if core_total <= 0.0 {
            return Err(AllocationError::zero_basis(portfolio, "equity tier 2"));
        }
        let core_weights: Vec<f64> = core_caps
            .iter()
            .map(|mcap| base.min((equity - base) * (mcap / core_total)))
            .collect();
        let core_sum: f64 = core_weights.iter().sum();

        // Tier 3
        let remaining = equity - (base + core_sum);
        debug!(portfolio, remaining, "equity tier 3 allocation");
        let regional_weights = if remaining <= 0.0 {
            vec![0.0; layout.equity_regional.len()]
        } else {
            let regional_caps = pool_market_caps(market, &layout.equity_regional)?;
            let regional_total: f64 = regional_caps.iter().sum();
            if regional_total <= 0.0 {
                return Err(AllocationError::zero_basis(portfolio, "equity tier 3"));
            }
            regional_caps
                .iter()
                .map(|mcap| base.min(remaining * (mcap / regional_total)))
                .collect()
        };

        // Tier 4
        let primary_weight = layout
            .equity_regional
            .iter()
            .zip(&regional_weights)
            .find(|(id, _)| **id == layout.primary_region)
            .map_or(0.0, |(_, w)| *w);
        let overflow = if primary_weight < base {
            0.0
        } else {
            let regional_sum: f64 = regional_weights.iter().sum();
            (equity - (base + core_sum + regional_sum)).max(0.0)
        };
        debug!(portfolio, primary_weight, overflow, "equity tier 4 weight");

        let mut weights = Vec::with_capacity(layout.equity_core.len() + layout.equity_regional.len() + 2);
        weights.push((layout.equity_anchor.clone(), base));
        weights.extend(layout.equity_core.iter().cloned().zip(core_weights));
        weights.extend(layout.equity_regional.iter().cloned().zip(regional_weights));
        weights.push((layout.equity_overflow.clone(), overflow));
        Ok(weights)
    }
}

/// Single-pass capped split of `remaining` across a pool.
///
/// `caps` are the pool's market caps and `total` their sum (must be
/// positive). Returns the final weight of each pool member in input order.
pub fn waterfall_pool(remaining: f64, caps: &[f64], total: f64, base: f64) -> Vec<f64> {
    let uncapped: Vec<f64> = caps.iter().map(|mcap| remaining * (mcap / total)).collect();

    let mut capped: Vec<f64> = uncapped
        .iter()
        .map(|w| if *w > base { base } else { *w })
        .collect();
    let total_capped: f64 = capped.iter().sum();

    if total_capped < remaining {
        let excess = remaining - total_capped;
        let open: Vec<usize> = (0..uncapped.len()).filter(|i| uncapped[*i] < base).collect();
        if !open.is_empty() {
            let open_total: f64 = open.iter().map(|i| uncapped[*i]).sum();
            for i in &open {
                if open_total > 0.0 {
                    capped[*i] += excess * (uncapped[*i] / open_total);
                } else {
                    capped[*i] = excess / open.len() as f64;
                }
            }
        }
    }

    capped.into_iter().map(|w| w.min(base)).collect()
}

fn check_sleeve(params: &PortfolioParameters, sleeve: &str, allocation: f64) -> AllocationResult<()> {
    if allocation < params.base_weight {
        return Err(AllocationError::AllocationBelowBase {
            portfolio: params.portfolio_id.to_string(),
            sleeve: sleeve.to_string(),
            allocation,
            base_weight: params.base_weight,
        });
    }
    Ok(())
}

fn pool_market_caps(market: &MarketSnapshot, ids: &[SecurityId]) -> AllocationResult<Vec<f64>> {
    ids.iter().map(|id| ratio_basis(market, id)).collect()
}

/// Market cap usable in ratio math.
fn ratio_basis(market: &MarketSnapshot, id: &SecurityId) -> AllocationResult<f64> {
    match market.market_cap(id) {
        None => Err(AllocationError::MissingMarketCap { id: id.to_string() }),
        Some(MarketCap::FixedWeight) => Err(AllocationError::FixedWeightInRatio { id: id.to_string() }),
        Some(MarketCap::Observed(value)) if !value.is_finite() => {
            Err(AllocationError::NonFiniteMarketCap { id: id.to_string() })
        }
        Some(MarketCap::Observed(value)) if value < 0.0 => Err(AllocationError::NegativeMarketCap {
            id: id.to_string(),
            value,
        }),
        Some(MarketCap::Observed(value)) => Ok(value),
    }
}
