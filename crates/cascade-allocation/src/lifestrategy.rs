//! Vanguard LifeStrategy fund: four risk profiles over a shared tier layout.

use cascade_core::{
    FundId, IdentifierMap, MarketSnapshot, PortfolioParameters, SecurityId, WeightTable,
};

use crate::engine::AllocationEngine;
use crate::enrich::attach_returns;
use crate::error::AllocationResult;
use crate::layout::TierLayout;
use crate::strategy::FundStrategy;

/// Registry key of the LifeStrategy fund.
pub const LIFESTRATEGY_FUND_ID: &str = "vanguard_lifestrat";

/// Anchor weight and per-position cap of every profile (%).
pub const LIFESTRATEGY_BASE_WEIGHT: f64 = 19.25;

/// (portfolio, equity %, fixed income %)
const PROFILES: [(&str, f64, f64); 4] = [
    ("LSE20", 20.0, 80.0),
    ("LSE40", 40.0, 60.0),
    ("LSE60", 60.0, 40.0),
    ("LSE80", 80.0, 20.0),
];

/// Vendor identifiers used by the return formula.
const VENDOR_IDENTIFIERS: [(&str, &str); 14] = [
    // Bloomberg aggregate, EUR hedged
    ("LHMN34611", "LEHHEUR:LHMN34611"),
    ("LHMN21140", "LEHHEUR:LHMN21140"),
    ("LHMN9913", "LEHHEUR:LHMN9913"),
    ("LHMN21153", "LEHHEUR:LHMN21153"),
    // Bloomberg aggregate, EUR unhedged
    ("LHMN2004", "LEHUEUR:LHMN2004"),
    ("LHMN2002", "LEHUEUR:LHMN2002"),
    // FTSE
    ("I00010", "FTG_N:I00010"),
    ("I01018", "FTG_N:I01018"),
    ("I01270", "FTG_N:I01270"),
    ("I00586", "FTG_N:I00586"),
    ("I27049", "FTG_N:I27049"),
    ("I26152", "FTG_N:I26152"),
    ("180948", "FTG_N:180948"),
    // S&P 500
    ("SP50", "SPUS_GR:00000117"),
];

/// Tier layout of the LifeStrategy range.
pub fn lifestrategy_layout() -> TierLayout {
    let ids = |v: &[&str]| v.iter().map(|s| SecurityId::new(*s)).collect::<Vec<_>>();
    TierLayout {
        fixed_income_anchor: "LHMN34611".into(),
        fixed_income_pool: ids(&["LHMN21140", "LHMN9913", "LHMN21153", "LHMN2004", "LHMN2002"]),
        equity_anchor: "I00010".into(),
        equity_core: ids(&["I01018", "I01270"]),
        // North America first; it gates the S&P 500 overflow
        equity_regional: ids(&["I00586", "I27049", "I26152", "180948"]),
        primary_region: "I00586".into(),
        equity_overflow: "SP50".into(),
    }
}

/// The LifeStrategy fund.
#[derive(Debug, Clone)]
pub struct LifeStrategyFund {
    fund_id: FundId,
    engine: AllocationEngine,
    portfolios: Vec<PortfolioParameters>,
    identifiers: IdentifierMap,
}

impl LifeStrategyFund {
    /// Creates the fund with its standard profiles.
    pub fn new() -> AllocationResult<Self> {
        let portfolios = PROFILES
            .iter()
            .map(|(id, equity, fixed_income)| {
                PortfolioParameters::new(*id, *equity, *fixed_income, LIFESTRATEGY_BASE_WEIGHT)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let identifiers = VENDOR_IDENTIFIERS
            .iter()
            .map(|(id, vendor)| (SecurityId::new(*id), (*vendor).to_string()))
            .collect();

        Ok(Self {
            fund_id: FundId::new(LIFESTRATEGY_FUND_ID),
            engine: AllocationEngine::new(lifestrategy_layout())?,
            portfolios,
            identifiers,
        })
    }

    /// The allocation engine used for every profile.
    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }
}

impl FundStrategy for LifeStrategyFund {
    fn fund_id(&self) -> &FundId {
        &self.fund_id
    }

    fn portfolios(&self) -> &[PortfolioParameters] {
        &self.portfolios
    }

    fn market_cap_ids(&self) -> Vec<SecurityId> {
        self.engine.layout().market_cap_ids()
    }

    fn fixed_weight_ids(&self) -> Vec<SecurityId> {
        self.engine.layout().fixed_weight_ids()
    }

    fn return_identifiers(&self) -> IdentifierMap {
        self.identifiers.clone()
    }

    fn compute(&self, market: &MarketSnapshot) -> AllocationResult<WeightTable> {
        let mut table = WeightTable::new(self.fund_id.clone(), market.date());
        for params in &self.portfolios {
            let portfolio = self.engine.compute(&self.fund_id, market, params)?;
            table = table.merge(portfolio)?;
        }
        Ok(attach_returns(&table, market))
    }
}
