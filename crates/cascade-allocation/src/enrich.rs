//! Return enrichment.

use cascade_core::{MarketSnapshot, WeightTable};
use tracing::warn;

/// Attaches each security's period return to its positions.
///
/// Securities without return data get [`cascade_core::ReturnValue::NoData`];
/// no position is dropped. Returns a new table.
pub fn attach_returns(table: &WeightTable, market: &MarketSnapshot) -> WeightTable {
    let enriched = table.map_positions(|position| {
        position
            .clone()
            .with_return(market.period_return(&position.security_id))
    });

    let mut missing: Vec<&str> = enriched
        .positions()
        .iter()
        .filter(|p| p.period_return.is_no_data())
        .map(|p| p.security_id.as_str())
        .collect();
    missing.sort_unstable();
    missing.dedup();
    if !missing.is_empty() {
        warn!(
            fund = %table.fund_id(),
            securities = ?missing,
            "no return data for some securities"
        );
    }

    enriched
}
