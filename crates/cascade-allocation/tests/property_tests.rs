//! Property-based tests for the waterfall engine.

use cascade_allocation::{waterfall_pool, FundStrategy, LifeStrategyFund};
use cascade_core::prelude::*;
use chrono::NaiveDate;
use proptest::prelude::*;

const BASE: f64 = 19.25;

fn market(caps: &[f64]) -> MarketSnapshot {
    let fund = LifeStrategyFund::new().unwrap();
    let mut market = MarketSnapshot::new(NaiveDate::from_ymd_opt(2025, 11, 21).unwrap());
    for (id, mcap) in fund.market_cap_ids().into_iter().zip(caps) {
        market = market.with_market_cap(id, *mcap);
    }
    for id in fund.fixed_weight_ids() {
        market = market.with_fixed_weight(id);
    }
    market
}

fn market_caps() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1e9, 12)
}

proptest! {
    #[test]
    fn prop_weights_never_negative_or_above_cap(caps in market_caps()) {
        let table = LifeStrategyFund::new().unwrap().compute(&market(&caps)).unwrap();
        for position in table.positions() {
            let weight = position.weight.unwrap();
            prop_assert!(weight >= 0.0, "{} = {}", position.benchmark_id(), weight);
            prop_assert!(weight <= BASE + 1e-9, "{} = {}", position.benchmark_id(), weight);
        }
    }

    #[test]
    fn prop_anchors_hold_base_weight(caps in market_caps()) {
        let table = LifeStrategyFund::new().unwrap().compute(&market(&caps)).unwrap();
        for portfolio in ["LSE20", "LSE40", "LSE60", "LSE80"] {
            prop_assert_eq!(table.weight(portfolio, "LHMN34611"), Some(BASE));
            prop_assert_eq!(table.weight(portfolio, "I00010"), Some(BASE));
        }
    }

    #[test]
    fn prop_compute_is_deterministic(caps in market_caps()) {
        let fund = LifeStrategyFund::new().unwrap();
        let snapshot = market(&caps);
        let first = fund.compute(&snapshot).unwrap();
        let second = fund.compute(&snapshot).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_portfolio_never_exceeds_100(caps in market_caps()) {
        let table = LifeStrategyFund::new().unwrap().compute(&market(&caps)).unwrap();
        for portfolio in table.portfolio_ids() {
            let sum: f64 = table.portfolio(&portfolio).filter_map(|p| p.weight).sum();
            prop_assert!(sum <= 100.0 + 1e-6, "{} sums to {}", portfolio, sum);
        }
    }

    #[test]
    fn prop_pool_split_is_exact_when_nothing_caps(caps in prop::collection::vec(1.0f64..100.0, 5)) {
        // Five members and a remaining of 19.25 can never exceed the cap.
        let total: f64 = caps.iter().sum();
        let weights = waterfall_pool(BASE, &caps, total, BASE);
        let sum: f64 = weights.iter().sum();
        prop_assert!((sum - BASE).abs() < 1e-9);
    }
}
