//! Property-based tests for validation and reconciliation.

use std::collections::BTreeMap;

use cascade_core::{Position, WeightTable};
use cascade_validation::{compare, ComplianceValidator};
use chrono::NaiveDate;
use proptest::prelude::*;

const SECURITIES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

fn table(day: u32, weights: &BTreeMap<usize, f64>) -> WeightTable {
    let positions = weights
        .iter()
        .map(|(i, w)| Position::new("P", SECURITIES[*i], *w))
        .collect();
    WeightTable::from_positions(
        "fund",
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
        positions,
    )
    .unwrap()
}

/// Sparse weights: absent rows and exact zeros both occur.
fn weights() -> impl Strategy<Value = BTreeMap<usize, f64>> {
    prop::collection::btree_map(
        0..SECURITIES.len(),
        prop_oneof![Just(0.0), 0.0f64..20.0],
        0..SECURITIES.len(),
    )
}

proptest! {
    #[test]
    fn prop_reconciliation_is_antisymmetric(a in weights(), b in weights()) {
        let (ta, tb) = (table(21, &a), table(20, &b));
        let forward = compare(&ta, &tb, 5.0);
        let backward = compare(&tb, &ta, 5.0);

        prop_assert_eq!(forward.changes.len(), backward.changes.len());
        for row in &forward.changes {
            let mirror = backward
                .changes
                .iter()
                .find(|r| r.benchmark_id == row.benchmark_id)
                .unwrap();
            prop_assert_eq!(row.change, -mirror.change);
            prop_assert_eq!(row.abs_change, mirror.abs_change);
        }
        let mut added = forward.new_components.clone();
        let mut removed = backward.removed_components.clone();
        added.sort();
        removed.sort();
        prop_assert_eq!(added, removed);
        prop_assert_eq!(forward.alerts.len(), backward.alerts.len());
    }

    #[test]
    fn prop_new_and_removed_are_exclusive(a in weights(), b in weights()) {
        let report = compare(&table(21, &a), &table(20, &b), 5.0);
        for id in &report.new_components {
            prop_assert!(!report.removed_components.contains(id));
        }
    }

    #[test]
    fn prop_changes_sorted_descending(a in weights(), b in weights()) {
        let report = compare(&table(21, &a), &table(20, &b), 5.0);
        for pair in report.changes.windows(2) {
            prop_assert!(pair[0].abs_change >= pair[1].abs_change);
        }
    }

    #[test]
    fn prop_validation_is_idempotent(a in weights()) {
        let t = table(21, &a);
        let validator = ComplianceValidator::new(19.25, 0.0001);
        prop_assert_eq!(validator.validate_fund(&t), validator.validate_fund(&t));
    }
}
