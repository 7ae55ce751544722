//! Day-over-day reconciliation.
//!
//! Positions are matched on benchmark identifier. A row present on one side
//! only counts as weight 0 on the other, so a position that drops to zero
//! and a position that disappears are reported the same way.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cascade_core::WeightTable;

/// One row of the change table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRow {
    /// `{portfolio}_{security}`.
    pub benchmark_id: String,
    /// Previous weight (%), 0 when absent.
    pub previous: f64,
    /// Current weight (%), 0 when absent.
    pub current: f64,
    /// `current - previous` in percentage points.
    pub change: f64,
    /// `|change|`.
    pub abs_change: f64,
}

/// Differences between two calculation days.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Alerts for changes above the threshold, largest first.
    pub alerts: Vec<String>,
    /// Every matched position, sorted by descending `abs_change`.
    pub changes: Vec<ChangeRow>,
    /// Positions that went from 0 to a positive weight.
    pub new_components: Vec<String>,
    /// Positions that went from a positive weight to 0.
    pub removed_components: Vec<String>,
}

impl ReconciliationReport {
    /// A report with nothing to say, used when there is no previous day.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the report carries no alert and no structural change.
    pub fn is_quiet(&self) -> bool {
        self.alerts.is_empty() && self.new_components.is_empty() && self.removed_components.is_empty()
    }

    /// Human-readable notes on added and removed components.
    pub fn structural_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.new_components.is_empty() {
            notes.push(format!(
                "New components added: [{}]",
                self.new_components.join(", ")
            ));
        }
        if !self.removed_components.is_empty() {
            notes.push(format!(
                "Components removed: [{}]",
                self.removed_components.join(", ")
            ));
        }
        notes
    }
}

/// Compares weight tables against a fixed alert threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciliationEngine {
    threshold_pct: f64,
}

impl ReconciliationEngine {
    /// Creates an engine alerting on changes strictly above `threshold_pct`.
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }

    /// Alert threshold in percentage points.
    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    /// Diffs `current` against `previous`.
    pub fn compare(&self, current: &WeightTable, previous: &WeightTable) -> ReconciliationReport {
        compare(current, previous, self.threshold_pct)
    }
}

/// Diffs `current` against `previous` with the given alert threshold.
pub fn compare(current: &WeightTable, previous: &WeightTable, threshold_pct: f64) -> ReconciliationReport {
    let mut order: Vec<String> = Vec::new();
    let mut joined: HashMap<String, (f64, f64)> = HashMap::new();

    for position in current.positions() {
        let id = position.benchmark_id();
        let weight = position.weight.unwrap_or(0.0);
        joined
            .entry(id.clone())
            .or_insert_with(|| {
                order.push(id);
                (0.0, 0.0)
            })
            .1 = weight;
    }
    for position in previous.positions() {
        let id = position.benchmark_id();
        let weight = position.weight.unwrap_or(0.0);
        joined
            .entry(id.clone())
            .or_insert_with(|| {
                order.push(id);
                (0.0, 0.0)
            })
            .0 = weight;
    }

    let mut changes: Vec<ChangeRow> = order
        .into_iter()
        .map(|benchmark_id| {
            let (previous, current) = joined[&benchmark_id];
            let change = current - previous;
            ChangeRow {
                benchmark_id,
                previous,
                current,
                change,
                abs_change: change.abs(),
            }
        })
        .collect();

    let new_components = changes
        .iter()
        .filter(|row| row.previous == 0.0 && row.current > 0.0)
        .map(|row| row.benchmark_id.clone())
        .collect();
    let removed_components = changes
        .iter()
        .filter(|row| row.previous > 0.0 && row.current == 0.0)
        .map(|row| row.benchmark_id.clone())
        .collect();

    changes.sort_by(|a, b| b.abs_change.total_cmp(&a.abs_change));

    let alerts = changes
        .iter()
        .filter(|row| row.abs_change > threshold_pct)
        .map(|row| {
            format!(
                "{}: {:.2}% → {:.2}% (Δ{:+.2}pp)",
                row.benchmark_id, row.previous, row.current, row.change
            )
        })
        .collect();

    ReconciliationReport {
        alerts,
        changes,
        new_components,
        removed_components,
    }
}
