//! Compliance checks on computed weights.
//!
//! Each portfolio of a table is validated on its own. Checks run in a fixed
//! order and accumulate: a table can fail the sum check and the cap check
//! in the same call.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cascade_config::ValidationRules;
use cascade_core::{PortfolioId, Position, WeightTable};

/// Width of the band below the cap in which positions are flagged (points).
pub const NEAR_CAP_BAND: f64 = 0.5;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Scalar metrics of one validated portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Sum of present weights (%).
    pub total_weight: f64,
    /// Largest present weight, `None` when no weight is present.
    pub max_weight: Option<f64>,
    /// Number of positions in the portfolio.
    pub position_count: usize,
    /// Number of negative weights.
    pub negative_count: usize,
    /// Number of absent weights.
    pub missing_count: usize,
}

/// Outcome of validating one portfolio.
///
/// Built once per call and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    portfolio_id: PortfolioId,
    errors: Vec<String>,
    warnings: Vec<String>,
    metrics: ValidationMetrics,
}

impl ValidationResult {
    /// True when no check produced an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Portfolio the result belongs to.
    pub fn portfolio_id(&self) -> &PortfolioId {
        &self.portfolio_id
    }

    /// Fatal findings.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Informational findings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Metrics, populated whether or not the portfolio is valid.
    pub fn metrics(&self) -> &ValidationMetrics {
        &self.metrics
    }
}

/// Per-portfolio results for a whole fund table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundValidation {
    /// One result per portfolio, in table order.
    pub portfolios: Vec<ValidationResult>,
}

impl FundValidation {
    /// True when every portfolio is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.portfolios.iter().all(ValidationResult::is_valid)
    }

    /// Errors of every portfolio, in table order.
    pub fn errors(&self) -> Vec<String> {
        self.portfolios
            .iter()
            .flat_map(|r| r.errors.iter().cloned())
            .collect()
    }

    /// Warnings of every portfolio, in table order.
    pub fn warnings(&self) -> Vec<String> {
        self.portfolios
            .iter()
            .flat_map(|r| r.warnings.iter().cloned())
            .collect()
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Checks weight tables against a cap and a sum tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceValidator {
    ucits_cap: f64,
    sum_tolerance_abs: f64,
}

impl ComplianceValidator {
    /// Creates a validator.
    pub fn new(ucits_cap: f64, sum_tolerance_abs: f64) -> Self {
        Self {
            ucits_cap,
            sum_tolerance_abs,
        }
    }

    /// Creates a validator from resolved fund rules.
    pub fn from_rules(rules: &ValidationRules) -> Self {
        Self::new(rules.ucits_cap, rules.sum_tolerance_abs)
    }

    /// Cap in force (%).
    pub fn ucits_cap(&self) -> f64 {
        self.ucits_cap
    }

    /// Validates one portfolio of `table`.
    ///
    /// Positions belonging to other portfolios are ignored. A portfolio with
    /// no positions fails the sum check.
    pub fn validate(&self, table: &WeightTable, portfolio_id: &PortfolioId) -> ValidationResult {
        let positions: Vec<&Position> = table.portfolio(portfolio_id).collect();
        let pid = portfolio_id.as_str();
        let cap = self.ucits_cap;
        let tol = self.sum_tolerance_abs;

        let present: Vec<(&Position, f64)> = positions
            .iter()
            .filter_map(|p| p.weight.map(|w| (*p, w)))
            .collect();
        let total_weight: f64 = present.iter().map(|(_, w)| w).sum();
        let max_weight = present.iter().map(|(_, w)| *w).reduce(f64::max);

        let over_cap = ids_where(&present, |w| w > cap + tol);
        let negative = ids_where(&present, |w| w < 0.0);
        let missing: Vec<String> = positions
            .iter()
            .filter(|p| p.weight.is_none())
            .map(|p| p.benchmark_id())
            .collect();
        let near_cap = ids_where(&present, |w| w > cap - NEAR_CAP_BAND && w < cap - tol);

        let mut errors = Vec::new();
        if (total_weight - 100.0).abs() > tol {
            errors.push(format!(
                "{pid}: Weight sum {total_weight:.9}% != 100% (tolerance: ±{tol}%)"
            ));
        }
        if !over_cap.is_empty() {
            errors.push(format!(
                "{pid}: UCITS violation - {} positions exceed {cap}%: {}",
                over_cap.len(),
                id_list(&over_cap)
            ));
        }
        if !negative.is_empty() {
            errors.push(format!("{pid}: Negative weights found: {}", id_list(&negative)));
        }
        if !missing.is_empty() {
            errors.push(format!("{pid}: Missing weights for: {}", id_list(&missing)));
        }

        let mut warnings = Vec::new();
        if !near_cap.is_empty() {
            warnings.push(format!(
                "{pid}: Positions within {NEAR_CAP_BAND}% of UCITS cap: {}",
                id_list(&near_cap)
            ));
        }

        for error in &errors {
            warn!(fund = %table.fund_id(), portfolio = pid, "{error}");
        }
        debug!(
            fund = %table.fund_id(),
            portfolio = pid,
            total_weight,
            errors = errors.len(),
            warnings = warnings.len(),
            "portfolio validated"
        );

        ValidationResult {
            portfolio_id: portfolio_id.clone(),
            errors,
            warnings,
            metrics: ValidationMetrics {
                total_weight,
                max_weight,
                position_count: positions.len(),
                negative_count: negative.len(),
                missing_count: missing.len(),
            },
        }
    }

    /// Validates every portfolio of `table` independently.
    pub fn validate_fund(&self, table: &WeightTable) -> FundValidation {
        FundValidation {
            portfolios: table
                .portfolio_ids()
                .iter()
                .map(|pid| self.validate(table, pid))
                .collect(),
        }
    }
}

fn ids_where(present: &[(&Position, f64)], predicate: impl Fn(f64) -> bool) -> Vec<String> {
    present
        .iter()
        .filter(|(_, w)| predicate(*w))
        .map(|(p, _)| p.benchmark_id())
        .collect()
}

fn id_list(ids: &[String]) -> String {
    format!("[{}]", ids.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn table(rows: &[(&str, &str, Option<f64>)]) -> WeightTable {
        let positions = rows
            .iter()
            .map(|(p, s, w)| match w {
                Some(w) => Position::new(*p, *s, *w),
                None => Position::missing(*p, *s),
            })
            .collect();
        WeightTable::from_positions(
            "fund",
            NaiveDate::from_ymd_opt(2025, 11, 21).unwrap(),
            positions,
        )
        .unwrap()
    }

    fn validator() -> ComplianceValidator {
        ComplianceValidator::new(19.25, 0.0001)
    }

    fn pid(id: &str) -> PortfolioId {
        PortfolioId::new(id)
    }

    fn compliant() -> WeightTable {
        table(&[
            ("P", "A", Some(19.25)),
            ("P", "B", Some(19.25)),
            ("P", "C", Some(19.25)),
            ("P", "D", Some(19.25)),
            ("P", "E", Some(15.0)),
            ("P", "F", Some(8.0)),
        ])
    }

    #[test]
    fn test_compliant_portfolio_passes() {
        let result = validator().validate(&compliant(), &pid("P"));
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
        assert!(result.warnings().is_empty());
        assert_abs_diff_eq!(result.metrics().total_weight, 100.0, epsilon = 1e-12);
        assert_eq!(result.metrics().max_weight, Some(19.25));
        assert_eq!(result.metrics().position_count, 6);
    }

    #[test]
    fn test_cap_violation_names_the_position() {
        let t = table(&[
            ("LSE80", "X", Some(20.0)),
            ("LSE80", "Y", Some(19.0)),
            ("LSE80", "Z", Some(19.0)),
            ("LSE80", "W", Some(19.0)),
            ("LSE80", "V", Some(19.0)),
            ("LSE80", "U", Some(4.0)),
        ]);
        let result = validator().validate(&t, &pid("LSE80"));

        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("UCITS"));
        assert!(result.errors()[0].contains("LSE80_X"));
        assert_eq!(
            result.errors()[0],
            "LSE80: UCITS violation - 1 positions exceed 19.25%: [LSE80_X]"
        );
    }

    #[test]
    fn test_checks_accumulate() {
        let t = table(&[
            ("P", "A", Some(30.0)),
            ("P", "B", Some(-1.0)),
            ("P", "C", None),
        ]);
        let result = validator().validate(&t, &pid("P"));

        assert_eq!(result.errors().len(), 4);
        assert_eq!(
            result.errors()[0],
            "P: Weight sum 29.000000000% != 100% (tolerance: ±0.0001%)"
        );
        assert!(result.errors()[1].starts_with("P: UCITS violation - 1 positions"));
        assert_eq!(result.errors()[2], "P: Negative weights found: [P_B]");
        assert_eq!(result.errors()[3], "P: Missing weights for: [P_C]");

        let metrics = result.metrics();
        assert_eq!(metrics.negative_count, 1);
        assert_eq!(metrics.missing_count, 1);
        assert_eq!(metrics.position_count, 3);
        assert_eq!(metrics.max_weight, Some(30.0));
    }

    #[test]
    fn test_sum_within_tolerance() {
        let t = table(&[("P", "A", Some(19.25)), ("P", "B", Some(80.75005))]);
        let result = ComplianceValidator::new(100.0, 0.0001).validate(&t, &pid("P"));
        assert!(result.is_valid());
    }

    #[test]
    fn test_cap_tolerance_is_inclusive() {
        let t = table(&[
            ("P", "A", Some(19.25005)),
            ("P", "B", Some(19.25)),
            ("P", "C", Some(19.25)),
            ("P", "D", Some(19.25)),
            ("P", "E", Some(19.25)),
            ("P", "F", Some(3.74995)),
        ]);
        assert!(validator().validate(&t, &pid("P")).is_valid());
    }

    #[test]
    fn test_near_cap_warning_excludes_positions_at_cap() {
        let t = table(&[
            ("P", "A", Some(19.25)),
            ("P", "B", Some(19.0)),
            ("P", "C", Some(18.75)),
            ("P", "D", Some(19.25)),
            ("P", "E", Some(19.25)),
            ("P", "F", Some(4.5)),
        ]);
        let result = validator().validate(&t, &pid("P"));

        assert!(result.is_valid());
        assert_eq!(
            result.warnings(),
            ["P: Positions within 0.5% of UCITS cap: [P_B]".to_string()]
        );
    }

    #[test]
    fn test_empty_portfolio_reports_no_max() {
        let result = validator().validate(&compliant(), &pid("OTHER"));
        assert!(!result.is_valid());
        assert_eq!(result.metrics().max_weight, None);
        assert_eq!(result.metrics().position_count, 0);
    }

    #[test]
    fn test_portfolios_validated_independently() {
        let t = table(&[
            ("A", "X", Some(19.25)),
            ("A", "Y", Some(80.75)),
            ("B", "X", Some(19.25)),
            ("B", "Y", Some(19.25)),
        ]);
        let fund = ComplianceValidator::new(100.0, 0.0001).validate_fund(&t);

        assert_eq!(fund.portfolios.len(), 2);
        assert!(fund.portfolios[0].is_valid());
        assert!(!fund.portfolios[1].is_valid());
        assert!(!fund.is_valid());
        assert_eq!(fund.errors().len(), 1);
        assert!(fund.errors()[0].starts_with("B: Weight sum 38.500000000%"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let t = table(&[("P", "A", Some(20.0)), ("P", "B", None)]);
        let v = validator();
        assert_eq!(v.validate(&t, &pid("P")), v.validate(&t, &pid("P")));
    }

    #[test]
    fn test_from_rules() {
        let rules = ValidationRules::with_cap(10.0);
        let v = ComplianceValidator::from_rules(&rules);
        assert_eq!(v.ucits_cap(), 10.0);
    }
}
