//! Validation rules with per-fund overrides.
//!
//! The document has a `global` section and an `overrides` table keyed by
//! fund. Resolution is field-by-field: a field set in the fund override wins,
//! otherwise the global field applies, otherwise the default. `ucits_cap` has
//! no default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cascade_core::FundId;

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Default absolute tolerance for the weight sum and cap checks.
pub const DEFAULT_SUM_TOLERANCE_ABS: f64 = 0.0001;

/// Default relative sum tolerance.
pub const DEFAULT_SUM_TOLERANCE_PCT: f64 = 0.01;

/// Default reconciliation alert threshold in percentage points.
pub const DEFAULT_CHANGE_THRESHOLD_PCT: f64 = 5.0;

// =============================================================================
// DOCUMENT SECTIONS
// =============================================================================

/// Reconciliation block as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSection {
    /// Whether day-over-day reconciliation runs.
    pub enabled: Option<bool>,
    /// Alert threshold in percentage points.
    pub change_threshold_pct: Option<f64>,
}

/// One rules section (`global` or a fund override). Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesSection {
    /// Maximum weight of any single position (%).
    pub ucits_cap: Option<f64>,
    /// Absolute tolerance for sum and cap checks.
    pub sum_tolerance_abs: Option<f64>,
    /// Relative sum tolerance.
    pub sum_tolerance_pct: Option<f64>,
    /// Reconciliation settings.
    #[serde(default)]
    pub reconciliation: ReconciliationSection,
}

impl RulesSection {
    /// Overlays `other` on top of `self`; fields set in `other` win.
    fn overlay(&self, other: &RulesSection) -> RulesSection {
        RulesSection {
            ucits_cap: other.ucits_cap.or(self.ucits_cap),
            sum_tolerance_abs: other.sum_tolerance_abs.or(self.sum_tolerance_abs),
            sum_tolerance_pct: other.sum_tolerance_pct.or(self.sum_tolerance_pct),
            reconciliation: ReconciliationSection {
                enabled: other.reconciliation.enabled.or(self.reconciliation.enabled),
                change_threshold_pct: other
                    .reconciliation
                    .change_threshold_pct
                    .or(self.reconciliation.change_threshold_pct),
            },
        }
    }
}

impl Validate for RulesSection {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(cap) = self.ucits_cap {
            if !cap.is_finite() || cap <= 0.0 || cap > 100.0 {
                errors.push(ValidationError::new(
                    "ucits_cap",
                    format!("must be in (0, 100], got {cap}"),
                ));
            }
        }
        for (field, value) in [
            ("sum_tolerance_abs", self.sum_tolerance_abs),
            ("sum_tolerance_pct", self.sum_tolerance_pct),
            (
                "reconciliation.change_threshold_pct",
                self.reconciliation.change_threshold_pct,
            ),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    errors.push(ValidationError::new(
                        field,
                        format!("must be a non-negative number, got {v}"),
                    ));
                }
            }
        }

        errors
    }
}

/// The validation rules document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRulesDocument {
    /// Rules applying to every fund.
    #[serde(default)]
    pub global: RulesSection,
    /// Per-fund overrides.
    #[serde(default, alias = "fund_overrides")]
    pub overrides: BTreeMap<String, RulesSection>,
}

impl ValidationRulesDocument {
    /// Resolves the effective rules for a fund.
    pub fn resolve(&self, fund: &FundId) -> ConfigResult<ValidationRules> {
        let merged = match self.overrides.get(fund.as_str()) {
            Some(section) => self.global.overlay(section),
            None => self.global.clone(),
        };

        let ucits_cap = merged.ucits_cap.ok_or_else(|| ConfigError::MissingField {
            field: "ucits_cap".to_string(),
            scope: format!("fund '{fund}'"),
        })?;

        let rules = ValidationRules {
            ucits_cap,
            sum_tolerance_abs: merged.sum_tolerance_abs.unwrap_or(DEFAULT_SUM_TOLERANCE_ABS),
            sum_tolerance_pct: merged.sum_tolerance_pct.unwrap_or(DEFAULT_SUM_TOLERANCE_PCT),
            reconciliation: ReconciliationRules {
                enabled: merged.reconciliation.enabled.unwrap_or(true),
                change_threshold_pct: merged
                    .reconciliation
                    .change_threshold_pct
                    .unwrap_or(DEFAULT_CHANGE_THRESHOLD_PCT),
            },
        };
        rules.validate_or_error()?;
        Ok(rules)
    }
}

impl Validate for ValidationRulesDocument {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self
            .global
            .validate()
            .into_iter()
            .map(|e| e.within("global"))
            .collect();
        for (fund, section) in &self.overrides {
            let scope = format!("overrides.{fund}");
            errors.extend(section.validate().into_iter().map(|e| e.within(&scope)));
        }
        errors
    }
}

// =============================================================================
// RESOLVED RULES
// =============================================================================

/// Effective reconciliation settings for one fund.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRules {
    /// Whether reconciliation runs.
    pub enabled: bool,
    /// Alert threshold in percentage points.
    pub change_threshold_pct: f64,
}

impl Default for ReconciliationRules {
    fn default() -> Self {
        Self {
            enabled: true,
            change_threshold_pct: DEFAULT_CHANGE_THRESHOLD_PCT,
        }
    }
}

/// Effective validation rules for one fund.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Maximum weight of any single position (%).
    pub ucits_cap: f64,
    /// Absolute tolerance for sum and cap checks.
    pub sum_tolerance_abs: f64,
    /// Relative sum tolerance. Carried for reporting; the sum check is
    /// absolute.
    pub sum_tolerance_pct: f64,
    /// Reconciliation settings.
    pub reconciliation: ReconciliationRules,
}

impl ValidationRules {
    /// Rules with the given cap and default tolerances.
    pub fn with_cap(ucits_cap: f64) -> Self {
        Self {
            ucits_cap,
            sum_tolerance_abs: DEFAULT_SUM_TOLERANCE_ABS,
            sum_tolerance_pct: DEFAULT_SUM_TOLERANCE_PCT,
            reconciliation: ReconciliationRules::default(),
        }
    }
}

impl Validate for ValidationRules {
    fn validate(&self) -> Vec<ValidationError> {
        RulesSection {
            ucits_cap: Some(self.ucits_cap),
            sum_tolerance_abs: Some(self.sum_tolerance_abs),
            sum_tolerance_pct: Some(self.sum_tolerance_pct),
            reconciliation: ReconciliationSection {
                enabled: Some(self.reconciliation.enabled),
                change_threshold_pct: Some(self.reconciliation.change_threshold_pct),
            },
        }
        .validate()
    }
}
