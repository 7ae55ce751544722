//! Portfolio profile parameters.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::PortfolioId;

/// Allocations must add up to 100 within this tolerance.
const ALLOCATION_SUM_TOLERANCE: f64 = 1e-9;

/// Parameters of one portfolio profile.
///
/// Allocations and the base weight are percentages. The base weight doubles
/// as the per-position cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioParameters {
    /// Portfolio identifier.
    pub portfolio_id: PortfolioId,
    /// Equity sleeve allocation (%).
    pub equity_allocation: f64,
    /// Fixed income sleeve allocation (%).
    pub fixed_income_allocation: f64,
    /// Fixed anchor weight and per-position cap (%).
    pub base_weight: f64,
}

impl PortfolioParameters {
    /// Creates validated parameters.
    pub fn new(
        portfolio_id: impl Into<PortfolioId>,
        equity_allocation: f64,
        fixed_income_allocation: f64,
        base_weight: f64,
    ) -> CoreResult<Self> {
        let params = Self {
            portfolio_id: portfolio_id.into(),
            equity_allocation,
            fixed_income_allocation,
            base_weight,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the parameter invariants.
    pub fn validate(&self) -> CoreResult<()> {
        let id = self.portfolio_id.as_str();
        for (name, value) in [
            ("equity_allocation", self.equity_allocation),
            ("fixed_income_allocation", self.fixed_income_allocation),
            ("base_weight", self.base_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::invalid_parameters(
                    id,
                    format!("{name} must be a finite non-negative percentage, got {value}"),
                ));
            }
        }

        if self.base_weight <= 0.0 {
            return Err(CoreError::invalid_parameters(id, "base_weight must be positive"));
        }

        let total = self.equity_allocation + self.fixed_income_allocation;
        if (total - 100.0).abs() > ALLOCATION_SUM_TOLERANCE {
            return Err(CoreError::invalid_parameters(
                id,
                format!("equity and fixed income allocations sum to {total}, expected 100"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profiles() {
        for (id, eq, fi) in [("LSE20", 20.0, 80.0), ("LSE80", 80.0, 20.0)] {
            let params = PortfolioParameters::new(id, eq, fi, 19.25).unwrap();
            assert_eq!(params.base_weight, 19.25);
        }
    }

    #[test]
    fn test_allocations_must_sum_to_100() {
        let err = PortfolioParameters::new("BAD", 70.0, 20.0, 19.25).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameters { .. }));
        assert!(err.to_string().contains("sum to 90"));
    }

    #[test]
    fn test_rejects_non_positive_base() {
        assert!(PortfolioParameters::new("BAD", 80.0, 20.0, 0.0).is_err());
        assert!(PortfolioParameters::new("BAD", 80.0, 20.0, -1.0).is_err());
        assert!(PortfolioParameters::new("BAD", f64::NAN, 20.0, 19.25).is_err());
    }
}
