//! # Cascade Validation
//!
//! Post-allocation checks on a [`WeightTable`](cascade_core::WeightTable).
//!
//! - [`ComplianceValidator`]: sum, cap, sign and completeness checks per portfolio
//! - [`ReconciliationEngine`]: day-over-day diff against the previous table
//!
//! Both are pure. Failures are returned as values, never raised.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compliance;
pub mod reconcile;

pub use compliance::{ComplianceValidator, FundValidation, ValidationMetrics, ValidationResult, NEAR_CAP_BAND};
pub use reconcile::{compare, ChangeRow, ReconciliationEngine, ReconciliationReport};
