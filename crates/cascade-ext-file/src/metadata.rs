//! Run metadata persisted next to each versioned file.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cascade_core::dates::compact;
use cascade_core::WeightTable;

/// Version of the engine that produced a file.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of the compliance checks for a persisted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    /// Every portfolio passed.
    Passed,
    /// At least one portfolio failed.
    Failed,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Audit record for one persisted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Fund identifier.
    pub fund_name: String,
    /// Calculation date, `YYYYMMDD`.
    pub calculation_date: String,
    /// Wall-clock time of the run.
    pub run_timestamp: NaiveDateTime,
    /// Time spent on this fund.
    pub runtime_seconds: f64,
    /// Compliance outcome.
    pub validation_status: ValidationStatus,
    /// Number of portfolios in the table.
    pub num_portfolios: usize,
    /// Number of positions in the table.
    pub num_components: usize,
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// Who triggered the run.
    pub user: String,
    /// Engine version.
    pub engine_version: String,
    /// Versioned files for this fund and date, this one included.
    /// Assigned by the store on save.
    pub version: u32,
}

impl RunMetadata {
    /// Describes `table` as produced at `run_timestamp`.
    pub fn new(
        table: &WeightTable,
        run_timestamp: NaiveDateTime,
        runtime_seconds: f64,
        validation_status: ValidationStatus,
        user: impl Into<String>,
    ) -> Self {
        Self {
            fund_name: table.fund_id().to_string(),
            calculation_date: compact(table.date()),
            run_timestamp,
            runtime_seconds,
            validation_status,
            num_portfolios: table.portfolio_ids().len(),
            num_components: table.len(),
            run_id: Uuid::new_v4(),
            user: user.into(),
            engine_version: ENGINE_VERSION.to_string(),
            version: 0,
        }
    }

    /// Overrides the run identifier.
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::Position;
    use chrono::NaiveDate;

    #[test]
    fn test_metadata_counts_table() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
        let table = WeightTable::from_positions(
            "fund",
            date,
            vec![
                Position::new("A", "X", 50.0),
                Position::new("A", "Y", 50.0),
                Position::new("B", "X", 100.0),
            ],
        )
        .unwrap();
        let at = date.and_hms_opt(14, 30, 5).unwrap();

        let meta = RunMetadata::new(&table, at, 1.5, ValidationStatus::Passed, "ops");
        assert_eq!(meta.fund_name, "fund");
        assert_eq!(meta.calculation_date, "20251121");
        assert_eq!(meta.num_portfolios, 2);
        assert_eq!(meta.num_components, 3);
        assert_eq!(meta.version, 0);
        assert_eq!(meta.engine_version, ENGINE_VERSION);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&ValidationStatus::Passed).unwrap(),
            "\"PASSED\""
        );
        assert_eq!(ValidationStatus::Failed.to_string(), "FAILED");
    }
}
