//! Per-fund and per-run result records.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cascade_core::FundId;

/// Status of one fund in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    /// Weights were computed, validated and persisted.
    Success,
    /// The fund failed at some stage; nothing was persisted for it.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Outcome of one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Fund identifier.
    pub fund: FundId,
    /// Final status.
    pub status: RunStatus,
    /// Time spent on this fund.
    pub runtime_seconds: f64,
    /// Versioned output file, on success.
    pub output_path: Option<PathBuf>,
    /// Validation warnings, reconciliation alerts and structural notes.
    pub warnings: Vec<String>,
    /// Failure message, on failure.
    pub error: Option<String>,
}

impl RunResult {
    /// A successful fund.
    pub fn success(fund: FundId, runtime_seconds: f64, output_path: PathBuf, warnings: Vec<String>) -> Self {
        Self {
            fund,
            status: RunStatus::Success,
            runtime_seconds,
            output_path: Some(output_path),
            warnings,
            error: None,
        }
    }

    /// A failed fund.
    pub fn failure(fund: FundId, runtime_seconds: f64, error: impl Into<String>) -> Self {
        Self {
            fund,
            status: RunStatus::Failed,
            runtime_seconds,
            output_path: None,
            warnings: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// True when the fund succeeded.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Process-level outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every fund succeeded.
    Success,
    /// Some funds succeeded, some failed.
    PartialSuccess,
    /// No fund succeeded, or the run aborted.
    TotalFailure,
}

impl RunOutcome {
    /// Aggregates fund results. No results at all is a total failure.
    pub fn from_results(results: &[RunResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        if results.is_empty() || succeeded == 0 {
            Self::TotalFailure
        } else if succeeded == results.len() {
            Self::Success
        } else {
            Self::PartialSuccess
        }
    }

    /// Process exit code: 0, 1 or 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::PartialSuccess => 1,
            Self::TotalFailure => 2,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::PartialSuccess => write!(f, "partial success"),
            Self::TotalFailure => write!(f, "total failure"),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Calculation date.
    pub date: NaiveDate,
    /// One result per fund attempted.
    pub results: Vec<RunResult>,
    /// Why the run stopped before processing any fund.
    pub abort_reason: Option<String>,
    /// Aggregated outcome.
    pub outcome: RunOutcome,
    /// Wall-clock time of the whole run.
    pub runtime_seconds: f64,
}

impl RunSummary {
    /// Process exit code.
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }

    /// Result of one fund.
    pub fn result(&self, fund: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.fund.as_str() == fund)
    }

    /// Number of successful funds.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed funds.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(fund: &str) -> RunResult {
        RunResult::success(FundId::new(fund), 0.1, PathBuf::from("out.csv"), Vec::new())
    }

    fn failed(fund: &str) -> RunResult {
        RunResult::failure(FundId::new(fund), 0.1, "boom")
    }

    #[test]
    fn test_outcome_aggregation() {
        assert_eq!(RunOutcome::from_results(&[ok("a"), ok("b")]), RunOutcome::Success);
        assert_eq!(
            RunOutcome::from_results(&[ok("a"), failed("b")]),
            RunOutcome::PartialSuccess
        );
        assert_eq!(
            RunOutcome::from_results(&[failed("a"), failed("b")]),
            RunOutcome::TotalFailure
        );
        assert_eq!(RunOutcome::from_results(&[]), RunOutcome::TotalFailure);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunOutcome::Success.exit_code(), 0);
        assert_eq!(RunOutcome::PartialSuccess.exit_code(), 1);
        assert_eq!(RunOutcome::TotalFailure.exit_code(), 2);
    }

    #[test]
    fn test_failure_has_no_output() {
        let result = failed("a");
        assert!(!result.is_success());
        assert!(result.output_path.is_none());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
