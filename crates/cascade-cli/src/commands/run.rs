//! Run command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use cascade_config::{PipelineConfig, Validate};
use cascade_core::dates::compact;
use cascade_core::FundId;
use cascade_engine::{RunOrchestrator, RunResult, RunSummary};
use cascade_ext_http::FormulaApiClient;

use crate::cli::OutputFormat;
use crate::commands::{parse_date, DEFAULT_CONFIG};
use crate::output::{
    print_document, print_error, print_header, print_output, print_success, print_warning,
    status_label,
};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Calculation date (YYYYMMDD or "today")
    #[arg(short, long, default_value = "today")]
    pub date: String,

    /// Run only this fund
    #[arg(long)]
    pub fund: Option<String>,

    /// User recorded in run metadata
    #[arg(long, env = "USER", default_value = "unknown")]
    pub user: String,
}

/// One fund line of the run summary.
#[derive(Debug, Serialize, Tabled)]
struct FundRow {
    #[tabled(rename = "Fund")]
    fund: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Runtime (s)")]
    runtime_seconds: String,
    #[tabled(rename = "Warnings")]
    warnings: usize,
    #[tabled(rename = "Output / Error")]
    detail: String,
}

impl FundRow {
    fn new(result: &RunResult, colorize: bool) -> Self {
        let status = status_label(result.status, colorize);
        let detail = match (&result.output_path, &result.error) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        };
        Self {
            fund: result.fund.to_string(),
            status,
            runtime_seconds: format!("{:.2}", result.runtime_seconds),
            warnings: result.warnings.len(),
            detail,
        }
    }
}

/// Executes the run command and returns the process exit code.
pub async fn execute(args: RunArgs, format: OutputFormat, quiet: bool) -> Result<u8> {
    let config = PipelineConfig::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    config.validate_or_error()?;
    let date = parse_date(&args.date)?;

    let api_key = config.gateway.resolve_api_key()?;
    let client = FormulaApiClient::from_config(&config.gateway, api_key)?;
    let orchestrator = RunOrchestrator::from_config(&config, Arc::new(client), args.user)?;

    let fund = args.fund.map(FundId::new);
    let summary = orchestrator.run(date, fund.as_ref()).await;

    report(&summary, format, quiet)?;
    Ok(summary.exit_code())
}

fn report(summary: &RunSummary, format: OutputFormat, quiet: bool) -> Result<()> {
    let colorize = format == OutputFormat::Table;
    let rows: Vec<FundRow> = summary
        .results
        .iter()
        .map(|r| FundRow::new(r, colorize))
        .collect();

    match format {
        // The whole summary, so an abort is visible without the table.
        OutputFormat::Json => return print_document(summary),
        OutputFormat::Csv => {
            if let Some(reason) = &summary.abort_reason {
                print_error(&format!("Run aborted: {reason}"));
            }
            return print_output(&rows, format);
        }
        OutputFormat::Table => {}
    }

    if !quiet {
        print_header(&format!("Run {} for {}", summary.run_id, compact(summary.date)));
    }
    if let Some(reason) = &summary.abort_reason {
        print_error(&format!("Run aborted: {reason}"));
        return Ok(());
    }
    print_output(&rows, format)?;

    if !quiet {
        for result in &summary.results {
            for warning in &result.warnings {
                print_warning(&format!("{}: {warning}", result.fund));
            }
        }
    }
    let line = format!(
        "{}: {} succeeded, {} failed in {:.2}s",
        summary.outcome,
        summary.succeeded(),
        summary.failed(),
        summary.runtime_seconds
    );
    if summary.failed() == 0 {
        print_success(&line);
    } else {
        print_error(&line);
    }
    Ok(())
}
