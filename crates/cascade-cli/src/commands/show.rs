//! Show command implementation.
//!
//! Reads the latest persisted table of a fund and date.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use cascade_config::PipelineConfig;
use cascade_core::dates::compact;
use cascade_core::{FundId, Position};
use cascade_ext_file::VersionedStore;

use crate::cli::OutputFormat;
use crate::commands::parse_date;
use crate::output::{format_decimal, print_header, print_output};

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Fund identifier
    #[arg(long)]
    pub fund: String,

    /// Calculation date (YYYYMMDD or "today")
    #[arg(short, long)]
    pub date: String,

    /// Only this portfolio
    #[arg(short, long)]
    pub portfolio: Option<String>,

    /// Read the output directory from this configuration file
    #[arg(short, long, conflicts_with = "output_dir")]
    pub config: Option<PathBuf>,

    /// Output directory of the store
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
}

/// One persisted position.
#[derive(Debug, Serialize, Tabled)]
struct WeightRow {
    #[serde(rename = "Benchmark ID")]
    #[tabled(rename = "Benchmark ID")]
    benchmark_id: String,
    #[serde(rename = "Portfolio")]
    #[tabled(rename = "Portfolio")]
    portfolio: String,
    #[serde(rename = "Security ID")]
    #[tabled(rename = "Security ID")]
    security: String,
    #[serde(rename = "Weight")]
    #[tabled(rename = "Weight (%)", display_with = "format_decimal")]
    weight: Option<f64>,
    #[serde(rename = "Return")]
    #[tabled(rename = "Return", display_with = "format_decimal")]
    period_return: Option<f64>,
}

impl From<&Position> for WeightRow {
    fn from(position: &Position) -> Self {
        Self {
            benchmark_id: position.benchmark_id(),
            portfolio: position.portfolio_id.to_string(),
            security: position.security_id.to_string(),
            weight: position.weight,
            period_return: position.period_return.value(),
        }
    }
}

/// Executes the show command.
pub fn execute(args: ShowArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let root = match &args.config {
        Some(path) => {
            PipelineConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?
                .output_dir
        }
        None => args.output_dir.clone(),
    };
    let store = VersionedStore::new(root);
    let fund = FundId::new(&args.fund);
    let date = parse_date(&args.date)?;

    let Some(table) = store.load_latest(&fund, date)? else {
        bail!("no results for {} on {}", fund, compact(date));
    };

    let rows: Vec<WeightRow> = table
        .positions()
        .iter()
        .filter(|p| {
            args.portfolio
                .as_deref()
                .map_or(true, |wanted| p.portfolio_id.as_str() == wanted)
        })
        .map(WeightRow::from)
        .collect();
    if rows.is_empty() {
        if let Some(portfolio) = &args.portfolio {
            bail!("portfolio {portfolio} not found for {} on {}", fund, compact(date));
        }
    }

    if format == OutputFormat::Table && !quiet {
        let versions = store.versions(&fund, date)?.len();
        print_header(&format!("{} {} (latest of {versions} versions)", fund, compact(date)));
    }
    print_output(&rows, format)
}
