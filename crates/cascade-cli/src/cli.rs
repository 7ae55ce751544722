//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{RunArgs, ShowArgs};

/// Cascade - capped tiered weight allocation, validation and reconciliation
#[derive(Parser)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compute, validate, reconcile and persist weights for the active funds
    Run(RunArgs),

    /// Show the latest persisted weights of a fund and date
    Show(ShowArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
