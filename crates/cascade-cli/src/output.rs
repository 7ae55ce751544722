//! Terminal rendering for run summaries and weight listings.
//!
//! Tables go to stdout in the human format. JSON and CSV are meant for
//! pipelines, so everything they emit on stdout is machine readable and
//! status lines go to stderr.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use cascade_engine::RunStatus;

use crate::cli::OutputFormat;

/// Prints a listing in the requested format.
pub fn print_output<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Json => print_document(rows),
        OutputFormat::Csv => print_csv(rows),
    }
}

/// Prints one value as pretty JSON on stdout.
pub fn print_document<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table<T: Tabled>(rows: &[T]) -> anyhow::Result<()> {
    if rows.is_empty() {
        println!("Nothing to show.");
        return Ok(());
    }

    // Identifiers stay left, figures line up on the right.
    let table = Table::new(rows)
        .with(Style::psql())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();
    println!("{table}");
    Ok(())
}

fn print_csv<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Formats an optional percentage with nine decimals, blank when absent.
pub fn format_decimal(value: &Option<f64>) -> String {
    value.map(|v| format!("{v:.9}")).unwrap_or_default()
}

/// Status cell of a fund row, coloured only for terminal tables.
pub fn status_label(status: RunStatus, colorize: bool) -> String {
    let label = status.to_string();
    match (colorize, status) {
        (false, _) => label,
        (true, RunStatus::Success) => label.green().to_string(),
        (true, RunStatus::Failed) => label.red().bold().to_string(),
    }
}

/// Prints the closing line of a clean run.
pub fn print_success(message: &str) {
    println!("{} {}", "ok".green().bold(), message);
}

/// Prints a failure to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Prints a fund warning to stderr.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow(), message);
}

/// Prints a section title.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold());
}
