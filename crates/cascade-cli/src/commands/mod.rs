//! CLI command implementations.

pub mod run;
pub mod show;

pub use run::RunArgs;
pub use show::ShowArgs;

use anyhow::Context;
use chrono::{Local, NaiveDate};

use cascade_core::dates::parse_compact;

/// Default configuration file.
pub const DEFAULT_CONFIG: &str = "config/cascade.toml";

/// Parses `YYYYMMDD`, or `today` for the local date.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    if s.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    parse_compact(s).with_context(|| format!("invalid date '{s}', use YYYYMMDD or 'today'"))
}
