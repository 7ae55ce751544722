//! Calculation date formats.
//!
//! Output directories and the market-cap formula use `YYYYMMDD`; the return
//! formula uses `MM/DD/YYYY`.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

/// Formats a date as `YYYYMMDD`.
pub fn compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats a date as `MM/DD/YYYY`.
pub fn us_slash(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Parses a `YYYYMMDD` date.
pub fn parse_compact(s: &str) -> CoreResult<NaiveDate> {
    if s.len() != 8 {
        return Err(CoreError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|_| CoreError::InvalidDate(s.to_string()))
}
