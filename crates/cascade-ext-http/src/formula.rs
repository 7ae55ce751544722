//! Formula strings understood by the time-series API.

use chrono::NaiveDate;

use cascade_core::dates::{compact, us_slash};

/// Market-cap index in USD on `date`.
pub fn market_cap_formula(date: NaiveDate) -> String {
    let d = compact(date);
    format!("FG_MCAP_IDX({d},{d},,USD)")
}

/// Five-day EUR period return ending `date` for a vendor identifier
/// such as `LEHHEUR:LHMN34611`.
pub fn return_formula(vendor_id: &str, date: NaiveDate) -> String {
    format!(
        "RA_RET(\"{vendor_id}\",-1,{},D,FIVEDAY,EUR,1)",
        us_slash(date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 21).unwrap()
    }

    #[test]
    fn test_market_cap_formula() {
        assert_eq!(market_cap_formula(date()), "FG_MCAP_IDX(20251121,20251121,,USD)");
    }

    #[test]
    fn test_return_formula() {
        assert_eq!(
            return_formula("LEHHEUR:LHMN34611", date()),
            "RA_RET(\"LEHHEUR:LHMN34611\",-1,11/21/2025,D,FIVEDAY,EUR,1)"
        );
    }
}
