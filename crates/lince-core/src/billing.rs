//! Billing calendar helpers

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::models::parse_due_day;

/// First day of a billing month
pub fn first_day(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidData(format!("Invalid month: {}-{}", year, month)))
}

/// Last day of a billing month
pub fn last_day(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_day(next_year, next_month)?
        .pred_opt()
        .ok_or_else(|| Error::InvalidData(format!("Invalid month: {}-{}", year, month)))
}

/// Due date of a customer's invoice in the given month
///
/// A due day past the end of the month falls on the month's last day, so
/// day "31" in February is due on the 28th (or 29th).
pub fn due_date_for(year: i32, month: u32, due_day: &str) -> Result<NaiveDate> {
    let day = parse_due_day(due_day)?;
    let last = last_day(year, month)?;
    let day = day.min(last.day());
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidData(format!("Invalid due date: {}-{}-{}", year, month, day)))
}

/// Month after the given one
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date_pads_day() {
        assert_eq!(due_date_for(2025, 3, "5").unwrap(), date(2025, 3, 5));
        assert_eq!(due_date_for(2025, 3, "05").unwrap(), date(2025, 3, 5));
        assert_eq!(
            due_date_for(2025, 3, "10").unwrap().to_string(),
            "2025-03-10"
        );
    }

    #[test]
    fn test_due_date_clamps_to_month_end() {
        assert_eq!(due_date_for(2025, 2, "31").unwrap(), date(2025, 2, 28));
        assert_eq!(due_date_for(2024, 2, "30").unwrap(), date(2024, 2, 29));
        assert_eq!(due_date_for(2025, 4, "31").unwrap(), date(2025, 4, 30));
        assert_eq!(due_date_for(2025, 12, "31").unwrap(), date(2025, 12, 31));
    }

    #[test]
    fn test_due_date_rejects_bad_input() {
        assert!(due_date_for(2025, 3, "0").is_err());
        assert!(due_date_for(2025, 3, "abc").is_err());
        assert!(due_date_for(2025, 13, "10").is_err());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(first_day(2025, 1).unwrap(), date(2025, 1, 1));
        assert_eq!(last_day(2025, 12).unwrap(), date(2025, 12, 31));
        assert_eq!(next_month(2025, 12), (2026, 1));
        assert_eq!(next_month(2025, 6), (2025, 7));
    }
}
