//! Gregorian calendar helpers

use chrono::NaiveDate;

/// Number of days in the given month, or `None` for a month outside 1-12
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some(next.signed_duration_since(first).num_days() as u32)
}
