//! Canonical timestamps and partial-timestamp arithmetic
//!
//! Records are keyed by a fixed-width `YYYYMMDDhhmmss` string. Any left-anchored
//! slice of that string is a partial timestamp, which a store can match by prefix.

mod calendar;
mod margin;

pub use calendar::days_in_month;
pub use margin::{left_margin, margins, right_margin, slot_end, MarginPair};

use std::fmt;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of a canonical timestamp string
pub const TIMESTAMP_LEN: usize = 14;

/// Length of a `YYYYMMDD` day prefix
pub const DAY_PREFIX_LEN: usize = 8;

/// Earliest year representable in four digits
pub const MIN_YEAR: i32 = 1;

/// Latest year representable in four digits
pub const MAX_YEAR: i32 = 9999;

const SECONDS_PER_DAY: i64 = 86_400;

/// A calendar date-time with second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instant(NaiveDateTime);

impl Instant {
    /// Create an instant from calendar fields
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Self)
    }

    /// Create an instant at midnight of the given day
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        Self::from_ymd_hms(year, month, day, 0, 0, 0)
    }

    /// Midnight of January 1st of the given year
    pub fn start_of_year(year: i32) -> Option<Self> {
        Self::from_ymd(year, 1, 1)
    }

    /// Parse a canonical 14-digit `YYYYMMDDhhmmss` string
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != TIMESTAMP_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_timestamp(format!(
                "Expected {} digits, got {:?}", TIMESTAMP_LEN, s
            )));
        }

        // All-digit input makes these slices and parses infallible.
        let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().unwrap_or(u32::MAX);

        let year = field(0..4) as i32;
        Self::from_ymd_hms(year, field(4..6), field(6..8), field(8..10), field(10..12), field(12..14))
            .ok_or_else(|| Error::invalid_timestamp(format!("Not a calendar date-time: {}", s)))
    }

    /// Render the canonical 14-digit string
    pub fn canonical(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second(),
        )
    }

    /// Render the `YYYYMMDD` prefix covering this instant's day
    pub fn day_prefix(&self) -> String {
        format!("{:04}{:02}{:02}", self.0.year(), self.0.month(), self.0.day())
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Calendar month (1-12)
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month (1-31)
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Shift by whole days, keeping the time of day.
    ///
    /// Returns `None` when the result leaves years 1..=9999.
    pub fn checked_add_days(&self, days: i64) -> Option<Self> {
        let shifted = self.0.checked_add_signed(ChronoDuration::days(days))?;
        if (MIN_YEAR..=MAX_YEAR).contains(&shifted.year()) {
            Some(Self(shifted))
        } else {
            None
        }
    }

    /// Shift by whole seconds.
    ///
    /// Returns `None` when the result leaves years 1..=9999.
    pub fn checked_add_seconds(&self, seconds: i64) -> Option<Self> {
        let shifted = self.0.checked_add_signed(ChronoDuration::seconds(seconds))?;
        if (MIN_YEAR..=MAX_YEAR).contains(&shifted.year()) {
            Some(Self(shifted))
        } else {
            None
        }
    }

    /// Last second of this instant's day
    pub fn end_of_day(&self) -> Self {
        let elapsed = i64::from(self.0.num_seconds_from_midnight());
        Self(self.0 + ChronoDuration::seconds(SECONDS_PER_DAY - 1 - elapsed))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl TryFrom<String> for Instant {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Instant> for String {
    fn from(instant: Instant) -> Self {
        instant.canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let instant = Instant::parse("20190430153045").unwrap();
        assert_eq!(instant, Instant::from_ymd_hms(2019, 4, 30, 15, 30, 45).unwrap());
        assert_eq!(instant.canonical(), "20190430153045");
        assert_eq!(instant.day_prefix(), "20190430");
        assert_eq!(instant.to_string(), "20190430153045");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Instant::parse("").is_err());
        assert!(Instant::parse("2019043015304").is_err());
        assert!(Instant::parse("201904301530455").is_err());
        assert!(Instant::parse("2019043015304a").is_err());
        assert!(Instant::parse("+2019043015304").is_err());
        // Feb 30, month 13, hour 24, year 0
        assert!(Instant::parse("20190230000000").is_err());
        assert!(Instant::parse("20191301000000").is_err());
        assert!(Instant::parse("20190101240000").is_err());
        assert!(Instant::parse("00000101000000").is_err());
    }

    #[test]
    fn test_small_years_are_zero_padded() {
        let instant = Instant::from_ymd(999, 12, 31).unwrap();
        assert_eq!(instant.canonical(), "09991231000000");
        assert_eq!(Instant::parse("09991231000000").unwrap(), instant);
    }

    #[test]
    fn test_checked_add_days() {
        let leap = Instant::from_ymd_hms(2020, 2, 28, 6, 0, 0).unwrap();
        assert_eq!(leap.checked_add_days(1).unwrap(), Instant::from_ymd_hms(2020, 2, 29, 6, 0, 0).unwrap());
        assert_eq!(leap.checked_add_days(2).unwrap(), Instant::from_ymd_hms(2020, 3, 1, 6, 0, 0).unwrap());

        let first = Instant::from_ymd(1, 1, 1).unwrap();
        assert!(first.checked_add_days(-1).is_none());

        let last = Instant::from_ymd(9999, 12, 31).unwrap();
        assert!(last.checked_add_days(1).is_none());
    }

    #[test]
    fn test_checked_add_seconds() {
        let late = Instant::from_ymd_hms(2019, 12, 31, 23, 59, 50).unwrap();
        assert_eq!(late.checked_add_seconds(10).unwrap(), Instant::from_ymd(2020, 1, 1).unwrap());
        assert_eq!(late.checked_add_seconds(-50).unwrap(), Instant::from_ymd_hms(2019, 12, 31, 23, 59, 0).unwrap());

        let last = Instant::from_ymd_hms(9999, 12, 31, 23, 59, 59).unwrap();
        assert!(last.checked_add_seconds(1).is_none());
        assert!(Instant::from_ymd(1, 1, 1).unwrap().checked_add_seconds(-1).is_none());
    }

    #[test]
    fn test_end_of_day() {
        let expected = Instant::from_ymd_hms(2020, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(Instant::from_ymd(2020, 2, 29).unwrap().end_of_day(), expected);
        assert_eq!(Instant::from_ymd_hms(2020, 2, 29, 13, 7, 1).unwrap().end_of_day(), expected);
        assert_eq!(expected.end_of_day(), expected);

        let last = Instant::from_ymd(9999, 12, 31).unwrap();
        assert_eq!(last.end_of_day().canonical(), "99991231235959");
    }

    #[test]
    fn test_ordering() {
        let a = Instant::parse("19691231235959").unwrap();
        let b = Instant::parse("19700101000000").unwrap();
        assert!(a < b);
        assert!(a.canonical() < b.canonical());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let instant = Instant::from_ymd(2019, 11, 30).unwrap();
        let json = serde_json::to_string(&instant).unwrap();
        assert_eq!(json, "\"20191130000000\"");

        let back: Instant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instant);

        assert!(serde_json::from_str::<Instant>("\"20191131000000\"").is_err());
    }

    #[test]
    fn test_parse_errors_are_not_prefix_errors() {
        let err = Instant::parse("20191131000000").unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(_)));
        assert!(!err.is_invalid_prefix());

        let err = Instant::parse("2019").unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(_)));
    }
}
