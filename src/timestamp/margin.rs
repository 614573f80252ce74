//! Margin calculation for partial timestamps
//!
//! A partial timestamp matches every canonical string that starts with it. Its
//! margins are the earliest and latest day-start instants such a string can
//! encode. Both are found by padding the prefix to full width with the smallest
//! (left) or largest (right) digits the calendar allows, then parsing the result.
//!
//! Lengths 5 and 7 end in the tens digit of the month or the day, so their
//! padding depends on how many months the year has and how many days the month
//! has (28, 29, 30 or 31).

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::timestamp::{days_in_month, Instant, DAY_PREFIX_LEN, TIMESTAMP_LEN};

/// Filler after a partial year, indexed by prefix length
const YEAR_LEFT_FILL: [&str; 5] = ["", "0000101000000", "000101000000", "00101000000", "0101000000"];

/// Filler after a partial year, indexed by prefix length
const YEAR_RIGHT_FILL: [&str; 5] = ["", "9991231000000", "991231000000", "91231000000", "1231000000"];

/// Day-and-time filler after a full `YYYYMM` on the left side
const MONTH_LEFT_FILL: &str = "01000000";

const ZEROS: &str = "00000000000000";

/// Seconds spanned by a sub-day prefix, indexed by length past `YYYYMMDD`
const SLOT_SECONDS: [i64; 6] = [36_000, 3_600, 600, 60, 10, 1];

/// Earliest and latest instants matched by a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginPair {
    /// Earliest instant consistent with the prefix
    pub left: Instant,
    /// Latest day consistent with the prefix, at its first instant
    pub right: Instant,
}

impl MarginPair {
    /// Whether everything the prefix matches lies inside `[begin, end]`
    pub fn covers(&self, begin: Instant, end: Instant) -> bool {
        begin <= self.left && self.right <= end
    }

    /// Last instant matched by a prefix of `len` digits with these margins.
    ///
    /// Day-level prefixes end with the right margin's day. Shorter slots are
    /// clipped to the day they start in, so `"201911012"` ends at 23:59:59.
    pub fn slot_end(&self, len: usize) -> Instant {
        if len <= DAY_PREFIX_LEN {
            return self.right.end_of_day();
        }

        let day_end = self.left.end_of_day();
        let width = SLOT_SECONDS.get(len - DAY_PREFIX_LEN - 1).copied().unwrap_or(1);

        self.left
            .checked_add_seconds(width - 1)
            .map_or(day_end, |last| last.min(day_end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Compute the earliest instant consistent with `prefix`
pub fn left_margin(prefix: &str) -> Result<Instant> {
    widen(prefix, Side::Left)
}

/// Compute the latest day consistent with `prefix`
pub fn right_margin(prefix: &str) -> Result<Instant> {
    widen(prefix, Side::Right)
}

/// Compute the last instant whose canonical form starts with `prefix`
pub fn slot_end(prefix: &str) -> Result<Instant> {
    Ok(margins(prefix)?.slot_end(prefix.len()))
}

/// Compute both margins of `prefix`
pub fn margins(prefix: &str) -> Result<MarginPair> {
    Ok(MarginPair {
        left: left_margin(prefix)?,
        right: right_margin(prefix)?,
    })
}

fn widen(prefix: &str, side: Side) -> Result<Instant> {
    let fill = filler(prefix, side)?;
    let padded = format!("{}{}", prefix, fill);

    Instant::parse(&padded).map_err(|_| {
        Error::invalid_prefix(format!("{:?} widens to an invalid date-time {}", prefix, padded))
    })
}

fn filler(prefix: &str, side: Side) -> Result<Cow<'static, str>> {
    let len = prefix.len();
    if len == 0 || len > TIMESTAMP_LEN {
        return Err(Error::invalid_prefix(format!(
            "Prefix length must be 1 to {}, got {}", TIMESTAMP_LEN, len
        )));
    }

    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_prefix(format!("Prefix must be digits only: {:?}", prefix)));
    }

    let fill = match (len, side) {
        (1..=4, Side::Left) => Cow::Borrowed(YEAR_LEFT_FILL[len]),
        (1..=4, Side::Right) => Cow::Borrowed(YEAR_RIGHT_FILL[len]),
        (5, _) => Cow::Owned(month_decade_fill(prefix, side)?),
        (6, Side::Left) => Cow::Borrowed(MONTH_LEFT_FILL),
        (6, Side::Right) => {
            let last_day = month_length(prefix)?;
            Cow::Owned(format!("{:02}000000", last_day))
        }
        (7, _) => Cow::Owned(day_decade_fill(prefix, side)?),
        _ => Cow::Borrowed(&ZEROS[..TIMESTAMP_LEN - len]),
    };

    Ok(fill)
}

/// Filler for `YYYY` + tens digit of the month
fn month_decade_fill(prefix: &str, side: Side) -> Result<String> {
    let year = digits(&prefix[0..4]) as i32;
    let decade = digits(&prefix[4..5]);

    let first_month = (decade * 10).max(1);
    if first_month > 12 {
        return Err(Error::invalid_prefix(format!("No month starts with digit {} in {:?}", decade, prefix)));
    }

    match side {
        Side::Left => Ok(format!("{}{}", first_month % 10, MONTH_LEFT_FILL)),
        Side::Right => {
            let last_month = (decade * 10 + 9).min(12);
            let last_day = days_in_month(year, last_month)
                .ok_or_else(|| Error::invalid_prefix(format!("Invalid month in {:?}", prefix)))?;
            Ok(format!("{}{:02}000000", last_month % 10, last_day))
        }
    }
}

/// Filler for `YYYYMM` + tens digit of the day
fn day_decade_fill(prefix: &str, side: Side) -> Result<String> {
    let month_days = month_length(prefix)?;
    let decade = digits(&prefix[6..7]);

    let first_day = (decade * 10).max(1);
    if first_day > month_days {
        return Err(Error::invalid_prefix(format!(
            "No day of a {}-day month starts with digit {} in {:?}", month_days, decade, prefix
        )));
    }

    let day = match side {
        Side::Left => first_day,
        Side::Right => (decade * 10 + 9).min(month_days),
    };

    Ok(format!("{}000000", day % 10))
}

/// Days in the month named by the first six digits of `prefix`
fn month_length(prefix: &str) -> Result<u32> {
    let year = digits(&prefix[0..4]) as i32;
    let month = digits(&prefix[4..6]);

    days_in_month(year, month)
        .ok_or_else(|| Error::invalid_prefix(format!("Invalid month {:02} in {:?}", month, prefix)))
}

/// Callers have already checked that `s` is all digits.
fn digits(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}
