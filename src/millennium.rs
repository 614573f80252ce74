//! Millennium splitting
//!
//! Partial-year margins are computed inside a single four-digit era, so a range
//! that crosses a year divisible by 1000 is cut at each such boundary before
//! decomposition.

use tracing::debug;

use crate::decompose::decompose;
use crate::timestamp::Instant;

/// Number of years in one era
const ERA_YEARS: i32 = 1000;

/// First instant of the era following the one `instant` falls in
pub fn next_era_start(instant: Instant) -> Option<Instant> {
    Instant::start_of_year((instant.year() / ERA_YEARS + 1) * ERA_YEARS)
}

/// Decompose `[begin, end]` era by era and concatenate the prefixes
pub fn plan_across_eras(begin: Instant, end: Instant) -> Vec<String> {
    let boundary = match next_era_start(begin) {
        Some(boundary) if boundary < end => boundary,
        _ => return decompose(begin, end),
    };

    debug!(begin = %begin, end = %end, boundary = %boundary, "Range crosses a millennium");

    let mut prefixes = Vec::new();
    if let Some(last) = boundary.checked_add_seconds(-1) {
        prefixes.extend(decompose(begin, last));
    }

    let mut current = boundary;
    while (current.year() + ERA_YEARS) / ERA_YEARS <= end.year() / ERA_YEARS {
        let Some(next) = Instant::start_of_year(current.year() + ERA_YEARS) else {
            break;
        };
        let Some(last) = next.checked_add_seconds(-1) else {
            break;
        };

        prefixes.extend(decompose(current, last));
        current = next;
    }

    prefixes.extend(decompose(current, end));
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> Instant {
        Instant::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn test_next_era_start() {
        assert_eq!(next_era_start(day(1970, 6, 1)), Some(day(2000, 1, 1)));
        assert_eq!(next_era_start(day(2000, 1, 1)), Some(day(3000, 1, 1)));
        assert_eq!(next_era_start(day(999, 12, 31)), Some(day(1000, 1, 1)));
        assert_eq!(next_era_start(day(9500, 1, 1)), None);
    }

    #[test]
    fn test_single_era_delegates() {
        let begin = day(2019, 11, 1);
        let end = day(2019, 11, 29);
        assert_eq!(plan_across_eras(begin, end), decompose(begin, end));
    }

    #[test]
    fn test_two_eras() {
        assert_eq!(
            plan_across_eras(day(1970, 1, 1), day(2005, 12, 25)),
            vec![
                "197", "198", "199", "2000", "2001", "2002", "2003", "2004", "20050", "200510",
                "200511", "2005120", "2005121", "20051220", "20051221", "20051222", "20051223",
                "20051224", "20051225",
            ]
        );
    }

    #[test]
    fn test_full_intervening_eras() {
        let prefixes = plan_across_eras(day(1969, 2, 25), day(4000, 2, 25));
        assert_eq!(prefixes.len(), 26);
        assert!(prefixes.contains(&"2".to_string()));
        assert!(prefixes.contains(&"3".to_string()));
        assert_eq!(prefixes.last().map(String::as_str), Some("40000225"));
    }

    #[test]
    fn test_end_on_boundary_is_not_split() {
        let begin = day(1990, 1, 1);
        let end = day(2000, 1, 1);
        assert_eq!(plan_across_eras(begin, end), vec!["199", "20000101"]);
    }

    #[test]
    fn test_last_era() {
        let prefixes = plan_across_eras(day(8999, 12, 31), day(9999, 12, 31));
        assert_eq!(prefixes, vec!["89991231", "9"]);
    }

    #[test]
    fn test_mid_day_begin_before_boundary() {
        let begin = Instant::from_ymd_hms(1999, 12, 31, 12, 0, 0).unwrap();

        let mut expected = vec!["199912312".to_string()];
        expected.extend((12..=19).map(|hour| format!("19991231{}", hour)));
        expected.extend(["20000101".to_string(), "20000102".to_string()]);
        assert_eq!(plan_across_eras(begin, day(2000, 1, 2)), expected);
    }
}
