//! Range-to-prefix decomposition
//!
//! Turns a closed interval `[begin, end]` into prefix queries whose matches,
//! taken together, cover every instant inside the interval exactly once.
//!
//! For each interval the search walks prefix lengths from shortest to longest.
//! At each length it keeps the leading digits of `begin` and raises the last
//! digit from its current value towards `9`, accepting the first candidate whose
//! margins fit inside the interval. The accepted block splits the interval into
//! a gap before its first instant and a gap after its last instant, which are
//! decomposed the same way. Gaps are cut at the block's own granularity, so an
//! hour block leaves sub-day gaps on both sides of it.
//!
//! When no candidate fits, `begin` sits inside a ten-second slot that starts
//! before it. That slot gets its own prefix and the rest of the interval is
//! decomposed from the next slot on.
//!
//! The first fit wins even when a later candidate would need fewer queries
//! overall. Callers rely on the exact prefix sequence this produces.

use tracing::{debug, trace};

use crate::timestamp::{margins, slot_end, Instant, TIMESTAMP_LEN};

/// A closed interval of instants still to be covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// First instant of the interval
    pub begin: Instant,
    /// Last instant of the interval
    pub end: Instant,
}

impl Interval {
    /// Create a new interval
    pub fn new(begin: Instant, end: Instant) -> Self {
        Self { begin, end }
    }

    /// An interval whose bounds cross contains nothing
    pub fn is_empty(&self) -> bool {
        self.begin > self.end
    }

    /// The part of this interval strictly before `first`
    fn before(&self, first: Instant) -> Option<Interval> {
        if first <= self.begin {
            return None;
        }
        let end = first.checked_add_seconds(-1)?;
        Some(Interval::new(self.begin, end)).filter(|gap| !gap.is_empty())
    }

    /// The part of this interval strictly after `last`
    fn after(&self, last: Instant) -> Option<Interval> {
        if last >= self.end {
            return None;
        }
        let begin = last.checked_add_seconds(1)?;
        Some(Interval::new(begin, self.end)).filter(|gap| !gap.is_empty())
    }
}

/// An accepted prefix with the first and last instants it matches
struct Block {
    prefix: String,
    first: Instant,
    last: Instant,
}

/// Decompose `[begin, end]` into an ordered list of prefix queries.
///
/// Callers guarantee `begin <= end`; an inverted interval yields no prefixes.
pub fn decompose(begin: Instant, end: Instant) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut pending = vec![Interval::new(begin, end)];

    // LIFO keeps the output in the order a recursive walk would produce:
    // block, then everything before it, then everything after it.
    while let Some(interval) = pending.pop() {
        if interval.is_empty() {
            continue;
        }

        match find_block(&interval) {
            Some(block) => {
                debug!(
                    prefix = %block.prefix,
                    begin = %interval.begin,
                    end = %interval.end,
                    "Accepted prefix block"
                );

                if let Some(gap) = interval.after(block.last) {
                    pending.push(gap);
                }
                if let Some(gap) = interval.before(block.first) {
                    pending.push(gap);
                }
                prefixes.push(block.prefix);
            }
            None => {
                let prefix = interval.begin.canonical()[..TIMESTAMP_LEN - 1].to_string();
                debug!(
                    prefix = %prefix,
                    begin = %interval.begin,
                    end = %interval.end,
                    "No aligned block, taking the enclosing ten-second slot"
                );

                match slot_end(&prefix) {
                    Ok(last) => {
                        if let Some(rest) = interval.after(last) {
                            pending.push(rest);
                        }
                    }
                    Err(err) => trace!(prefix = %prefix, error = %err, "Slot has no end"),
                }
                prefixes.push(prefix);
            }
        }
    }

    prefixes
}

/// Find the first candidate prefix whose margins lie inside `interval`
fn find_block(interval: &Interval) -> Option<Block> {
    let canonical = interval.begin.canonical();
    let digits = canonical.as_bytes();

    for len in 1..TIMESTAMP_LEN {
        let fixed = &canonical[..len - 1];

        for digit in digits[len - 1]..=b'9' {
            let mut candidate = String::with_capacity(len);
            candidate.push_str(fixed);
            candidate.push(char::from(digit));

            match margins(&candidate) {
                Ok(pair) if pair.covers(interval.begin, interval.end) => {
                    return Some(Block {
                        last: pair.slot_end(len),
                        first: pair.left,
                        prefix: candidate,
                    });
                }
                Ok(_) => {}
                Err(err) => trace!(candidate = %candidate, error = %err, "Skipping candidate"),
            }
        }
    }

    None
}
