//! Range query planning
//!
//! Validates the caller's start and end strings, widens partial input to the
//! earliest instant it can represent, and produces the ordered prefix list that
//! covers the range.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::millennium::plan_across_eras;
use crate::timestamp::{left_margin, Instant, TIMESTAMP_LEN};

/// Prefix queries covering a validated range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Start of the range (inclusive)
    pub begin: Instant,
    /// End of the range (inclusive)
    pub end: Instant,
    /// Prefix queries, in the order they should be issued
    pub prefixes: Vec<String>,
}

impl QueryPlan {
    /// Number of lookups the plan will issue
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether the plan issues no lookups
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Iterate over the prefixes in issue order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

/// Plan the prefix queries for the range `[start, end]`.
///
/// Both inputs are 1 to 14 digits of `YYYYMMDDhhmmss`. Partial input, end
/// included, is read as the earliest instant it can represent: `197012` as an
/// end means December 1st 1970.
pub fn plan(start: &str, end: &str) -> Result<QueryPlan> {
    check_shape(start, "start")?;
    check_shape(end, "end")?;

    let begin = normalize(start, "start")?;
    let end_instant = normalize(end, "end")?;

    if begin > end_instant {
        return Err(Error::invalid_range(begin.canonical(), end_instant.canonical()));
    }

    let prefixes = plan_across_eras(begin, end_instant);
    info!(begin = %begin, end = %end_instant, prefixes = prefixes.len(), "Planned range query");

    Ok(QueryPlan {
        begin,
        end: end_instant,
        prefixes,
    })
}

/// Widen a 1 to 14 digit input to the earliest instant it can represent
pub fn normalize(input: &str, field: &str) -> Result<Instant> {
    check_shape(input, field)?;

    left_margin(input).map_err(|_| {
        Error::malformed_input(format!(
            "Invalid {} date {:?}. Please specify a valid {} date.", field, input, field
        ))
    })
}

fn check_shape(input: &str, field: &str) -> Result<()> {
    if input.is_empty() {
        return Err(Error::malformed_input(format!("The {} date is empty", field)));
    }

    if input.len() > TIMESTAMP_LEN {
        return Err(Error::malformed_input(format!(
            "The {} date {:?} is longer than {} characters", field, input, TIMESTAMP_LEN
        )));
    }

    Ok(())
}
