//! # cocoon_range
//!
//! Timestamp range queries against stores whose only query primitive is
//! "fetch every record whose `YYYYMMDDhhmmss` key starts with this prefix".
//!
//! A range `[start, end]` is translated into a short list of prefixes that
//! together match exactly the days inside the range, and the records fetched
//! for each prefix are merged and sorted.
//!
//! ```no_run
//! use cocoon_range::{documents_in_range, MemoryStore};
//!
//! let store = MemoryStore::reference();
//! let outcome = documents_in_range(&store, "19690225", "19700225")?;
//! assert_eq!(outcome.call_count, 21);
//! assert_eq!(outcome.records.len(), 366);
//! # Ok::<(), cocoon_range::Error>(())
//! ```

pub mod config;
pub mod decompose;
pub mod error;
pub mod metrics;
pub mod millennium;
pub mod planner;
pub mod query;
pub mod store;
pub mod timestamp;

pub use config::{QueryConfig, SortOrder};
pub use decompose::{decompose, Interval};
pub use error::{Error, Result};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use millennium::plan_across_eras;
pub use planner::{plan, QueryPlan};
pub use query::{documents_in_range, execute, execute_parallel, QueryOutcome, RangeQuery};
pub use store::{MemoryStore, PrefixLookup, Record};
pub use timestamp::{left_margin, margins, right_margin, slot_end, Instant, MarginPair};
