use std::sync::Arc;
use std::time::Instant as Clock;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, trace};

use crate::config::{QueryConfig, SortOrder};
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::planner::{self, QueryPlan};
use crate::store::{PrefixLookup, Record};

/// Records matched by a plan and the number of lookups it took
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    /// Matched records, sorted by timestamp
    pub records: Vec<Record>,
    /// Number of lookups issued, one per prefix
    pub call_count: u64,
}

impl QueryOutcome {
    /// Number of matched records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Issue one lookup per prefix, in plan order, and return the sorted union
pub fn execute<L: PrefixLookup + ?Sized>(plan: &QueryPlan, lookup: &L) -> QueryOutcome {
    let (records, call_count) = fetch_sequential(plan, lookup);
    finish(records, call_count, SortOrder::Ascending)
}

/// Like [`execute`], with the lookups spread over the rayon thread pool.
///
/// The call count and the returned records are the same as the sequential run.
pub fn execute_parallel<L: PrefixLookup + Sync + ?Sized>(plan: &QueryPlan, lookup: &L) -> QueryOutcome {
    let (records, call_count) = fetch_parallel(plan, lookup);
    finish(records, call_count, SortOrder::Ascending)
}

/// Plan and execute `[start, end]` against `lookup` with default settings
pub fn documents_in_range<L: PrefixLookup + ?Sized>(lookup: &L, start: &str, end: &str) -> Result<QueryOutcome> {
    let plan = planner::plan(start, end)?;
    Ok(execute(&plan, lookup))
}

fn fetch_sequential<L: PrefixLookup + ?Sized>(plan: &QueryPlan, lookup: &L) -> (Vec<Record>, u64) {
    let mut records = Vec::new();
    let mut call_count = 0u64;

    for prefix in plan.iter() {
        let batch = lookup.fetch(prefix);
        trace!(prefix = %prefix, records = batch.len(), "Lookup");
        records.extend(batch);
        call_count += 1;
    }

    (records, call_count)
}

fn fetch_parallel<L: PrefixLookup + Sync + ?Sized>(plan: &QueryPlan, lookup: &L) -> (Vec<Record>, u64) {
    let batches: Vec<Vec<Record>> = plan
        .prefixes
        .par_iter()
        .map(|prefix| {
            let batch = lookup.fetch(prefix);
            trace!(prefix = %prefix, records = batch.len(), "Lookup");
            batch
        })
        .collect();

    let call_count = batches.len() as u64;
    (batches.into_iter().flatten().collect(), call_count)
}

fn finish(mut records: Vec<Record>, call_count: u64, order: SortOrder) -> QueryOutcome {
    // Stable sorts keep store order between equal timestamps
    match order {
        SortOrder::Ascending => records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortOrder::Descending => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }

    QueryOutcome { records, call_count }
}

/// Plans and runs range queries with a fixed configuration
#[derive(Debug, Clone)]
pub struct RangeQuery {
    config: QueryConfig,
    metrics: Arc<MetricsCollector>,
}

impl Default for RangeQuery {
    fn default() -> Self {
        Self {
            config: QueryConfig::default(),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }
}

impl RangeQuery {
    /// Create a range query runner, validating the configuration
    pub fn new(config: QueryConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Shared metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Plan the prefix queries for `[start, end]`
    pub fn plan(&self, start: &str, end: &str) -> Result<QueryPlan> {
        let started = Clock::now();
        let plan = planner::plan(start, end)?;

        if self.config.collect_metrics {
            self.metrics.record_plan(plan.len(), started.elapsed());
        }

        Ok(plan)
    }

    /// Execute a plan against `lookup`
    pub fn execute<L: PrefixLookup + Sync + ?Sized>(&self, plan: &QueryPlan, lookup: &L) -> QueryOutcome {
        let started = Clock::now();

        let (records, call_count) = if self.config.parallel_lookups && plan.len() > 1 {
            fetch_parallel(plan, lookup)
        } else {
            fetch_sequential(plan, lookup)
        };

        if self.config.collect_metrics {
            self.metrics
                .record_lookups(call_count as usize, records.len(), started.elapsed());
        }

        finish(records, call_count, self.config.sort_order)
    }

    /// Plan and execute `[start, end]` against `lookup`
    pub fn run<L: PrefixLookup + Sync + ?Sized>(&self, lookup: &L, start: &str, end: &str) -> Result<QueryOutcome> {
        let started = Clock::now();

        let plan = self.plan(start, end)?;
        let outcome = self.execute(&plan, lookup);

        info!(
            begin = %plan.begin,
            end = %plan.end,
            calls = outcome.call_count,
            records = outcome.len(),
            "Range query finished"
        );

        if self.config.collect_metrics {
            self.metrics.record_query(started.elapsed());
        }

        Ok(outcome)
    }

    /// Run the configured default range against `lookup`
    pub fn run_default<L: PrefixLookup + Sync + ?Sized>(&self, lookup: &L) -> Result<QueryOutcome> {
        self.run(lookup, &self.config.default_start, &self.config.default_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use crate::error::Error;
    use crate::store::MemoryStore;
    use crate::timestamp::Instant;

    /// Store wrapper remembering every prefix it was asked for
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl PrefixLookup for RecordingStore {
        fn fetch(&self, prefix: &str) -> Vec<Record> {
            self.calls.lock().push(prefix.to_string());
            self.inner.fetch(prefix)
        }
    }

    fn day(year: i32, month: u32, day: u32) -> Instant {
        Instant::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn test_one_lookup_per_prefix_in_plan_order() -> Result<()> {
        let store = RecordingStore::new(MemoryStore::daily(day(2019, 1, 1), day(2019, 2, 28)));
        let plan = planner::plan("20190112", "20190130")?;

        let outcome = execute(&plan, &store);

        assert_eq!(outcome.call_count, 10);
        assert_eq!(*store.calls.lock(), plan.prefixes);
        assert_eq!(outcome.len(), 19);
        Ok(())
    }

    #[test]
    fn test_records_are_sorted() -> Result<()> {
        let store = MemoryStore::daily(day(2019, 1, 1), day(2019, 2, 28));
        let plan = planner::plan("20190112", "20190130")?;

        // The plan fetches the 20s before the teens
        assert_eq!(plan.prefixes[0], "2019012");

        let outcome = execute(&plan, &store);
        let keys: Vec<String> = outcome.records.iter().map(Record::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first().map(String::as_str), Some("20190112000000"));
        assert_eq!(keys.last().map(String::as_str), Some("20190130000000"));
        Ok(())
    }

    #[test]
    fn test_parallel_matches_sequential() -> Result<()> {
        let store = MemoryStore::reference();
        let plan = planner::plan("197002", "20190430")?;

        let sequential = execute(&plan, &store);
        let parallel = execute_parallel(&plan, &store);

        assert_eq!(sequential.call_count, 34);
        assert_eq!(parallel.call_count, sequential.call_count);
        assert_eq!(parallel.records, sequential.records);
        Ok(())
    }

    #[test]
    fn test_empty_store() -> Result<()> {
        let store = MemoryStore::new();
        let outcome = documents_in_range(&store, "2019", "2020")?;
        assert!(outcome.is_empty());
        assert!(outcome.call_count > 0);
        Ok(())
    }

    #[test]
    fn test_range_query_descending() -> Result<()> {
        let store = MemoryStore::daily(day(2019, 11, 1), day(2019, 11, 30));
        let query = RangeQuery::new(QueryConfig::new().with_sort_order(SortOrder::Descending))?;

        let outcome = query.run(&store, "20191101", "20191129")?;
        assert_eq!(outcome.call_count, 3);
        assert_eq!(outcome.len(), 29);
        assert_eq!(outcome.records[0].key(), "20191129000000");
        assert_eq!(outcome.records[28].key(), "20191101000000");
        Ok(())
    }

    #[test_log::test]
    fn test_range_query_metrics() -> Result<()> {
        let store = MemoryStore::reference();
        let query = RangeQuery::new(QueryConfig::new().with_parallel_lookups(true))?;

        let outcome = query.run(&store, "19690225000000", "19700225000000")?;
        assert_eq!(outcome.call_count, 21);
        assert_eq!(outcome.len(), 366);

        let snapshot = query.metrics().snapshot();
        assert_eq!(snapshot.plan_count, 1);
        assert_eq!(snapshot.query_count, 1);
        assert_eq!(snapshot.prefixes_planned, 21);
        assert_eq!(snapshot.lookup_count, 21);
        assert_eq!(snapshot.records_returned, 366);
        Ok(())
    }

    #[test]
    fn test_metrics_disabled() -> Result<()> {
        let store = MemoryStore::reference();
        let query = RangeQuery::new(QueryConfig::new().with_collect_metrics(false))?;

        query.run(&store, "2019", "2019")?;
        assert_eq!(query.metrics().snapshot().lookup_count, 0);
        Ok(())
    }

    #[test]
    fn test_run_default_range() -> Result<()> {
        let store = MemoryStore::reference();
        let query = RangeQuery::default();

        let outcome = query.run_default(&store)?;
        assert_eq!(outcome.call_count, 37);
        assert_eq!(outcome.len(), 17962);
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = RangeQuery::new(QueryConfig::new().with_sample_size(0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_errors_propagate() {
        let store = MemoryStore::reference();
        let query = RangeQuery::default();

        assert!(matches!(
            query.run(&store, "20200430000000", "20190430000000"),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(query.run(&store, "", "2019"), Err(Error::MalformedInput(_))));
        assert_eq!(query.metrics().snapshot().query_count, 0);
    }
}
