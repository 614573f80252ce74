use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use parking_lot::Mutex;
use serde::Serialize;

/// Counters for planning and lookup activity
#[derive(Debug)]
pub struct MetricsCollector {
    // Operation counts
    /// Number of plans built
    plan_count: AtomicUsize,
    /// Number of queries executed
    query_count: AtomicUsize,
    /// Number of prefixes produced across all plans
    prefixes_planned: AtomicUsize,
    /// Number of lookups issued against a store
    lookup_count: AtomicUsize,
    /// Number of records returned by lookups
    records_returned: AtomicUsize,

    // Timing metrics
    /// Total planning duration in nanoseconds
    planning_duration_ns: AtomicU64,
    /// Total lookup duration in nanoseconds
    lookup_duration_ns: AtomicU64,
    /// Duration of the most recent query
    last_query_duration: Mutex<Duration>,
}

/// Point-in-time copy of the collected metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plan_count: usize,
    pub query_count: usize,
    pub prefixes_planned: usize,
    pub lookup_count: usize,
    pub records_returned: usize,
    pub planning_duration_ns: u64,
    pub lookup_duration_ns: u64,
    pub last_query_duration_ms: u64,
}

impl MetricsSnapshot {
    /// Average number of lookups per executed query
    pub fn avg_lookups_per_query(&self) -> f64 {
        if self.query_count == 0 {
            0.0
        } else {
            self.lookup_count as f64 / self.query_count as f64
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            plan_count: AtomicUsize::new(0),
            query_count: AtomicUsize::new(0),
            prefixes_planned: AtomicUsize::new(0),
            lookup_count: AtomicUsize::new(0),
            records_returned: AtomicUsize::new(0),

            planning_duration_ns: AtomicU64::new(0),
            lookup_duration_ns: AtomicU64::new(0),
            last_query_duration: Mutex::new(Duration::from_secs(0)),
        }
    }

    /// Record a finished plan
    pub fn record_plan(&self, prefixes: usize, duration: Duration) {
        self.plan_count.fetch_add(1, Ordering::Relaxed);
        self.prefixes_planned.fetch_add(prefixes, Ordering::Relaxed);
        self.planning_duration_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record the lookups of one executed plan
    pub fn record_lookups(&self, lookups: usize, records: usize, duration: Duration) {
        self.lookup_count.fetch_add(lookups, Ordering::Relaxed);
        self.records_returned.fetch_add(records, Ordering::Relaxed);
        self.lookup_duration_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a finished query end to end
    pub fn record_query(&self, duration: Duration) {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        *self.last_query_duration.lock() = duration;
    }

    /// Take a snapshot of the current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plan_count: self.plan_count.load(Ordering::Relaxed),
            query_count: self.query_count.load(Ordering::Relaxed),
            prefixes_planned: self.prefixes_planned.load(Ordering::Relaxed),
            lookup_count: self.lookup_count.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            planning_duration_ns: self.planning_duration_ns.load(Ordering::Relaxed),
            lookup_duration_ns: self.lookup_duration_ns.load(Ordering::Relaxed),
            last_query_duration_ms: self.last_query_duration.lock().as_millis() as u64,
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.plan_count.store(0, Ordering::Relaxed);
        self.query_count.store(0, Ordering::Relaxed);
        self.prefixes_planned.store(0, Ordering::Relaxed);
        self.lookup_count.store(0, Ordering::Relaxed);
        self.records_returned.store(0, Ordering::Relaxed);
        self.planning_duration_ns.store(0, Ordering::Relaxed);
        self.lookup_duration_ns.store(0, Ordering::Relaxed);
        *self.last_query_duration.lock() = Duration::from_secs(0);
    }
}
