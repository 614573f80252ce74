//! Prefix-lookup stores
//!
//! The planner only needs one primitive from a backing store: fetch every
//! record whose canonical timestamp starts with a given prefix. `MemoryStore`
//! is an in-memory implementation used for demonstrations and tests.

use std::cmp::Ordering;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp::Instant;

/// A timestamped entity owned by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record identifier
    pub id: Uuid,
    /// When the record happened
    pub timestamp: Instant,
}

impl Record {
    /// Create a new record with a fresh identifier
    pub fn new(timestamp: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
        }
    }

    /// Canonical timestamp string, the key a store matches prefixes against
    pub fn key(&self) -> String {
        self.timestamp.canonical()
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A store that can only be queried by timestamp prefix
pub trait PrefixLookup {
    /// Fetch every record whose canonical timestamp starts with `prefix`.
    ///
    /// Must return the same set for the same prefix while the data is unchanged.
    fn fetch(&self, prefix: &str) -> Vec<Record>;
}

impl<T: PrefixLookup + ?Sized> PrefixLookup for &T {
    fn fetch(&self, prefix: &str) -> Vec<Record> {
        (**self).fetch(prefix)
    }
}

/// In-memory store keeping records ordered by canonical key
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<(String, Record)>>,
}

impl MemoryStore {
    /// First day of the reference data set
    pub const REFERENCE_FIRST_DAY: (i32, u32, u32) = (1965, 1, 1);

    /// Last day of the reference data set
    pub const REFERENCE_LAST_DAY: (i32, u32, u32) = (2030, 4, 30);

    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one midnight record per day in `[from, to]`
    pub fn daily(from: Instant, to: Instant) -> Self {
        let mut entries = Vec::new();
        let mut day = Some(from);

        while let Some(current) = day.filter(|current| *current <= to) {
            let record = Record::new(current);
            entries.push((record.key(), record));
            day = current.checked_add_days(1);
        }

        Self {
            entries: RwLock::new(entries),
        }
    }

    /// The reference data set: one record per day, 1965-01-01 through 2030-04-30
    pub fn reference() -> Self {
        let (y, m, d) = Self::REFERENCE_FIRST_DAY;
        let first = Instant::from_ymd(y, m, d);
        let (y, m, d) = Self::REFERENCE_LAST_DAY;
        let last = Instant::from_ymd(y, m, d);

        match (first, last) {
            (Some(first), Some(last)) => Self::daily(first, last),
            _ => Self::new(),
        }
    }

    /// Insert a record, keeping key order
    pub fn insert(&self, record: Record) {
        let key = record.key();
        let mut entries = self.entries.write();
        let position = entries.partition_point(|(existing, _)| existing.as_str() <= key.as_str());
        entries.insert(position, (key, record));
    }

    /// Number of records in the store
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PrefixLookup for MemoryStore {
    fn fetch(&self, prefix: &str) -> Vec<Record> {
        let entries = self.entries.read();
        let start = entries.partition_point(|(key, _)| key.as_str() < prefix);

        entries[start..]
            .iter()
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> Instant {
        Instant::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn test_reference_store_size() {
        let store = MemoryStore::reference();
        // 1965-01-01 ..= 2030-04-30
        assert_eq!(store.len(), 23861);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_fetch_by_prefix() {
        let store = MemoryStore::daily(day(2019, 10, 25), day(2019, 12, 5));

        let november = store.fetch("201911");
        assert_eq!(november.len(), 30);
        assert_eq!(november[0].key(), "20191101000000");
        assert_eq!(november[29].key(), "20191130000000");

        assert_eq!(store.fetch("2019103").len(), 2);
        assert_eq!(store.fetch("20191201").len(), 1);
        assert_eq!(store.fetch("2019").len(), 42);
        assert!(store.fetch("2020").is_empty());
        assert!(store.fetch("201911011").is_empty());
    }

    #[test]
    fn test_fetch_is_ordered_and_idempotent() {
        let store = MemoryStore::daily(day(2019, 1, 1), day(2019, 3, 31));
        let first = store.fetch("20190");
        let second = store.fetch("20190");

        assert_eq!(first, second);
        assert!(first.windows(2).all(|pair| pair[0].key() < pair[1].key()));
    }

    #[test]
    fn test_insert_keeps_order() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.insert(Record::new(day(2019, 11, 3)));
        store.insert(Record::new(day(2019, 11, 1)));
        store.insert(Record::new(Instant::from_ymd_hms(2019, 11, 1, 12, 0, 0).unwrap()));

        let keys: Vec<String> = store.fetch("201911").iter().map(Record::key).collect();
        assert_eq!(keys, vec!["20191101000000", "20191101120000", "20191103000000"]);
        assert_eq!(store.fetch("2019110112").len(), 1);
    }

    #[test]
    fn test_record_ordering() {
        let early = Record::new(day(2019, 1, 1));
        let late = Record::new(day(2019, 1, 2));
        assert!(early < late);

        let json = serde_json::to_string(&early).unwrap();
        assert!(json.contains("\"20190101000000\""));
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, early);
    }
}
