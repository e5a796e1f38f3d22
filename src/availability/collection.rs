//! Bounded, append-ordered per-user record collection.

use crate::availability::record::AvailabilityRecord;
use std::collections::BTreeMap;

/// Sort direction for [`UserAvailabilityCollection::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One user's availability records.
///
/// Records are kept in insertion order (oldest first); pushing past the
/// capacity evicts the oldest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAvailabilityCollection {
    records: Vec<AvailabilityRecord>,
    capacity: usize,
}

impl UserAvailabilityCollection {
    /// Create an empty collection. A capacity of 0 is treated as 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from stored records, keeping the newest `capacity` of them.
    #[must_use]
    pub fn from_records(records: Vec<AvailabilityRecord>, capacity: usize) -> Self {
        let mut collection = Self::new(capacity);
        for record in records {
            collection.push(record);
        }
        collection
    }

    /// Append a record, returning the evicted oldest record if at capacity.
    pub fn push(&mut self, record: AvailabilityRecord) -> Option<AvailabilityRecord> {
        let evicted = if self.records.len() >= self.capacity {
            Some(self.records.remove(0))
        } else {
            None
        };
        self.records.push(record);
        evicted
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AvailabilityRecord> {
        self.records.get(index)
    }

    /// Most recently appended record.
    #[must_use]
    pub fn latest(&self) -> Option<&AvailabilityRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &AvailabilityRecord> {
        self.records.iter()
    }

    /// Reorder by availability time. In-memory only; the insertion order
    /// used for eviction is replaced by the sorted order.
    pub fn sort(&mut self, order: SortOrder) {
        sort_records(&mut self.records, order);
    }

    /// Project to a map keyed by epoch seconds. Identical timestamps keep the
    /// later record.
    #[must_use]
    pub fn by_timestamp(&self) -> BTreeMap<i64, AvailabilityRecord> {
        self.records
            .iter()
            .map(|record| (record.timestamp_key(), record.clone()))
            .collect()
    }

    /// Records in insertion order, as written to disk.
    #[must_use]
    pub fn to_vec(&self) -> Vec<AvailabilityRecord> {
        self.records.clone()
    }
}

impl<'a> IntoIterator for &'a UserAvailabilityCollection {
    type Item = &'a AvailabilityRecord;
    type IntoIter = std::slice::Iter<'a, AvailabilityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Sort a slice of records by availability time.
pub fn sort_records(records: &mut [AvailabilityRecord], order: SortOrder) {
    match order {
        SortOrder::Ascending => records.sort_by_key(|r| r.availability_time),
        SortOrder::Descending => {
            records.sort_by_key(|r| std::cmp::Reverse(r.availability_time));
        }
    }
}
