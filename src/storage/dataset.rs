//! The in-memory dataset keyed by record id

use crate::record::Record;
use std::collections::HashMap;

/// Counts of what a merge did to the dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records whose id was not present before the merge
    pub inserted: usize,

    /// Records that replaced an existing entry with the same id
    pub replaced: usize,
}

/// The persisted collection of records, keyed by id
///
/// Iteration order is incidental; row order in the snapshot carries no
/// meaning. The dataset is the only state that outlives a single cycle.
#[derive(Debug, Default)]
pub struct Dataset {
    records: HashMap<String, Record>,
}

impl Dataset {
    /// Creates an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the dataset
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Iterates over all records in no particular order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Inserts one record, replacing any existing entry with the same id
    ///
    /// Returns the replaced record, if any.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.id.clone(), record)
    }

    /// Merges a batch of records with last-write-wins conflict resolution
    ///
    /// Each incoming record is inserted or unconditionally replaces the
    /// existing entry with its id; the batch is always considered more
    /// recent than anything already stored. When two records in the same
    /// batch share an id, the one later in fetch order wins.
    pub fn merge(&mut self, batch: Vec<Record>) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in batch {
            match self.insert(record) {
                Some(_) => stats.replaced += 1,
                None => stats.inserted += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, like_count: u64) -> Record {
        Record {
            id: id.to_string(),
            code: format!("code-{}", id),
            timestamp: 1_700_000_000,
            owner_id: "owner".to_string(),
            like_count,
            comment_count: 0,
            media_url: String::new(),
            caption: "a caption".to_string(),
        }
    }

    #[test]
    fn test_merge_inserts_new_records() {
        let mut dataset = Dataset::new();
        let stats = dataset.merge(vec![record("a", 1), record("b", 2)]);

        assert_eq!(stats, MergeStats { inserted: 2, replaced: 0 });
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut dataset = Dataset::new();
        dataset.merge(vec![record("a", 1), record("b", 2)]);
        let stats = dataset.merge(vec![record("a", 1), record("b", 2)]);

        assert_eq!(stats, MergeStats { inserted: 0, replaced: 2 });
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get("a").unwrap().like_count, 1);
    }

    #[test]
    fn test_last_write_wins_across_merges() {
        let mut dataset = Dataset::new();
        dataset.merge(vec![record("a", 1)]);
        dataset.merge(vec![record("a", 99)]);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get("a").unwrap().like_count, 99);
    }

    #[test]
    fn test_last_write_wins_within_one_batch() {
        let mut dataset = Dataset::new();
        let stats = dataset.merge(vec![record("a", 1), record("a", 2), record("a", 3)]);

        assert_eq!(stats, MergeStats { inserted: 1, replaced: 2 });
        assert_eq!(dataset.get("a").unwrap().like_count, 3);
    }

    #[test]
    fn test_merge_empty_batch() {
        let mut dataset = Dataset::new();
        dataset.merge(vec![record("a", 1)]);
        let stats = dataset.merge(vec![]);

        assert_eq!(stats, MergeStats::default());
        assert_eq!(dataset.len(), 1);
    }
}
