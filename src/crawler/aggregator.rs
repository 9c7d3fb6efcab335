//! Record aggregation and deduplication

use crate::record::{IdentityKey, Record};
use std::collections::HashSet;

/// Running, deduplicated record set
///
/// Records are kept in first-arrival order; a record whose identity key was
/// already seen is dropped.
#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<IdentityKey>,
    records: Vec<Record>,
    received: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record; returns false if it duplicates an earlier one
    pub fn push(&mut self, record: Record) -> bool {
        self.received += 1;
        if !self.seen.insert(record.identity_key()) {
            tracing::trace!("Dropping duplicate record {} ({})", record.name, record.source_url);
            return false;
        }
        self.records.push(record);
        true
    }

    /// Adds records in order; returns how many were new
    pub fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) -> usize {
        let mut added = 0;
        for record in records {
            if self.push(record) {
                added += 1;
            }
        }
        added
    }

    /// Number of records offered, duplicates included
    pub fn received(&self) -> usize {
        self.received
    }

    /// Number of unique records kept
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the aggregator, returning the unique records in arrival order
    pub fn finish(self) -> Vec<Record> {
        self.records
    }
}

/// Deduplicates records by identity key, keeping first occurrences in order
pub fn aggregate<I: IntoIterator<Item = Record>>(records: I) -> Vec<Record> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;

    fn record(name: &str, url: &str) -> Record {
        Record::new(name, url, Level::City).unwrap()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let a = record("Alpha", "https://example.com/usa/a");
        let b = record("Beta", "https://example.com/usa/b");
        let a2 = record("ALPHA", "https://example.com/usa/a/")
            .with_address(Some("other".to_string()));
        let c = record("Gamma", "https://example.com/usa/c");

        let result = aggregate(vec![a.clone(), b.clone(), a2, c.clone()]);

        assert_eq!(result, vec![a, b, c]);
    }

    #[test]
    fn test_output_size_equals_distinct_keys() {
        let input = vec![
            record("A", "https://example.com/1"),
            record("A", "https://example.com/1?ref=x"),
            record("A", "https://example.com/2"),
            record("a", "https://EXAMPLE.com/2/"),
            record("B", "https://example.com/1"),
            record("B", "https://example.com/1#frag"),
        ];

        let distinct: HashSet<_> = input.iter().map(Record::identity_key).collect();
        let result = aggregate(input);

        assert_eq!(result.len(), distinct.len());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_no_duplicate_keys_in_output() {
        let input: Vec<Record> = (0..50)
            .map(|i| record(&format!("Site {}", i % 7), &format!("https://example.com/{}", i % 5)))
            .collect();

        let result = aggregate(input);
        let keys: HashSet<_> = result.iter().map(Record::identity_key).collect();

        assert_eq!(keys.len(), result.len());
    }

    #[test]
    fn test_counts() {
        let mut aggregator = Aggregator::new();
        assert!(aggregator.is_empty());

        assert!(aggregator.push(record("A", "https://example.com/a")));
        assert!(!aggregator.push(record("a", "https://example.com/a/")));
        let added = aggregator.extend(vec![
            record("B", "https://example.com/b"),
            record("A", "https://example.com/a"),
        ]);

        assert_eq!(added, 1);
        assert_eq!(aggregator.received(), 4);
        assert_eq!(aggregator.len(), 2);
        assert_eq!(aggregator.finish()[1].name, "B");
    }
}
