//! Frequency aggregation across a full streaming pass
//!
//! [`FrequencyCounter`] is the in-progress multiset a pass writes into. It
//! has no ranking API: only [`FrequencyCounter::finish`], called once the
//! pass has consumed every batch, yields a [`FrequencyTable`] that can rank
//! keys. Top-N selection can therefore never see partial counts.

use crate::graph::{KeySet, RecordKey};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tally {
    count: u64,
    first_seen: u64,
}

/// Running multiset of key occurrences for one pass.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    tallies: HashMap<RecordKey, Tally>,
    next_seen: u64,
    observations: u64,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence, ordering first sightings by call order.
    pub fn record(&mut self, key: RecordKey) {
        let seen = self.next_seen;
        self.record_at(key, seen);
        self.next_seen += 1;
    }

    /// Count one occurrence seen at a known position of the underlying
    /// table (a row ordinal).
    ///
    /// Positions make first-seen order independent of how the table was
    /// split into batches or workers.
    pub fn record_at(&mut self, key: RecordKey, position: u64) {
        self.observations += 1;
        self.next_seen = self.next_seen.max(position + 1);
        self.tallies
            .entry(key)
            .and_modify(|t| {
                t.count += 1;
                t.first_seen = t.first_seen.min(position);
            })
            .or_insert(Tally {
                count: 1,
                first_seen: position,
            });
    }

    /// Merge a batch's matching keys into the multiset.
    pub fn update<I: IntoIterator<Item = RecordKey>>(&mut self, keys: I) {
        for key in keys {
            self.record(key);
        }
    }

    /// Fold another partial counter for the same pass into this one.
    pub fn merge(&mut self, other: FrequencyCounter) {
        self.observations += other.observations;
        self.next_seen = self.next_seen.max(other.next_seen);
        for (key, theirs) in other.tallies {
            self.tallies
                .entry(key)
                .and_modify(|t| {
                    t.count += theirs.count;
                    t.first_seen = t.first_seen.min(theirs.first_seen);
                })
                .or_insert(theirs);
        }
    }

    /// Distinct keys counted so far
    pub fn distinct(&self) -> usize {
        self.tallies.len()
    }

    /// Close the pass and freeze the counts.
    pub fn finish(self) -> FrequencyTable {
        let mut ranked: Vec<(RecordKey, Tally)> = self.tallies.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        let index = ranked
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();

        FrequencyTable {
            ranked: ranked.into_iter().map(|(k, t)| (k, t.count)).collect(),
            index,
            observations: self.observations,
        }
    }
}

/// Final occurrence counts of a completed pass, ranked by count.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    ranked: Vec<(RecordKey, u64)>,
    index: HashMap<RecordKey, usize>,
    observations: u64,
}

impl FrequencyTable {
    /// Occurrences of `key`; zero for keys never seen
    pub fn count(&self, key: &RecordKey) -> u64 {
        self.index.get(key).map(|&i| self.ranked[i].1).unwrap_or(0)
    }

    /// The `n` most frequent keys, highest count first, ties broken by
    /// first sighting in the table.
    pub fn top_n(&self, n: usize) -> Vec<RecordKey> {
        self.ranked.iter().take(n).map(|(k, _)| k.clone()).collect()
    }

    /// The `n` most frequent keys as a set
    pub fn top_n_set(&self, n: usize) -> KeySet {
        self.top_n(n).into_iter().collect()
    }

    /// Keys with their counts in rank order
    pub fn ranked(&self) -> &[(RecordKey, u64)] {
        &self.ranked
    }

    /// Distinct keys counted
    pub fn distinct(&self) -> usize {
        self.ranked.len()
    }

    /// Total occurrences counted
    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> RecordKey {
        RecordKey::from(s)
    }

    #[test]
    fn counts_accumulate_across_updates() {
        let mut counter = FrequencyCounter::new();
        counter.update(vec![k("a"), k("b")]);
        counter.update(vec![k("a")]);
        let table = counter.finish();

        assert_eq!(table.count(&k("a")), 2);
        assert_eq!(table.count(&k("b")), 1);
        assert_eq!(table.count(&k("z")), 0);
        assert_eq!(table.observations(), 3);
        assert_eq!(table.distinct(), 2);
    }

    #[test]
    fn top_n_breaks_ties_by_first_seen() {
        let mut counter = FrequencyCounter::new();
        counter.update(["x", "y", "z", "y", "x", "w"].iter().map(|s| k(s)));
        let table = counter.finish();

        // x and y tie at 2; x appeared first. z and w tie at 1; z first.
        let top: Vec<String> = table.top_n(4).iter().map(|k| k.to_string()).collect();
        assert_eq!(top, vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn top_n_is_bounded_by_distinct_keys() {
        let mut counter = FrequencyCounter::new();
        counter.update(vec![k("a"), k("b")]);
        let table = counter.finish();
        assert_eq!(table.top_n(20).len(), 2);
        assert_eq!(table.top_n(1), vec![k("a")]);
        assert!(table.top_n(0).is_empty());
    }

    #[test]
    fn merged_partials_equal_single_counter() {
        let rows = ["p", "q", "p", "r", "q", "p", "r", "r"];

        let mut single = FrequencyCounter::new();
        for (pos, key) in rows.iter().enumerate() {
            single.record_at(k(key), pos as u64);
        }

        let mut left = FrequencyCounter::new();
        let mut right = FrequencyCounter::new();
        for (pos, key) in rows.iter().enumerate() {
            if pos < 4 {
                left.record_at(k(key), pos as u64);
            } else {
                right.record_at(k(key), pos as u64);
            }
        }
        // Merge in reverse order to show the result does not depend on it
        right.merge(left);

        assert_eq!(single.finish().ranked(), right.finish().ranked());
    }

    #[test]
    fn record_at_tracks_earliest_position() {
        let mut counter = FrequencyCounter::new();
        counter.record_at(k("late"), 10);
        counter.record_at(k("early"), 3);
        counter.record_at(k("late"), 1);
        counter.record_at(k("early"), 20);
        let table = counter.finish();
        assert_eq!(table.top_n(2), vec![k("late"), k("early")]);
    }
}
