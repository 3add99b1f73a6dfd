//! Per-column value counts used to find the mode.

use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts of distinct values, kept in first-seen order.
#[derive(Debug, Clone)]
pub struct ValueFrequencyTable<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for ValueFrequencyTable<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> ValueFrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `value`.
    pub fn observe(&mut self, value: K) {
        match self.index.get(&value) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(value.clone(), self.entries.len());
                self.entries.push((value, 1));
            }
        }
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occurrences of `value`, zero if never seen.
    pub fn count(&self, value: &K) -> usize {
        self.index
            .get(value)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Entries by descending count. The sort is stable, so equal counts keep
    /// first-seen order.
    pub fn ranked(&self) -> Vec<(&K, usize)> {
        let mut ranked: Vec<(&K, usize)> = self.entries.iter().map(|(k, c)| (k, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The most frequent value; on a tie the one seen first.
    pub fn mode(&self) -> Option<&K> {
        self.ranked().first().map(|(k, _)| *k)
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for ValueFrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for value in iter {
            table.observe(value);
        }
        table
    }
}
