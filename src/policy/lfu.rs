//! Least-frequently-used eviction.
//!
//! Classic O(1) amortized LFU: keys grouped by access frequency with a
//! tracked minimum non-empty group and insertion-order tie-breaking inside
//! a group. The insert counts as the first access (frequency 1), so a
//! freshly inserted entry is never the immediate top eviction candidate
//! ahead of an older entry with the same count. Changing that silently
//! alters eviction order, so it is pinned by tests.

use std::hash::Hash;

use crate::ds::FrequencyBuckets;
use crate::policy::EvictionPolicy;

/// Frequency-order eviction policy over [`FrequencyBuckets`].
#[derive(Debug)]
pub struct LfuPolicy<K> {
    buckets: FrequencyBuckets<K>,
}

impl<K> Default for LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self {
            buckets: FrequencyBuckets::new(),
        }
    }

    /// Creates an empty policy with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
        }
    }

    /// Key that would be evicted next: oldest of the least-frequent group.
    pub fn peek_victim(&self) -> Option<&K> {
        self.buckets.peek_min()
    }

    /// Current access frequency of `key`, if tracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Snapshot of tracked keys in no particular order. Diagnostic use.
    pub fn tracked_keys(&self) -> Vec<K> {
        self.buckets.keys().cloned().collect()
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        self.buckets.insert(key);
    }

    fn on_access(&mut self, key: &K) {
        self.buckets.touch(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.buckets.remove(key);
    }

    fn pop_victim(&mut self) -> Option<K> {
        self.buckets.pop_min()
    }

    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_frequent_first() {
        let mut policy = LfuPolicy::new();
        policy.on_insert("a");
        policy.on_insert("b");
        policy.on_access(&"a");
        policy.on_access(&"a");

        assert_eq!(policy.frequency(&"a"), Some(3));
        assert_eq!(policy.frequency(&"b"), Some(1));
        assert_eq!(policy.pop_victim(), Some("b"));
        assert_eq!(policy.pop_victim(), Some("a"));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut policy = LfuPolicy::new();
        policy.on_insert("old");
        policy.on_insert("mid");
        policy.on_insert("new");

        assert_eq!(policy.peek_victim(), Some(&"old"));
        assert_eq!(policy.pop_victim(), Some("old"));
        assert_eq!(policy.pop_victim(), Some("mid"));
        assert_eq!(policy.pop_victim(), Some("new"));
    }

    #[test]
    fn insert_counts_as_first_access() {
        let mut policy = LfuPolicy::new();
        policy.on_insert("seasoned");
        policy.on_insert("fresh");

        // Both hold frequency 1; the fresh entry is not preferred as victim.
        assert_eq!(policy.frequency(&"fresh"), Some(1));
        assert_eq!(policy.pop_victim(), Some("seasoned"));
    }

    #[test]
    fn remove_then_reinsert_resets_frequency() {
        let mut policy = LfuPolicy::new();
        policy.on_insert("a");
        policy.on_access(&"a");
        policy.on_remove(&"a");
        policy.on_insert("a");

        assert_eq!(policy.frequency(&"a"), Some(1));
    }
}
