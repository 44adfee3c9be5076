//! First-in-first-out eviction.
//!
//! Maintains pure insertion order. The distinguishing feature of FIFO is
//! that access never changes eviction order: [`EvictionPolicy::on_access`]
//! is a no-op, so a hot entry is evicted exactly as readily as a cold one
//! of the same age. Re-insertion through the cache's replace path does
//! reset an entry's position (remove + insert), which is new insertion, not
//! access.

use std::hash::Hash;

use crate::ds::KeyList;
use crate::policy::EvictionPolicy;

/// Insertion-order eviction policy over a [`KeyList`].
#[derive(Debug)]
pub struct FifoPolicy<K> {
    order: KeyList<K>,
}

impl<K> Default for FifoPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FifoPolicy<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self {
            order: KeyList::new(),
        }
    }

    /// Creates an empty policy with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: KeyList::with_capacity(capacity),
        }
    }

    /// Key that would be evicted next (the oldest insertion).
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.front()
    }

    /// Snapshot of tracked keys, oldest first. Diagnostic use.
    pub fn order_keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }
}

impl<K> EvictionPolicy<K> for FifoPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        self.order.push_back(key);
    }

    fn on_access(&mut self, _key: &K) {
        // Access does not reorder a FIFO queue.
    }

    fn on_remove(&mut self, key: &K) {
        self.order.remove(key);
    }

    fn pop_victim(&mut self) -> Option<K> {
        self.order.pop_front()
    }

    fn contains(&self, key: &K) -> bool {
        self.order.contains(key)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}
