//! Least-recently-used eviction.
//!
//! Maintains access-recency order over the same doubly-linked-list-plus-
//! index structure FIFO uses, with one extra mutation trigger: every access
//! moves the key to the most-recent end, so the front of the list is always
//! the least recently used key. Recency ordering approximates working-set
//! locality; the move is O(1) through the key index.

use std::hash::Hash;

use crate::ds::KeyList;
use crate::policy::EvictionPolicy;

/// Recency-order eviction policy over a [`KeyList`].
///
/// Front of the list = least recently used = next victim.
#[derive(Debug)]
pub struct LruPolicy<K> {
    order: KeyList<K>,
}

impl<K> Default for LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LruPolicy<K>
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

    /// Key that would be evicted next (the least recently used).
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.front()
    }

    /// Snapshot of tracked keys, least recent first. Diagnostic use.
    pub fn order_keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        self.order.push_back(key);
    }

    fn on_access(&mut self, key: &K) {
        self.order.move_to_back(key);
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
