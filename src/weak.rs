//! Weak-reference cache store.
//!
//! An alternate store where the cache records `key → Weak<V>` and the
//! value's lifetime belongs to whatever strong `Arc` owners exist in the
//! wider program. When the last strong owner drops, the value is freed
//! immediately (reference counting stands in for a collector: reclamation
//! is eager rather than GC-scheduled) and the weak slot starts resolving
//! to absent.
//!
//! There is no capacity bound and no eviction policy here: reclamation is
//! entirely delegated to ownership, which is why this is a structurally
//! distinct store rather than a policy plugged into the bounded engine.
//! Dead slots are dropped lazily when a lookup finds them (the same shape
//! as TTL lazy expiration), swept in bulk by [`WeakCache::purge`], or
//! swept periodically when built with [`WeakCache::with_purge_period`].

use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::sched::{self, TaskHandle};

/// Thread-safe `key → Weak<V>` store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use boundcache::weak::WeakCache;
///
/// let cache: WeakCache<u64, String> = WeakCache::new();
///
/// let owner = Arc::new("alive".to_string());
/// cache.insert(1, &owner);
/// assert_eq!(cache.get(&1).as_deref(), Some(&"alive".to_string()));
///
/// drop(owner);
/// // The only strong owner is gone; the slot now reads as absent.
/// assert_eq!(cache.get(&1), None);
/// ```
pub struct WeakCache<K, V> {
    inner: Arc<RwLock<FxHashMap<K, Weak<V>>>>,
    purger: Option<TaskHandle>,
}

impl<K, V> Clone for WeakCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            purger: self.purger.clone(),
        }
    }
}

impl<K, V> WeakCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a store with lazy purging only.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(FxHashMap::default())),
            purger: None,
        }
    }

    /// Records `key → value` without taking ownership: only a weak handle
    /// is stored, and the caller's `Arc` keeps the value alive for as long
    /// as the caller needs it. Returns the previously stored value if it
    /// was still alive.
    pub fn insert(&self, key: K, value: &Arc<V>) -> Option<Arc<V>> {
        let mut map = self.inner.write();
        map.insert(key, Arc::downgrade(value))
            .and_then(|old| old.upgrade())
    }

    /// Resolves the weak handle for `key`. A dead handle behaves as a miss
    /// and the stale mapping is dropped on the spot.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        {
            let map = self.inner.read();
            match map.get(key) {
                None => return None,
                Some(slot) => {
                    if let Some(value) = slot.upgrade() {
                        return Some(value);
                    }
                }
            }
        }
        // Slot found dead under the read lock; re-check under the write
        // lock in case another thread re-inserted a live value meanwhile.
        let mut map = self.inner.write();
        match map.get(key).and_then(Weak::upgrade) {
            Some(value) => Some(value),
            None => {
                map.remove(key);
                None
            }
        }
    }

    /// Returns `true` if `key` currently resolves to a live value.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Drops the mapping for `key`, returning the value if still alive.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let mut map = self.inner.write();
        map.remove(key).and_then(|slot| slot.upgrade())
    }

    /// Sweeps every dead slot; returns how many were dropped.
    pub fn purge(&self) -> usize {
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|_, slot| slot.strong_count() > 0);
        before - map.len()
    }

    /// Number of recorded mappings, dead slots included until a lookup or
    /// purge drops them.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if no mappings are recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every mapping.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Handle for the background purge task, when one was configured.
    pub fn purge_handle(&self) -> Option<&TaskHandle> {
        self.purger.as_ref()
    }
}

impl<K, V> WeakCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates a store whose dead slots are swept every `period` on a
    /// background thread. The sweep holds only a weak reference to the
    /// store and retires itself once every handle is dropped.
    pub fn with_purge_period(period: Duration) -> Self {
        let inner: Arc<RwLock<FxHashMap<K, Weak<V>>>> =
            Arc::new(RwLock::new(FxHashMap::default()));
        let task_target = Arc::downgrade(&inner);
        let purger = sched::spawn("boundcache-weak-purge", period, move || {
            let Some(map) = task_target.upgrade() else {
                return false;
            };
            map.write().retain(|_, slot| slot.strong_count() > 0);
            true
        });
        Self {
            inner,
            purger: Some(purger),
        }
    }
}

impl<K, V> Default for WeakCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for WeakCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakCache")
            .field("len", &self.len())
            .field("purging", &self.purger.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lives_while_strongly_owned() {
        let cache: WeakCache<u32, String> = WeakCache::new();
        let owner = Arc::new("v".to_string());
        cache.insert(1, &owner);

        let fetched = cache.get(&1).unwrap();
        assert!(Arc::ptr_eq(&owner, &fetched));
    }

    #[test]
    fn dropping_last_owner_makes_get_absent() {
        let cache: WeakCache<u32, String> = WeakCache::new();
        let owner = Arc::new("v".to_string());
        cache.insert(1, &owner);
        drop(owner);

        assert_eq!(cache.get(&1), None);
        // The failed lookup also dropped the stale mapping.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn fetched_arc_keeps_value_alive() {
        let cache: WeakCache<u32, String> = WeakCache::new();
        let owner = Arc::new("v".to_string());
        cache.insert(1, &owner);

        let held = cache.get(&1).unwrap();
        drop(owner);
        // `held` is now the only strong owner.
        assert_eq!(cache.get(&1).as_deref(), Some(&"v".to_string()));
        drop(held);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn purge_sweeps_only_dead_slots() {
        let cache: WeakCache<u32, String> = WeakCache::new();
        let keep = Arc::new("keep".to_string());
        cache.insert(1, &keep);
        {
            let gone = Arc::new("gone".to_string());
            cache.insert(2, &gone);
            cache.insert(3, &gone);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.purge(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&1));
    }

    #[test]
    fn insert_returns_previous_live_value_only() {
        let cache: WeakCache<u32, String> = WeakCache::new();
        let first = Arc::new("first".to_string());
        assert_eq!(cache.insert(1, &first), None);

        let second = Arc::new("second".to_string());
        let previous = cache.insert(1, &second).unwrap();
        assert!(Arc::ptr_eq(&first, &previous));

        drop(second);
        let third = Arc::new("third".to_string());
        // The replaced slot ("second") is dead, so nothing is reported.
        assert!(cache.insert(1, &third).is_none());
    }

    #[test]
    fn clones_share_the_same_slots() {
        let cache: WeakCache<u32, String> = WeakCache::new();
        let other = cache.clone();
        let owner = Arc::new("v".to_string());
        cache.insert(1, &owner);

        assert!(other.contains(&1));
        other.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn periodic_purge_drops_dead_slots() {
        let cache: WeakCache<u32, String> =
            WeakCache::with_purge_period(Duration::from_millis(10));
        {
            let transient = Arc::new("gone".to_string());
            cache.insert(1, &transient);
        }
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(100));
        // The background sweep dropped the dead slot without any lookup.
        assert_eq!(cache.len(), 0);

        cache.purge_handle().unwrap().cancel();
    }
}
