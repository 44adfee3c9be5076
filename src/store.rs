//! Entry store: the key → entry mapping that owns all cached values.
//!
//! Each entry carries the access metadata the policies and the expiration
//! controller feed on. The store knows nothing about ordering (that lives
//! in the policy's `ds` structures) but it is the single source of truth
//! for which keys are alive.

use std::hash::Hash;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

/// One cached value plus its bookkeeping.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) inserted_at: Instant,
    pub(crate) last_accessed_at: Instant,
    pub(crate) access_count: u64,
    /// `None` = never expires.
    pub(crate) expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// Creates a fresh entry; the insert counts as the first access.
    pub(crate) fn new(value: V, now: Instant, ttl: Option<Duration>) -> Self {
        Self {
            value,
            inserted_at: now,
            last_accessed_at: now,
            access_count: 1,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    /// Whether the entry's TTL has elapsed at `now`.
    #[inline]
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now >= at,
            None => false,
        }
    }

    /// Records a read hit.
    pub(crate) fn record_access(&mut self, now: Instant) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    /// Slides the expiry window forward from `now` (sliding expiration).
    pub(crate) fn refresh_expiry(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = now.checked_add(ttl);
    }
}

/// Key → entry mapping. Thin on purpose; the engine coordinates it with
/// the policy metadata.
#[derive(Debug)]
pub(crate) struct EntryStore<K, V> {
    entries: FxHashMap<K, CacheEntry<V>>,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn get(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut CacheEntry<V>> {
        self.entries.get_mut(key)
    }

    #[inline]
    pub(crate) fn insert(&mut self, key: K, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        self.entries.insert(key, entry)
    }

    #[inline]
    pub(crate) fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    #[inline]
    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Drains the store, yielding every entry once. Used by `clear` when a
    /// removal listener needs to see the entries go.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (K, CacheEntry<V>)> + '_ {
        self.entries.drain()
    }

    /// Removes and returns every entry expired at `now`.
    pub(crate) fn take_expired(&mut self, now: Instant) -> Vec<(K, CacheEntry<V>)> {
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        expired
            .into_iter()
            .filter_map(|key| {
                let entry = self.entries.remove(&key)?;
                Some((key, entry))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_counts_insert_as_first_access() {
        let now = Instant::now();
        let entry = CacheEntry::new("v", now, None);
        assert_eq!(entry.access_count, 1);
        assert_eq!(entry.inserted_at, now);
        assert_eq!(entry.last_accessed_at, now);
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Instant::now();
        let ttl = Duration::from_millis(50);
        let entry = CacheEntry::new("v", now, Some(ttl));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::from_millis(49)));
        assert!(entry.is_expired(now + ttl));
        assert!(entry.is_expired(now + Duration::from_millis(100)));
    }

    #[test]
    fn refresh_slides_the_window() {
        let now = Instant::now();
        let ttl = Duration::from_millis(50);
        let mut entry = CacheEntry::new("v", now, Some(ttl));

        let later = now + Duration::from_millis(40);
        entry.refresh_expiry(later, ttl);
        assert!(!entry.is_expired(now + Duration::from_millis(60)));
        assert!(entry.is_expired(later + ttl));
    }

    #[test]
    fn take_expired_splits_by_deadline() {
        let now = Instant::now();
        let mut store: EntryStore<u32, &str> = EntryStore::new();
        store.insert(1, CacheEntry::new("a", now, Some(Duration::from_millis(10))));
        store.insert(2, CacheEntry::new("b", now, Some(Duration::from_millis(500))));
        store.insert(3, CacheEntry::new("c", now, None));

        let expired = store.take_expired(now + Duration::from_millis(100));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].0, 1);
        assert_eq!(store.len(), 2);
        assert!(store.contains_key(&2));
        assert!(store.contains_key(&3));
    }
}
