//! The cache engine and its thread-safe facade.
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │                       Cache<K, V>                           │
//!   │                                                             │
//!   │   Arc<RwLock<CacheCore<K, Arc<V>>>>      TaskHandle (prune) │
//!   │                    │                                        │
//!   │                    ▼                                        │
//!   │   ┌─────────────────────────────────────────────────────┐   │
//!   │   │               CacheCore<K, V>                       │   │
//!   │   │                                                     │   │
//!   │   │   EntryStore<K, V>        PolicyImpl<K>             │   │
//!   │   │   key → value,            ordering metadata         │   │
//!   │   │   inserted_at,            (KeyList / freq buckets)  │   │
//!   │   │   last_accessed_at,                                 │   │
//!   │   │   access_count,           Clock · RemovalListener   │   │
//!   │   │   expires_at              CacheStats                │   │
//!   │   └─────────────────────────────────────────────────────┘   │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`CacheCore`] is the single-threaded engine: entry store plus eviction
//! policy plus expiration bookkeeping, kept in lock-step. [`Cache`] wraps
//! it for concurrent use the same way the value layer works everywhere in
//! this crate: values are held as `Arc<V>` and handed out as cheap clones,
//! so readers keep what they fetched even across an eviction.
//!
//! ## Locking
//!
//! `get` and `contains` take the **write** lock: a read can move a key in
//! the recency/frequency order, slide a TTL, or remove an entry it found
//! expired. Only `len`/`is_empty`/`capacity` and stats access get away with
//! the read lock. Lock guards are scoped, so every exit path releases the
//! lock, including unwinds from a removal listener (which are additionally
//! contained).
//!
//! ## Expiration
//!
//! Lazy: every read checks `expires_at` before returning and removes what
//! it finds dead. Active: the builder can schedule [`Cache::prune_expired`]
//! on a background thread; the sweep removes expired entries under the
//! write lock but delivers `Expired` notifications after releasing it.
//! Without active pruning, an expired entry that is never touched again is
//! never reclaimed; bounded memory is then a property of the access
//! pattern, not a guarantee.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::builder::CacheBuilder;
use crate::clock::{Clock, SystemClock};
use crate::error::InvariantError;
use crate::listener::{notify, RemovalCause, RemovalListener};
use crate::policy::{EvictionPolicy, PolicyImpl, PolicyKind};
use crate::sched::TaskHandle;
use crate::stats::{CacheStats, StatsSnapshot};
use crate::store::{CacheEntry, EntryStore};
use crate::traits::CoreCache;

/// Point-in-time view of one entry's bookkeeping.
///
/// Reading metadata does not count as an access: the entry keeps its
/// position in the eviction order and its TTL window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// When the entry was (last) inserted.
    pub inserted_at: Instant,
    /// When the entry was last inserted or read.
    pub last_accessed_at: Instant,
    /// Reads so far, the insert included. Reset by replacement.
    pub access_count: u64,
    /// Current expiry deadline; `None` = never expires.
    pub expires_at: Option<Instant>,
}

/// Everything a [`CacheCore`] is configured with, resolved by the builder.
pub(crate) struct CoreConfig<K, V> {
    pub(crate) capacity: usize,
    pub(crate) policy: PolicyKind,
    pub(crate) ttl: Option<Duration>,
    pub(crate) refresh_on_access: bool,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) listener: Option<RemovalListener<K, V>>,
    pub(crate) stats: Arc<CacheStats>,
}

/// Single-threaded cache engine: entry store + eviction policy +
/// expiration controller.
///
/// Most callers want the thread-safe [`Cache`] built through
/// [`Cache::builder`]; `CacheCore` is for single-threaded use where the
/// lock would be dead weight.
///
/// # Example
///
/// ```
/// use boundcache::cache::CacheCore;
/// use boundcache::policy::PolicyKind;
/// use boundcache::traits::CoreCache;
///
/// let mut cache = CacheCore::new(2, PolicyKind::Lru);
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// cache.get(&"a");
/// cache.insert("c", 3); // evicts "b", the least recently used
///
/// assert!(cache.contains(&"a"));
/// assert!(!cache.contains(&"b"));
/// ```
pub struct CacheCore<K, V> {
    store: EntryStore<K, V>,
    /// `None` when the cache is unbounded: no ordering metadata is kept.
    policy: Option<PolicyImpl<K>>,
    capacity: usize,
    ttl: Option<Duration>,
    refresh_on_access: bool,
    clock: Arc<dyn Clock>,
    listener: Option<RemovalListener<K, V>>,
    stats: Arc<CacheStats>,
}

impl<K, V> CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a capacity-bounded core with no TTL and no listener.
    ///
    /// `capacity` of 0 means unbounded, in which case `policy` is ignored
    /// and nothing is ever evicted.
    pub fn new(capacity: usize, policy: PolicyKind) -> Self {
        Self::with_config(CoreConfig {
            capacity,
            policy,
            ttl: None,
            refresh_on_access: true,
            clock: Arc::new(SystemClock),
            listener: None,
            stats: Arc::new(CacheStats::new()),
        })
    }

    pub(crate) fn with_config(config: CoreConfig<K, V>) -> Self {
        let policy = if config.capacity > 0 {
            Some(PolicyImpl::with_capacity(config.policy, config.capacity))
        } else {
            None
        };
        Self {
            store: if config.capacity > 0 {
                EntryStore::with_capacity(config.capacity)
            } else {
                EntryStore::new()
            },
            policy,
            capacity: config.capacity,
            ttl: config.ttl,
            refresh_on_access: config.refresh_on_access,
            clock: config.clock,
            listener: config.listener,
            stats: config.stats,
        }
    }

    /// The configured eviction policy, or `None` when unbounded.
    pub fn policy_kind(&self) -> Option<PolicyKind> {
        self.policy.as_ref().map(|policy| policy.kind())
    }

    /// The configured time-to-live, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Point-in-time copy of the hit/miss counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Bookkeeping snapshot for a live entry. Does not count as an access
    /// and treats an expired entry as absent, like every other read.
    pub fn entry_info(&self, key: &K) -> Option<EntryInfo> {
        let now = self.clock.now();
        let entry = self.store.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(EntryInfo {
            inserted_at: entry.inserted_at,
            last_accessed_at: entry.last_accessed_at,
            access_count: entry.access_count,
            expires_at: entry.expires_at,
        })
    }

    /// Removes every expired entry, firing `Expired` notifications, and
    /// returns how many were pruned.
    pub fn prune_expired(&mut self) -> usize {
        let removed = self.take_expired_entries();
        if let Some(listener) = self.listener.clone() {
            for (key, value) in &removed {
                notify(&listener, key, value, RemovalCause::Expired);
            }
        }
        removed.len()
    }

    /// Verifies that the entry store and the policy ordering metadata track
    /// exactly the same key set.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let Some(policy) = &self.policy else {
            return Ok(());
        };
        if policy.len() != self.store.len() {
            return Err(InvariantError::new(format!(
                "store holds {} entries but policy tracks {} keys",
                self.store.len(),
                policy.len()
            )));
        }
        for key in self.store.keys() {
            if !policy.contains(key) {
                return Err(InvariantError::new("stored key missing from policy order"));
            }
        }
        for key in policy.tracked_keys() {
            if !self.store.contains_key(&key) {
                return Err(InvariantError::new("policy tracks a key absent from the store"));
            }
        }
        Ok(())
    }

    /// Removes expired entries without notifying; the caller delivers the
    /// notifications (the concurrent facade does so outside its lock).
    pub(crate) fn take_expired_entries(&mut self) -> Vec<(K, V)> {
        let now = self.clock.now();
        let expired = self.store.take_expired(now);
        let mut removed = Vec::with_capacity(expired.len());
        for (key, entry) in expired {
            if let Some(policy) = &mut self.policy {
                policy.on_remove(&key);
            }
            self.stats.record_expiration();
            removed.push((key, entry.value));
        }
        removed
    }

    pub(crate) fn listener(&self) -> Option<RemovalListener<K, V>> {
        self.listener.clone()
    }

    /// Removes a key discovered expired, notifying with cause `Expired`.
    fn expire_entry(&mut self, key: &K) {
        if let Some(entry) = self.store.remove(key) {
            if let Some(policy) = &mut self.policy {
                policy.on_remove(key);
            }
            self.stats.record_expiration();
            if let Some(listener) = &self.listener {
                notify(listener, key, &entry.value, RemovalCause::Expired);
            }
        }
    }

    /// Evicts exactly one victim chosen by the policy.
    fn evict_one(&mut self) {
        let victim = match &mut self.policy {
            Some(policy) => policy.pop_victim(),
            None => None,
        };
        let Some(victim) = victim else { return };
        if let Some(entry) = self.store.remove(&victim) {
            self.stats.record_eviction();
            if let Some(listener) = &self.listener {
                notify(listener, &victim, &entry.value, RemovalCause::Capacity);
            }
        }
    }
}

impl<K, V> CoreCache<K, V> for CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let now = self.clock.now();

        match self.store.get(&key).map(|entry| entry.is_expired(now)) {
            Some(false) => {
                let previous = self
                    .store
                    .insert(key.clone(), CacheEntry::new(value, now, self.ttl))
                    .map(|entry| entry.value);
                if let Some(policy) = &mut self.policy {
                    // Replacement is re-insertion: new position, count reset.
                    policy.on_remove(&key);
                    policy.on_insert(key);
                }
                return previous;
            }
            Some(true) => {
                // The stale value was already absent to every reader;
                // drop it as an expiry and treat this as a fresh insert.
                self.expire_entry(&key);
            }
            None => {}
        }

        if self.capacity > 0 && self.store.len() >= self.capacity {
            self.evict_one();
        }
        self.store.insert(key.clone(), CacheEntry::new(value, now, self.ttl));
        if let Some(policy) = &mut self.policy {
            policy.on_insert(key);
        }
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        let expired = match self.store.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.expire_entry(key);
            self.stats.record_miss();
            return None;
        }

        if let Some(entry) = self.store.get_mut(key) {
            entry.record_access(now);
            if self.refresh_on_access {
                if let Some(ttl) = self.ttl {
                    entry.refresh_expiry(now, ttl);
                }
            }
        }
        if let Some(policy) = &mut self.policy {
            policy.on_access(key);
        }
        self.stats.record_hit();
        self.store.get(key).map(|entry| &entry.value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entry = self.store.remove(key)?;
        if let Some(policy) = &mut self.policy {
            policy.on_remove(key);
        }
        if entry.is_expired(now) {
            // Already absent to readers; report the removal as an expiry.
            self.stats.record_expiration();
            if let Some(listener) = &self.listener {
                notify(listener, key, &entry.value, RemovalCause::Expired);
            }
            return None;
        }
        Some(entry.value)
    }

    fn contains(&mut self, key: &K) -> bool {
        let now = self.clock.now();
        let expired = match self.store.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.expire_entry(key);
            return false;
        }
        true
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        if let Some(listener) = self.listener.clone() {
            for (key, entry) in self.store.drain() {
                notify(&listener, &key, &entry.value, RemovalCause::Cleared);
            }
        } else {
            self.store.clear();
        }
        if let Some(policy) = &mut self.policy {
            policy.clear();
        }
    }
}

impl<K, V> std::fmt::Debug for CacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCore")
            .field("len", &self.store.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy_kind())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Thread-safe cache facade.
///
/// Cloning yields another handle to the same cache. Values are stored as
/// `Arc<V>` and returned as clones, so a fetched value stays valid after
/// the entry is evicted or expires.
///
/// # Example
///
/// ```
/// use boundcache::cache::Cache;
/// use boundcache::policy::PolicyKind;
///
/// let cache: Cache<u64, String> = Cache::builder()
///     .capacity(128)
///     .policy(PolicyKind::Lfu)
///     .build();
///
/// cache.insert(1, "one".to_string());
/// assert_eq!(cache.get(&1).as_deref(), Some(&"one".to_string()));
/// assert_eq!(cache.get(&2), None);
/// ```
pub struct Cache<K, V> {
    inner: Arc<RwLock<CacheCore<K, Arc<V>>>>,
    stats: Arc<CacheStats>,
    pruner: Option<TaskHandle>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            stats: Arc::clone(&self.stats),
            pruner: self.pruner.clone(),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Starts configuring a cache.
    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    pub(crate) fn from_parts(
        inner: Arc<RwLock<CacheCore<K, Arc<V>>>>,
        stats: Arc<CacheStats>,
        pruner: Option<TaskHandle>,
    ) -> Self {
        Self {
            inner,
            stats,
            pruner,
        }
    }

    /// Inserts a value, wrapping it in `Arc` internally. Returns the
    /// previous live value if the key was present.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        self.insert_arc(key, Arc::new(value))
    }

    /// Inserts an already-shared value without another allocation.
    pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        let mut core = self.inner.write();
        core.insert(key, value)
    }

    /// Returns the live value for `key`, recording an access.
    ///
    /// Takes the write lock: a hit reorders eviction metadata and may
    /// slide the TTL; an expired entry is removed on the spot.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut core = self.inner.write();
        core.get(key).map(Arc::clone)
    }

    /// Removes an entry, returning the prior live value. Explicit removal
    /// does not notify the removal listener.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let mut core = self.inner.write();
        core.remove(key)
    }

    /// Returns `true` only for a live entry; lazily expires a dead one
    /// without extending its TTL.
    pub fn contains(&self, key: &K) -> bool {
        let mut core = self.inner.write();
        core.contains(key)
    }

    /// Number of physically stored entries (expired-but-unswept entries
    /// included; see the module docs on lazy expiration).
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum live entries; `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    /// The configured eviction policy, or `None` when unbounded.
    pub fn policy_kind(&self) -> Option<PolicyKind> {
        self.inner.read().policy_kind()
    }

    /// Releases all entries, notifying the listener with cause `Cleared`.
    pub fn clear(&self) {
        let mut core = self.inner.write();
        core.clear();
    }

    /// Removes every expired entry now and returns how many went.
    ///
    /// Entries are removed under the write lock; `Expired` notifications
    /// fire after the lock is released, so a slow listener cannot stall
    /// concurrent readers. The builder's `prune_period` schedules exactly
    /// this on a background thread.
    pub fn prune_expired(&self) -> usize {
        let (removed, listener) = {
            let mut core = self.inner.write();
            (core.take_expired_entries(), core.listener())
        };
        if let Some(listener) = listener {
            for (key, value) in &removed {
                notify(&listener, key, value, RemovalCause::Expired);
            }
        }
        removed.len()
    }

    /// Point-in-time copy of the hit/miss counters. Lock-free.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Bookkeeping snapshot for a live entry, without counting as an
    /// access.
    pub fn entry_info(&self, key: &K) -> Option<EntryInfo> {
        self.inner.read().entry_info(key)
    }

    /// Handle for the background prune task, when one was configured.
    /// Cancelling it stops future sweeps; lazy expiration keeps working.
    pub fn prune_handle(&self) -> Option<&TaskHandle> {
        self.pruner.as_ref()
    }

    /// Verifies store/policy bookkeeping agreement. Diagnostic; used by
    /// the concurrency tests after quiescing.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.read();
        f.debug_struct("Cache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .field("policy", &core.policy_kind())
            .field("pruning", &self.pruner.is_some())
            .finish_non_exhaustive()
    }
}
