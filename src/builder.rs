//! Cache construction.
//!
//! All behavior is resolved here, at construction time; nothing about a
//! cache's policy, TTL, or pruning can change afterwards.
//!
//! | Option | Effect | Default |
//! |--------|--------|---------|
//! | `capacity` | maximum live entries; `0` = unbounded (no eviction) | `0` |
//! | `policy` | FIFO / LRU / LFU victim selection; ignored when unbounded | LRU |
//! | `ttl` | entry lifetime; absent = never expires | absent |
//! | `refresh_on_access` | slide the TTL window on every hit (sliding vs absolute expiration) | `true` |
//! | `prune_period` | schedule a background sweep of expired entries at this interval; absent = lazy-only expiration | absent |
//! | `removal_listener` | observer for capacity / expiry / clear removals | none |
//! | `clock` | time source; swap in a `ManualClock` under test | `SystemClock` |
//!
//! Configuration faults fail fast: [`CacheBuilder::try_build`] returns a
//! [`ConfigError`] for a zero `ttl`, a zero `prune_period`, or a
//! `prune_period` without a `ttl`; [`CacheBuilder::build`] panics on the
//! same faults. Nothing is validated lazily mid-operation.
//!
//! Without `prune_period` only lazy expiration runs, so an expired entry
//! that is never read again stays in memory indefinitely, a documented
//! gap, not a bug. Enable pruning when that matters.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::{Cache, CacheCore, CoreConfig};
use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::listener::{notify, RemovalCause, RemovalListener};
use crate::policy::PolicyKind;
use crate::sched;
use crate::stats::CacheStats;

/// Configures and constructs a [`Cache`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use boundcache::cache::Cache;
/// use boundcache::policy::PolicyKind;
///
/// let cache: Cache<u64, String> = Cache::builder()
///     .capacity(1_000)
///     .policy(PolicyKind::Lru)
///     .ttl(Duration::from_secs(60))
///     .prune_period(Duration::from_secs(5))
///     .build();
///
/// cache.insert(1, "cached".to_string());
/// assert!(cache.contains(&1));
/// ```
pub struct CacheBuilder<K, V> {
    capacity: usize,
    policy: PolicyKind,
    ttl: Option<Duration>,
    refresh_on_access: bool,
    prune_period: Option<Duration>,
    listener: Option<RemovalListener<K, Arc<V>>>,
    clock: Arc<dyn Clock>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> CacheBuilder<K, V> {
    /// Starts from the defaults: unbounded, LRU, no TTL, no pruning.
    pub fn new() -> Self {
        Self {
            capacity: 0,
            policy: PolicyKind::Lru,
            ttl: None,
            refresh_on_access: true,
            prune_period: None,
            listener: None,
            clock: Arc::new(SystemClock),
            _marker: PhantomData,
        }
    }

    /// Maximum live entries. `0` means unbounded: no policy is consulted
    /// and nothing is ever evicted for space.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Victim selection for a bounded cache. Ignored when unbounded.
    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Uniform time-to-live applied to every entry at insert time.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Whether a successful `get` slides `expires_at` forward by the TTL
    /// (sliding expiration) or leaves it fixed from insertion (absolute).
    pub fn refresh_on_access(mut self, refresh: bool) -> Self {
        self.refresh_on_access = refresh;
        self
    }

    /// Enables active pruning: a background thread sweeps expired entries
    /// at this interval. Requires a `ttl`.
    pub fn prune_period(mut self, period: Duration) -> Self {
        self.prune_period = Some(period);
        self
    }

    /// Observer invoked with `(key, value, cause)` whenever an entry is
    /// evicted for capacity, expires, or goes down with a `clear`, never
    /// on explicit `remove`. Panics in the listener are contained and
    /// logged; they cannot fail the triggering operation.
    pub fn removal_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&K, &Arc<V>, RemovalCause) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Substitutes the time source. Production caches keep the default
    /// [`SystemClock`]; tests inject a
    /// [`ManualClock`](crate::clock::ManualClock) and advance it instead
    /// of sleeping.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Builds the cache, returning a [`ConfigError`] on invalid
    /// configuration.
    pub fn try_build(self) -> Result<Cache<K, V>, ConfigError> {
        if let Some(ttl) = self.ttl {
            if ttl.is_zero() {
                return Err(ConfigError::new("ttl must be non-zero"));
            }
        }
        if let Some(period) = self.prune_period {
            if period.is_zero() {
                return Err(ConfigError::new("prune period must be non-zero"));
            }
            if self.ttl.is_none() {
                return Err(ConfigError::new(
                    "prune period requires a ttl (nothing expires without one)",
                ));
            }
        }

        let stats = Arc::new(CacheStats::new());
        let core = CacheCore::with_config(CoreConfig {
            capacity: self.capacity,
            policy: self.policy,
            ttl: self.ttl,
            refresh_on_access: self.refresh_on_access,
            clock: self.clock,
            listener: self.listener,
            stats: Arc::clone(&stats),
        });
        let inner = Arc::new(RwLock::new(core));

        // The sweep holds only a weak reference: dropping the last cache
        // handle retires the thread on its next tick, and the handle never
        // keeps entries alive on its own.
        let pruner = self.prune_period.map(|period| {
            let weak = Arc::downgrade(&inner);
            sched::spawn("boundcache-prune", period, move || {
                let Some(shared) = weak.upgrade() else {
                    return false;
                };
                let (removed, listener) = {
                    let mut core = shared.write();
                    (core.take_expired_entries(), core.listener())
                };
                if let Some(listener) = listener {
                    for (key, value) in &removed {
                        notify(&listener, key, value, RemovalCause::Expired);
                    }
                }
                true
            })
        });

        Ok(Cache::from_parts(inner, stats, pruner))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on the configuration faults [`try_build`](Self::try_build)
    /// reports.
    pub fn build(self) -> Cache<K, V> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }
}

impl<K, V> Default for CacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
