//! Eviction policies and the seam the cache engine drives them through.
//!
//! A policy owns only ordering metadata (keys, never values) and stays in
//! lock-step with the entry store: every store mutation is mirrored through
//! [`EvictionPolicy::on_insert`] / [`EvictionPolicy::on_remove`], and reads
//! that count as accesses flow through [`EvictionPolicy::on_access`]. When
//! a bounded cache is full, the engine asks for exactly one victim via
//! [`EvictionPolicy::pop_victim`].
//!
//! | Policy | Eviction basis | `on_access` effect |
//! |--------|----------------|--------------------|
//! | FIFO   | insertion order | none |
//! | LRU    | recency order   | move to most-recent end |
//! | LFU    | access frequency | move to next frequency group |
//!
//! All mutating policy operations are O(1) amortized; selecting a victim
//! never scans entries.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

mod fifo;
mod lfu;
mod lru;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

/// Ordering-metadata seam between the cache engine and an eviction policy.
///
/// Implementations must keep every operation O(1) amortized and must never
/// hold a key the entry store does not (the engine asserts this through
/// `check_invariants`).
pub trait EvictionPolicy<K> {
    /// Records a brand-new key. The engine guarantees the key is not
    /// already tracked (replacement goes through `on_remove` first).
    fn on_insert(&mut self, key: K);

    /// Records an access to an existing key. Unknown keys are ignored.
    fn on_access(&mut self, key: &K);

    /// Drops a key from the ordering metadata. Unknown keys are ignored.
    fn on_remove(&mut self, key: &K);

    /// Removes and returns the next eviction victim, if any.
    fn pop_victim(&mut self) -> Option<K>;

    /// Returns `true` if `key` is tracked.
    fn contains(&self, key: &K) -> bool;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    /// Returns `true` if no keys are tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all ordering metadata.
    fn clear(&mut self);
}

/// Eviction policy selector, resolved at construction time.
///
/// Parses case-insensitively from `"fifo"`, `"lru"`, and `"lfu"`; anything
/// else is a construction fault.
///
/// ```
/// use boundcache::policy::PolicyKind;
///
/// assert_eq!("LRU".parse::<PolicyKind>().unwrap(), PolicyKind::Lru);
/// assert!("mru".parse::<PolicyKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// First in, first out: evict the oldest insertion.
    Fifo,
    /// Least recently used: evict the stalest access.
    Lru,
    /// Least frequently used: evict the lowest access count, oldest first.
    Lfu,
}

impl PolicyKind {
    /// Canonical lowercase name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Lru => "lru",
            PolicyKind::Lfu => "lfu",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            other => Err(ConfigError::new(format!(
                "unrecognized eviction policy `{other}` (expected fifo, lru, or lfu)"
            ))),
        }
    }
}

/// A configured policy instance, dispatched without trait objects.
#[derive(Debug)]
pub enum PolicyImpl<K> {
    Fifo(FifoPolicy<K>),
    Lru(LruPolicy<K>),
    Lfu(LfuPolicy<K>),
}

impl<K> PolicyImpl<K>
where
    K: Eq + std::hash::Hash + Clone,
{
    /// Builds the policy instance for `kind` with reserved capacity.
    pub fn with_capacity(kind: PolicyKind, capacity: usize) -> Self {
        match kind {
            PolicyKind::Fifo => PolicyImpl::Fifo(FifoPolicy::with_capacity(capacity)),
            PolicyKind::Lru => PolicyImpl::Lru(LruPolicy::with_capacity(capacity)),
            PolicyKind::Lfu => PolicyImpl::Lfu(LfuPolicy::with_capacity(capacity)),
        }
    }

    /// The selector this instance was built from.
    pub fn kind(&self) -> PolicyKind {
        match self {
            PolicyImpl::Fifo(_) => PolicyKind::Fifo,
            PolicyImpl::Lru(_) => PolicyKind::Lru,
            PolicyImpl::Lfu(_) => PolicyKind::Lfu,
        }
    }

    /// Snapshot of every tracked key, for invariant diagnostics.
    pub fn tracked_keys(&self) -> Vec<K> {
        match self {
            PolicyImpl::Fifo(p) => p.order_keys(),
            PolicyImpl::Lru(p) => p.order_keys(),
            PolicyImpl::Lfu(p) => p.tracked_keys(),
        }
    }
}

impl<K> EvictionPolicy<K> for PolicyImpl<K>
where
    K: Eq + std::hash::Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        match self {
            PolicyImpl::Fifo(p) => p.on_insert(key),
            PolicyImpl::Lru(p) => p.on_insert(key),
            PolicyImpl::Lfu(p) => p.on_insert(key),
        }
    }

    fn on_access(&mut self, key: &K) {
        match self {
            PolicyImpl::Fifo(p) => p.on_access(key),
            PolicyImpl::Lru(p) => p.on_access(key),
            PolicyImpl::Lfu(p) => p.on_access(key),
        }
    }

    fn on_remove(&mut self, key: &K) {
        match self {
            PolicyImpl::Fifo(p) => p.on_remove(key),
            PolicyImpl::Lru(p) => p.on_remove(key),
            PolicyImpl::Lfu(p) => p.on_remove(key),
        }
    }

    fn pop_victim(&mut self) -> Option<K> {
        match self {
            PolicyImpl::Fifo(p) => p.pop_victim(),
            PolicyImpl::Lru(p) => p.pop_victim(),
            PolicyImpl::Lfu(p) => p.pop_victim(),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            PolicyImpl::Fifo(p) => p.contains(key),
            PolicyImpl::Lru(p) => p.contains(key),
            PolicyImpl::Lfu(p) => p.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            PolicyImpl::Fifo(p) => p.len(),
            PolicyImpl::Lru(p) => p.len(),
            PolicyImpl::Lfu(p) => p.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            PolicyImpl::Fifo(p) => p.clear(),
            PolicyImpl::Lru(p) => p.clear(),
            PolicyImpl::Lfu(p) => p.clear(),
        }
    }
}
