//! The cache facade contract.
//!
//! [`CoreCache`] is the single seam call sites depend on: the bounded
//! engine ([`CacheCore`](crate::cache::CacheCore)) and the always-miss
//! stand-in ([`NullCache`](crate::noop::NullCache)) both implement it, so
//! caching can be administratively disabled without touching call sites.
//!
//! A miss, an expired entry, and a never-inserted key are indistinguishable
//! through this contract: all collapse to `None`. Callers must not need to
//! tell them apart.
//!
//! `get` and `contains` take `&mut self`: both may reorder eviction
//! metadata and both remove entries discovered to be expired (lazy
//! expiration). The thread-safe [`Cache`](crate::cache::Cache) wrapper
//! exposes `&self` methods over this engine behind its lock, as a separate
//! inherent API.

/// Operations every cache store supports.
pub trait CoreCache<K, V> {
    /// Inserts or replaces an entry, returning the previous live value.
    ///
    /// On a full bounded cache the eviction policy selects exactly one
    /// victim before the insert; eviction plus insert is a single atomic
    /// step from the caller's perspective.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the live value for `key`, recording an access.
    ///
    /// An entry found expired is removed on the spot (self-healing lazy
    /// eviction) and reported as a miss.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Removes an entry and its ordering metadata, returning the prior
    /// live value. Explicit removal does not notify the removal listener.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns `true` only for a live (non-expired) entry. Performs the
    /// same lazy expiry as [`get`](Self::get) but does not extend a
    /// sliding TTL and does not count as a policy access.
    fn contains(&mut self, key: &K) -> bool;

    /// Number of physically stored entries.
    ///
    /// May include expired entries no sweep or access has removed yet; see
    /// the crate docs on lazy expiration.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum live entries; `0` means unbounded (no eviction policy).
    fn capacity(&self) -> usize;

    /// Releases all entries and resets ordering metadata in one step.
    fn clear(&mut self);
}
