//! Removal notification: cause taxonomy and panic-isolated delivery.
//!
//! A cache optionally carries one observer that fires whenever an entry
//! leaves the cache other than through an explicit `remove`: policy
//! eviction, TTL expiry, and whole-cache clear. The notification is a side
//! effect only: a panicking listener is contained and logged, and can
//! neither fail nor corrupt the mutation that triggered it (`parking_lot`
//! locks do not poison, so there is no poisoned-lock fallout either).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Evicted by the configured policy to make room for an insert.
    Capacity,
    /// Time-to-live elapsed; removed lazily on access or by a prune sweep.
    Expired,
    /// Removed by an explicit `remove` call. The cache itself never
    /// notifies with this cause; it exists so callers relaying manual
    /// invalidations can share the same channel.
    Explicit,
    /// Removed because the whole cache was cleared.
    Cleared,
}

impl RemovalCause {
    /// Returns `true` for removals the entry did not "earn" itself, i.e.
    /// everything except explicit invalidation.
    pub fn was_automatic(&self) -> bool {
        !matches!(self, RemovalCause::Explicit)
    }
}

/// Observer invoked with `(key, value, cause)` on non-explicit removals.
pub type RemovalListener<K, V> = Arc<dyn Fn(&K, &V, RemovalCause) + Send + Sync>;

/// Delivers one notification, containing any panic from the callback.
pub(crate) fn notify<K, V>(listener: &RemovalListener<K, V>, key: &K, value: &V, cause: RemovalCause) {
    let outcome = catch_unwind(AssertUnwindSafe(|| listener(key, value, cause)));
    if outcome.is_err() {
        warn!(?cause, "removal listener panicked; notification dropped");
    }
}
