// ==============================================
// TTL EXPIRATION (integration)
// ==============================================
//
// Lazy expiration, sliding vs absolute windows, and the scheduled prune
// sweep. Deterministic behavior runs on a ManualClock; only the background
// pruner tests touch the wall clock, with generous margins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boundcache::cache::Cache;
use boundcache::clock::{Clock, ManualClock};
use boundcache::listener::RemovalCause;

fn timed_cache(
    ttl: Duration,
    refresh_on_access: bool,
    clock: &Arc<ManualClock>,
) -> Cache<u32, String> {
    Cache::builder()
        .capacity(16)
        .ttl(ttl)
        .refresh_on_access(refresh_on_access)
        .clock(Arc::clone(clock) as Arc<dyn Clock>)
        .build()
}

// ==============================================
// Lazy expiration
// ==============================================

#[test]
fn entry_is_absent_after_ttl_elapses() {
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), false, &clock);
    cache.insert(1, "v".to_string());

    assert!(cache.get(&1).is_some());
    clock.advance(Duration::from_millis(100));
    assert!(cache.get(&1).is_none());
}

#[test]
fn all_read_paths_treat_expired_as_absent() {
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), false, &clock);
    cache.insert(1, "v".to_string());
    clock.advance(Duration::from_millis(60));

    // contains() sees the entry as gone and removes it.
    assert!(!cache.contains(&1));
    assert_eq!(cache.len(), 0);

    cache.insert(2, "w".to_string());
    clock.advance(Duration::from_millis(60));
    // remove() of an expired entry reports absent too.
    assert!(cache.remove(&2).is_none());
}

#[test]
fn lazy_only_caches_keep_expired_entries_until_touched() {
    // Without a prune period there is no background sweep: an expired
    // entry that is never read again stays physically present. This is
    // the documented gap, asserted as such.
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), false, &clock);
    cache.insert(1, "v".to_string());

    clock.advance(Duration::from_millis(500));
    assert_eq!(cache.len(), 1); // still occupying memory
    assert!(cache.get(&1).is_none()); // but absent to readers
    assert_eq!(cache.len(), 0); // and reclaimed by the failed read
}

#[test]
fn manual_prune_reclaims_without_reads() {
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), false, &clock);
    for k in 0..8 {
        cache.insert(k, "v".to_string());
    }
    clock.advance(Duration::from_millis(30));
    for k in 8..12 {
        cache.insert(k, "v".to_string());
    }
    clock.advance(Duration::from_millis(30));

    // First batch is 60ms old (dead); second is 30ms old (alive).
    assert_eq!(cache.prune_expired(), 8);
    assert_eq!(cache.len(), 4);
    cache.check_invariants().unwrap();
}

// ==============================================
// Sliding vs absolute windows
// ==============================================

#[test]
fn sliding_window_keeps_a_hot_entry_alive() {
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), true, &clock);
    cache.insert(1, "v".to_string());

    // Reads spaced under the TTL, far past the original deadline.
    for _ in 0..20 {
        clock.advance(Duration::from_millis(40));
        assert!(cache.get(&1).is_some());
    }
    // Once reads stop, the window closes.
    clock.advance(Duration::from_millis(60));
    assert!(cache.get(&1).is_none());
}

#[test]
fn absolute_window_expires_despite_reads() {
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), false, &clock);
    cache.insert(1, "v".to_string());

    clock.advance(Duration::from_millis(20));
    assert!(cache.get(&1).is_some());
    clock.advance(Duration::from_millis(20));
    assert!(cache.get(&1).is_some());
    clock.advance(Duration::from_millis(20));
    // 60ms after insert: gone, regardless of the reads at 20ms and 40ms.
    assert!(cache.get(&1).is_none());
}

#[test]
fn replacement_restarts_the_window() {
    let clock = Arc::new(ManualClock::new());
    let cache = timed_cache(Duration::from_millis(50), false, &clock);
    cache.insert(1, "old".to_string());
    clock.advance(Duration::from_millis(40));
    cache.insert(1, "new".to_string());

    clock.advance(Duration::from_millis(40));
    // 80ms after the first insert, 40ms after the replacement.
    assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("new"));
}

// ==============================================
// Expiry notifications
// ==============================================

#[test]
fn lazy_expiry_notifies_with_expired_cause() {
    let clock = Arc::new(ManualClock::new());
    let expirations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&expirations);
    let cache: Cache<u32, String> = Cache::builder()
        .capacity(16)
        .ttl(Duration::from_millis(50))
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .removal_listener(move |_key, _value, cause| {
            if cause == RemovalCause::Expired {
                sink.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    cache.insert(1, "v".to_string());
    clock.advance(Duration::from_millis(100));
    cache.get(&1);

    assert_eq!(expirations.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats().expirations, 1);
}

// ==============================================
// Background pruning (wall clock)
// ==============================================

#[test]
fn background_sweep_reclaims_without_any_access() {
    // Surface sched debug events when RUST_LOG asks for them.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let expirations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&expirations);
    let cache: Cache<u32, String> = Cache::builder()
        .capacity(64)
        .ttl(Duration::from_millis(30))
        .refresh_on_access(false)
        .prune_period(Duration::from_millis(10))
        .removal_listener(move |_key, _value, cause| {
            assert_eq!(cause, RemovalCause::Expired);
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    for k in 0..10 {
        cache.insert(k, format!("v{k}"));
    }
    std::thread::sleep(Duration::from_millis(300));

    // Nothing ever read these entries; the sweep alone reclaimed them.
    assert_eq!(cache.len(), 0);
    assert_eq!(expirations.load(Ordering::SeqCst), 10);
    assert_eq!(cache.stats().expirations, 10);
    cache.check_invariants().unwrap();
}

#[test]
fn cancelling_the_pruner_stops_sweeps_but_not_lazy_expiry() {
    let cache: Cache<u32, String> = Cache::builder()
        .capacity(16)
        .ttl(Duration::from_millis(20))
        .refresh_on_access(false)
        .prune_period(Duration::from_millis(5))
        .build();

    let handle = cache.prune_handle().unwrap().clone();
    handle.cancel();
    handle.cancel(); // idempotent
    assert!(handle.is_cancelled());

    cache.insert(1, "v".to_string());
    std::thread::sleep(Duration::from_millis(100));

    // No sweep ran after cancellation: the dead entry is still stored...
    assert_eq!(cache.len(), 1);
    // ...until lazy expiration reclaims it on access.
    assert!(cache.get(&1).is_none());
    assert_eq!(cache.len(), 0);
}

#[test]
fn pruner_dies_with_the_last_cache_handle() {
    let cache: Cache<u32, String> = Cache::builder()
        .capacity(16)
        .ttl(Duration::from_millis(10))
        .prune_period(Duration::from_millis(5))
        .build();
    let handle = cache.prune_handle().unwrap().clone();

    drop(cache);
    // The sweep only holds a weak reference; with every cache handle gone
    // it retires on its next tick. Cancelling afterwards stays safe.
    std::thread::sleep(Duration::from_millis(50));
    handle.cancel();
}
