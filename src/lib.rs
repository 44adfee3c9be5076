//! boundcache: bounded in-memory caching with pluggable eviction.
//!
//! A single-process cache engine built from small parts: an entry store,
//! interchangeable eviction policies (FIFO / LRU / LFU), an expiration
//! controller with lazy and scheduled pruning, a weak-reference store, and
//! a no-op store for disabling caching without touching call sites.
//!
//! ```
//! use std::time::Duration;
//! use boundcache::prelude::*;
//!
//! let cache: Cache<u64, String> = Cache::builder()
//!     .capacity(10_000)
//!     .policy(PolicyKind::Lru)
//!     .ttl(Duration::from_secs(300))
//!     .build();
//!
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("hello"));
//! ```
//!
//! Misses, expired entries, and never-inserted keys are indistinguishable:
//! all surface as `None`. The only fallible surface is construction; see
//! [`builder::CacheBuilder::try_build`].
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod cache;
pub mod clock;
pub mod ds;
pub mod error;
pub mod listener;
pub mod noop;
pub mod policy;
pub mod prelude;
pub mod sched;
pub mod stats;
pub mod traits;
pub mod weak;

mod store;
