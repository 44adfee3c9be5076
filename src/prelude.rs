//! One-stop imports for the common surface.

pub use crate::builder::CacheBuilder;
pub use crate::cache::{Cache, CacheCore, EntryInfo};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::listener::{RemovalCause, RemovalListener};
pub use crate::noop::NullCache;
pub use crate::policy::{EvictionPolicy, FifoPolicy, LfuPolicy, LruPolicy, PolicyKind};
pub use crate::sched::TaskHandle;
pub use crate::stats::{CacheStats, StatsSnapshot};
pub use crate::traits::CoreCache;
pub use crate::weak::WeakCache;
