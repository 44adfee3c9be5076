//! Error types for the boundcache library.
//!
//! Ordinary cache operation has no error taxonomy: a miss, an expired
//! entry, and a never-inserted key all surface as `None`, by design. The
//! only reportable faults are:
//!
//! - [`ConfigError`]: invalid construction parameters (unrecognized policy
//!   selector, zero durations). Fail fast, fatal to construction, never
//!   surfaced mid-operation.
//! - [`InvariantError`]: internal store/policy bookkeeping disagreement,
//!   produced by `check_invariants` diagnostics.
//!
//! ## Example
//!
//! ```
//! use boundcache::error::ConfigError;
//! use boundcache::policy::PolicyKind;
//!
//! let err: ConfigError = "arc".parse::<PolicyKind>().unwrap_err();
//! assert!(err.to_string().contains("arc"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build) and
/// by [`PolicyKind`](crate::policy::PolicyKind) parsing. Carries a
/// human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods on the cache engine, which verify
/// that the entry store and the eviction policy's ordering metadata track
/// exactly the same key set. Carries a human-readable description of the
/// disagreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("ttl must be non-zero");
        assert_eq!(err.to_string(), "ttl must be non-zero");
        assert_eq!(err.message(), "ttl must be non-zero");
    }

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("policy tracks evicted key");
        assert_eq!(err.to_string(), "policy tracks evicted key");
    }

    #[test]
    fn both_types_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }

    #[test]
    fn clone_and_eq_round_trip() {
        let a = ConfigError::new("x");
        assert_eq!(a.clone(), a);
        let b = InvariantError::new("y");
        assert_eq!(b.clone(), b);
    }
}
