//! Bound limits for prime queries
//!
//! Every extension allocates a mask proportional to the distance it sieves,
//! so callers must not be able to request arbitrarily large bounds. Queries
//! past the ceiling are rejected up front instead of wrapping or exhausting
//! memory.

use thiserror::Error;

/// Absolute ceiling: bounds must fit the platform's native signed integer.
///
/// Sieve arithmetic (`p * p`, `j + 2p`) stays well inside `u64` below this.
pub const MAX_SUPPORTED_BOUND: u64 = i64::MAX as u64;

/// Default ceiling for a single store (`u32::MAX`).
pub const DEFAULT_MAX_BOUND: u64 = u32::MAX as u64;

/// Limit violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Requested bound is past the configured maximum
    #[error("bound {requested} exceeds maximum {max}")]
    BoundTooLarge {
        /// Bound asked for by the caller
        requested: u64,
        /// Configured ceiling
        max: u64,
    },
}

/// Limits enforced by every store and baseline adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest bound a query may request (default: `u32::MAX`)
    pub max_bound: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_bound: DEFAULT_MAX_BOUND,
        }
    }
}

impl Limits {
    /// Create limits with the given ceiling, clamped to [`MAX_SUPPORTED_BOUND`]
    pub fn new(max_bound: u64) -> Self {
        Limits {
            max_bound: max_bound.min(MAX_SUPPORTED_BOUND),
        }
    }

    /// Create limits with a small ceiling for testing
    ///
    /// Useful for unit tests that need to hit limit enforcement without
    /// sieving billions of integers.
    pub fn for_testing() -> Self {
        Limits { max_bound: 10_000 }
    }

    /// Validate a requested bound
    ///
    /// Returns the bound unchanged if it is within the ceiling.
    #[inline]
    pub fn check_bound(&self, n: u64) -> Result<u64, LimitError> {
        if n > self.max_bound {
            return Err(LimitError::BoundTooLarge {
                requested: n,
                max: self.max_bound,
            });
        }
        Ok(n)
    }
}
