//! Core types and traits for primecache
//!
//! This crate defines the foundational pieces shared by every other crate:
//! - Error: `OracleError` / `OracleResult`
//! - Limits: the largest bound a query may request
//! - Seed: the primes every cache starts from
//! - Traits: `PrimeSieve` (range computation strategy) and `PrimeOracle`
//!   (the two operations external callers consume)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod traits;

pub use error::{OracleError, OracleResult};
pub use limits::{LimitError, Limits, MAX_SUPPORTED_BOUND};
pub use traits::{PrimeOracle, PrimeSieve};

/// Primes every store is seeded with.
pub const SEED_PRIMES: [u64; 4] = [2, 3, 5, 7];

/// Boundary matching [`SEED_PRIMES`]: every integer up to 10 is classified.
pub const SEED_BOUNDARY: u64 = 10;

/// Answer the trivial membership cases without touching any cache.
///
/// Returns `Some(answer)` for `n <= 2` and even `n`, `None` when the caller
/// has to consult a sieve.
#[inline]
pub fn quick_classify(n: i64) -> Option<bool> {
    if n <= 1 {
        return Some(false);
    }
    if n == 2 {
        return Some(true);
    }
    if n % 2 == 0 {
        return Some(false);
    }
    None
}
