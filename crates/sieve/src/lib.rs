//! Sieve strategies for primecache
//!
//! - [`kernel`]: the resumable segmented sieve every store extends with
//! - [`baseline`]: four one-shot variants used as fixed comparison points
//!
//! All of them implement [`PrimeSieve`], so stores and the benchmark harness
//! can swap one for another.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod baseline;
pub mod kernel;

pub use baseline::{
    IndexOptimizedSieve, NaiveSieve, OddSkipSieve, OneShot, SqrtBoundedSieve,
};
pub use kernel::{extend_primes, resume_point, CompositeMask, SegmentedSieve};

use primecache_core::{OracleError, OracleResult, PrimeSieve};

/// Names accepted by [`sieve_by_name`], kernel first.
pub const SIEVE_NAMES: [&str; 5] = [
    "segmented",
    "naive",
    "odd-skip",
    "sqrt-bounded",
    "index-optimized",
];

/// The four one-shot baselines.
pub fn baseline_sieves() -> Vec<Box<dyn PrimeSieve>> {
    vec![
        Box::new(NaiveSieve),
        Box::new(OddSkipSieve),
        Box::new(SqrtBoundedSieve),
        Box::new(IndexOptimizedSieve),
    ]
}

/// Look up a sieve strategy by name.
pub fn sieve_by_name(name: &str) -> OracleResult<Box<dyn PrimeSieve>> {
    let sieve: Box<dyn PrimeSieve> = match name {
        "segmented" => Box::new(SegmentedSieve),
        "naive" => Box::new(NaiveSieve),
        "odd-skip" => Box::new(OddSkipSieve),
        "sqrt-bounded" => Box::new(SqrtBoundedSieve),
        "index-optimized" => Box::new(IndexOptimizedSieve),
        other => return Err(OracleError::UnknownAlgorithm(other.to_string())),
    };
    Ok(sieve)
}
