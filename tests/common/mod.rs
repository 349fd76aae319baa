//! Shared helpers for the conformance suite.

#![allow(dead_code)]

use primecache::{
    IndexOptimizedSieve, NaiveSieve, OddSkipSieve, OneShot, PrimeDb, PrimeOracle, PrimeSieve,
    SegmentedSieve, SharedPrimeStore, SqrtBoundedSieve,
};

/// Largest value the reference checks cover.
pub const REFERENCE_MAX: u64 = 1223;

/// Trial division; slow but obviously right.
pub fn is_prime_reference(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Every prime `<= n` by trial division.
pub fn primes_reference(n: u64) -> Vec<u64> {
    (2..=n).filter(|&k| is_prime_reference(k as i64)).collect()
}

/// Every sieve strategy, kernel included.
pub fn all_sieves() -> Vec<Box<dyn PrimeSieve>> {
    vec![
        Box::new(SegmentedSieve),
        Box::new(NaiveSieve),
        Box::new(OddSkipSieve),
        Box::new(SqrtBoundedSieve),
        Box::new(IndexOptimizedSieve),
    ]
}

/// One fresh oracle per (variant, strategy) combination.
pub fn all_oracles() -> Vec<Box<dyn PrimeOracle>> {
    vec![
        Box::new(OneShot::new(NaiveSieve)),
        Box::new(OneShot::new(OddSkipSieve)),
        Box::new(OneShot::new(SqrtBoundedSieve)),
        Box::new(OneShot::new(IndexOptimizedSieve)),
        Box::new(PrimeDb::new()),
        Box::new(PrimeDb::with_sieve(NaiveSieve)),
        Box::new(PrimeDb::with_sieve(IndexOptimizedSieve)),
        Box::new(SharedPrimeStore::new()),
        Box::new(SharedPrimeStore::with_sieve(OddSkipSieve)),
        Box::new(SharedPrimeStore::with_sieve(SqrtBoundedSieve)),
    ]
}
