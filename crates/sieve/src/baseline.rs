//! One-shot Sieve of Eratosthenes variants
//!
//! Fixed reference points for cross-checking and benchmarking. None of them
//! memoize anything: every call sieves from 2 up to the requested bound and
//! keeps only the part of the result the caller asked for.
//!
//! | variant               | optimisation                                     |
//! |-----------------------|--------------------------------------------------|
//! | `NaiveSieve`          | none; every integer from 2, marks from `2i`      |
//! | `OddSkipSieve`        | odd-only index space, `value = 2 * index + 1`    |
//! | `SqrtBoundedSieve`    | odd-only, stops marking past `sqrt(n)`           |
//! | `IndexOptimizedSieve` | odd-only, loops over values instead of indices   |

use primecache_core::{quick_classify, Limits, OracleResult, PrimeOracle, PrimeSieve};

/// Integer square root: largest `r` with `r * r <= n`.
pub fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).map_or(false, |sq| sq <= n) {
        r += 1;
    }
    r
}

#[inline]
fn odd_value(index: usize) -> u64 {
    (index as u64) * 2 + 1
}

#[inline]
fn odd_index(value: u64) -> usize {
    ((value - 1) / 2) as usize
}

/// Keep only the freshly computed primes above `from`.
fn append_above(primes: &mut Vec<u64>, all: Vec<u64>, from: u64) {
    let start = all.partition_point(|&p| p <= from);
    primes.extend_from_slice(&all[start..]);
}

/// Plain sieve over every integer in `[0, n]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveSieve;

impl NaiveSieve {
    fn sieve(n: u64) -> Vec<u64> {
        let mut out = Vec::new();
        if n < 2 {
            return out;
        }
        let n = n as usize;
        let mut composite = vec![false; n + 1];
        for i in 2..=n {
            if composite[i] {
                continue;
            }
            out.push(i as u64);
            for k in (i * 2..=n).step_by(i) {
                composite[k] = true;
            }
        }
        out
    }
}

impl PrimeSieve for NaiveSieve {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
        if to <= from {
            return;
        }
        append_above(primes, Self::sieve(to), from);
    }
}

/// Sieve that never stores even numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OddSkipSieve;

impl OddSkipSieve {
    fn sieve(n: u64) -> Vec<u64> {
        let mut out = Vec::new();
        if n < 2 {
            return out;
        }
        out.push(2);
        let mut composite = vec![false; odd_index(n.max(1)) + 1];
        // Index 0 is the number 1.
        for i in 1..composite.len() {
            if composite[i] {
                continue;
            }
            let p = odd_value(i);
            out.push(p);
            // Odd multiples p*3, p*5, ... only.
            let mut k = 3;
            loop {
                let j = odd_index(p * k);
                if j >= composite.len() {
                    break;
                }
                composite[j] = true;
                k += 2;
            }
        }
        out
    }
}

impl PrimeSieve for OddSkipSieve {
    fn name(&self) -> &'static str {
        "odd-skip"
    }

    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
        if to <= from {
            return;
        }
        append_above(primes, Self::sieve(to), from);
    }
}

/// Odd-only sieve that stops marking once candidates pass `sqrt(n)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqrtBoundedSieve;

impl SqrtBoundedSieve {
    fn sieve(n: u64) -> Vec<u64> {
        let mut out = Vec::new();
        if n < 2 {
            return out;
        }
        out.push(2);
        let mut composite = vec![false; odd_index(n.max(1)) + 1];
        let root = isqrt(n);
        for i in 1..composite.len() {
            if composite[i] {
                continue;
            }
            let p = odd_value(i);
            out.push(p);
            if p > root {
                // Everything left unmarked from here on is prime.
                continue;
            }
            let mut k = 3;
            loop {
                let j = odd_index(p * k);
                if j >= composite.len() {
                    break;
                }
                composite[j] = true;
                k += 2;
            }
        }
        out
    }
}

impl PrimeSieve for SqrtBoundedSieve {
    fn name(&self) -> &'static str {
        "sqrt-bounded"
    }

    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
        if to <= from {
            return;
        }
        append_above(primes, Self::sieve(to), from);
    }
}

/// Odd-only, sqrt-bounded sieve that steps over values rather than indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptimizedSieve;

impl IndexOptimizedSieve {
    fn sieve(n: u64) -> Vec<u64> {
        let mut out = Vec::new();
        if n < 2 {
            return out;
        }
        out.push(2);
        let mut composite = vec![false; odd_index(n.max(1)) + 1];
        let root = isqrt(n);
        let mut i = 3;
        while i <= n {
            if !composite[odd_index(i)] {
                out.push(i);
                if i <= root {
                    let mut j = i * 3;
                    while j <= n {
                        composite[odd_index(j)] = true;
                        j += i + i;
                    }
                }
            }
            i += 2;
        }
        out
    }
}

impl PrimeSieve for IndexOptimizedSieve {
    fn name(&self) -> &'static str {
        "index-optimized"
    }

    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
        if to <= from {
            return;
        }
        append_above(primes, Self::sieve(to), from);
    }
}

/// Adapts a [`PrimeSieve`] to [`PrimeOracle`] without any caching.
///
/// Every query recomputes from scratch; it is the fixed baseline the
/// memoizing stores are compared against.
#[derive(Debug, Clone)]
pub struct OneShot<S> {
    sieve: S,
    limits: Limits,
}

impl<S: PrimeSieve> OneShot<S> {
    /// Wrap `sieve` with default limits
    pub fn new(sieve: S) -> Self {
        Self::with_limits(sieve, Limits::default())
    }

    /// Wrap `sieve` with custom limits
    pub fn with_limits(sieve: S, limits: Limits) -> Self {
        OneShot { sieve, limits }
    }
}

impl<S: PrimeSieve> PrimeOracle for OneShot<S> {
    fn name(&self) -> String {
        self.sieve.name().to_string()
    }

    fn is_prime(&mut self, n: i64) -> OracleResult<bool> {
        if let Some(answer) = quick_classify(n) {
            return Ok(answer);
        }
        let n = self.limits.check_bound(n as u64)?;
        Ok(self.sieve.primes_up_to(n).last() == Some(&n))
    }

    fn primes_up_to(&mut self, n: i64) -> OracleResult<Vec<u64>> {
        if n < 2 {
            return Ok(Vec::new());
        }
        let n = self.limits.check_bound(n as u64)?;
        Ok(self.sieve.primes_up_to(n))
    }
}
