//! Resumable segmented Sieve of Eratosthenes
//!
//! Given a list that is complete up to some boundary `B`, computes every
//! prime in `(B, N]` and appends it in increasing order.
//!
//! ## Resume point
//!
//! Sieving restarts at the first odd integer strictly greater than `B`.
//! That value depends only on `B`, never on the parity of earlier targets or
//! on whether the previous extension came from a membership query or an
//! enumeration.
//!
//! ## Marking known primes
//!
//! A prime `p` already in the list may have multiples in the new range below
//! `p * p`. Each known prime therefore starts at
//! `max(p * p, first odd multiple of p >= resume)`; starting at `p * p`
//! unconditionally would leave composites in `(B, p * p)` unmarked.
//!
//! ```text
//! B = 1683, N = 1765, p = 5
//!   p * p                     = 25    (below the range, useless)
//!   first odd multiple >= 1685 = 1685  <- start here
//!   1685, 1695, ..., 1765     marked
//! ```

use primecache_core::PrimeSieve;
use tracing::debug;

/// Bit-packed composite flags over the odd integers of one extension range.
///
/// Bit `i` covers the value `lo + 2 * i`. Only lives for one extension.
#[derive(Debug)]
pub struct CompositeMask {
    lo: u64,
    hi: u64,
    words: Vec<u64>,
}

impl CompositeMask {
    /// Create an all-clear mask over the odd values in `[lo, hi]`
    ///
    /// `lo` must be odd and `lo <= hi`.
    pub fn new(lo: u64, hi: u64) -> Self {
        debug_assert!(lo % 2 == 1, "mask must start on an odd value");
        debug_assert!(lo <= hi);
        let bits = ((hi - lo) / 2 + 1) as usize;
        CompositeMask {
            lo,
            hi,
            words: vec![0; bits.div_ceil(64)],
        }
    }

    /// Number of odd values covered
    pub fn len(&self) -> usize {
        ((self.hi - self.lo) / 2 + 1) as usize
    }

    /// Always false: a mask covers at least one value
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    fn index(&self, value: u64) -> usize {
        ((value - self.lo) / 2) as usize
    }

    /// Flag `value` as composite
    #[inline]
    pub fn mark(&mut self, value: u64) {
        debug_assert!(value >= self.lo && value <= self.hi && value % 2 == 1);
        let i = self.index(value);
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    /// Whether `value` has been flagged composite
    #[inline]
    pub fn is_marked(&self, value: u64) -> bool {
        let i = self.index(value);
        self.words[i / 64] & (1u64 << (i % 64)) != 0
    }

    /// Flag the odd multiples of `p` from `start` (an odd multiple of `p`)
    /// through the end of the range.
    pub fn mark_multiples(&mut self, p: u64, start: u64) {
        let step = 2 * p;
        let mut j = start;
        while j <= self.hi {
            self.mark(j);
            match j.checked_add(step) {
                Some(next) => j = next,
                None => break,
            }
        }
    }
}

/// First odd integer strictly greater than `boundary`, and never below 3.
#[inline]
pub fn resume_point(boundary: u64) -> u64 {
    (boundary.saturating_add(1) | 1).max(3)
}

/// Smallest odd multiple of the odd prime `p` that is `>= from`.
#[inline]
fn first_odd_multiple(p: u64, from: u64) -> u64 {
    let m = from.div_ceil(p) * p;
    if m % 2 == 0 {
        m + p
    } else {
        m
    }
}

/// Extend `primes`, complete up to `boundary`, to cover `(boundary, target]`.
///
/// Returns the new boundary: `target` if it was larger, otherwise `boundary`
/// unchanged. `target` must not exceed `i64::MAX`.
pub fn extend_primes(primes: &mut Vec<u64>, boundary: u64, target: u64) -> u64 {
    if target <= boundary {
        return boundary;
    }

    let known = primes.len();
    if boundary < 2 {
        debug_assert!(primes.is_empty(), "nothing can be known below 2");
        primes.push(2);
    }

    let resume = resume_point(boundary);
    if resume > target {
        return target;
    }

    let mut mask = CompositeMask::new(resume, target);

    // Known odd primes, starting no lower than the new range.
    for &p in primes[..known].iter().filter(|&&p| p != 2) {
        match p.checked_mul(p) {
            Some(square) if square <= target => {
                mask.mark_multiples(p, square.max(first_odd_multiple(p, resume)));
            }
            _ => break,
        }
    }

    let mut v = resume;
    loop {
        if !mask.is_marked(v) {
            primes.push(v);
            if let Some(square) = v.checked_mul(v) {
                if square <= target {
                    mask.mark_multiples(v, square);
                }
            }
        }
        match v.checked_add(2) {
            Some(next) if next <= target => v = next,
            _ => break,
        }
    }

    debug!(
        from = boundary,
        to = target,
        found = primes.len() - known,
        "extended prime list"
    );
    target
}

/// The resumable kernel as a [`PrimeSieve`] strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentedSieve;

impl PrimeSieve for SegmentedSieve {
    fn name(&self) -> &'static str {
        "segmented"
    }

    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
        extend_primes(primes, from, to);
    }
}
