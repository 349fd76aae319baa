//! Single-owner prime cache
//!
//! `PrimeDb` keeps every prime found so far and the boundary up to which the
//! list is complete. Queries past the boundary extend the list through the
//! configured [`PrimeSieve`]; everything at or below it is answered from
//! memory. Not thread-safe: use [`SharedPrimeStore`](crate::SharedPrimeStore)
//! when several callers share one cache.

use primecache_core::{
    quick_classify, Limits, OracleResult, PrimeOracle, PrimeSieve, SEED_BOUNDARY, SEED_PRIMES,
};
use primecache_sieve::SegmentedSieve;
use tracing::debug;

use crate::config::OracleConfig;
use crate::{store_label, PendingExtension};

/// Memoizing prime cache for a single owner.
#[derive(Debug, Clone)]
pub struct PrimeDb<S = SegmentedSieve> {
    /// Every prime `<= boundary`, increasing
    primes: Vec<u64>,
    /// Largest integer whose primality is known
    boundary: u64,
    sieve: S,
    limits: Limits,
}

impl PrimeDb<SegmentedSieve> {
    /// Create a cache seeded with `2, 3, 5, 7` and boundary 10
    pub fn new() -> Self {
        Self::with_sieve(SegmentedSieve)
    }

    /// Create a cache from configuration, sieving up to `prewarm` if set
    pub fn from_config(config: &OracleConfig) -> OracleResult<Self> {
        config.validate()?;
        let mut db = Self::new().with_limits(config.limits());
        if let Some(prewarm) = config.prewarm {
            db.ensure(prewarm)?;
        }
        Ok(db)
    }
}

impl Default for PrimeDb<SegmentedSieve> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PrimeSieve> PrimeDb<S> {
    /// Create a seeded cache that extends itself with `sieve`
    pub fn with_sieve(sieve: S) -> Self {
        PrimeDb {
            primes: SEED_PRIMES.to_vec(),
            boundary: SEED_BOUNDARY,
            sieve,
            limits: Limits::default(),
        }
    }

    /// Replace the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Largest integer whose primality is known
    pub fn boundary(&self) -> u64 {
        self.boundary
    }

    /// Number of primes found so far
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    /// Always false: the seed primes are present from construction
    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Every prime found so far
    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    /// Limits enforced by this cache
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Make sure every integer up to `n` is classified.
    ///
    /// No-op when `n` is already covered; otherwise extends the list and moves
    /// the boundary to exactly `n`.
    ///
    /// # Errors
    ///
    /// `BoundExceeded` if `n` is past the configured maximum.
    pub fn ensure(&mut self, n: u64) -> OracleResult<()> {
        if n <= self.boundary {
            return Ok(());
        }
        let n = self.limits.check_bound(n)?;
        let from = self.boundary;
        let mut pending = PendingExtension::begin(&mut self.primes);
        self.sieve
            .compute_primes_in_range(&mut *pending.primes, from, n);
        pending.commit();
        self.boundary = n;
        debug!(from, to = n, primes = self.primes.len(), "moved prime boundary");
        Ok(())
    }

    /// Whether `n` is prime, extending the cache first if needed.
    pub fn contains(&mut self, n: i64) -> OracleResult<bool> {
        if let Some(answer) = quick_classify(n) {
            return Ok(answer);
        }
        let n = n as u64;
        self.ensure(n)?;
        Ok(self.primes.binary_search(&n).is_ok())
    }

    /// Every prime `<= n`, extending the cache first if needed.
    pub fn primes_up_to(&mut self, n: i64) -> OracleResult<Vec<u64>> {
        if n < 2 {
            return Ok(Vec::new());
        }
        let n = n as u64;
        self.ensure(n)?;
        let end = self.primes.partition_point(|&p| p <= n);
        Ok(self.primes[..end].to_vec())
    }

    /// Iterate over all primes in order, growing the cache on demand.
    pub fn iter(&mut self) -> PrimeIter<'_, S> {
        PrimeIter { db: self, index: 0 }
    }
}

/// Lazily extending iterator over a [`PrimeDb`].
///
/// Whenever the cursor reaches the end of the list the target bound doubles
/// (`2 * boundary + 1`) until at least one new prime has been appended. The
/// iterator only ends once the cache's limit is exhausted.
pub struct PrimeIter<'a, S> {
    db: &'a mut PrimeDb<S>,
    index: usize,
}

impl<S: PrimeSieve> Iterator for PrimeIter<'_, S> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.index >= self.db.primes.len() {
            let max = self.db.limits.max_bound;
            if self.db.boundary >= max {
                return None;
            }
            let next = self
                .db
                .boundary
                .saturating_mul(2)
                .saturating_add(1)
                .min(max);
            self.db.ensure(next).ok()?;
        }
        let prime = self.db.primes[self.index];
        self.index += 1;
        Some(prime)
    }
}

impl<S: PrimeSieve> PrimeOracle for PrimeDb<S> {
    fn name(&self) -> String {
        store_label("memo", &self.sieve)
    }

    fn is_prime(&mut self, n: i64) -> OracleResult<bool> {
        self.contains(n)
    }

    fn primes_up_to(&mut self, n: i64) -> OracleResult<Vec<u64>> {
        PrimeDb::primes_up_to(self, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primecache_core::OracleError;
    use primecache_sieve::{NaiveSieve, SqrtBoundedSieve};

    /// Appends the real primes for the first call, then panics.
    struct FailsOnce {
        failed: std::sync::atomic::AtomicBool,
    }

    impl PrimeSieve for FailsOnce {
        fn name(&self) -> &'static str {
            "fails-once"
        }

        fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
            SegmentedSieve.compute_primes_in_range(primes, from, to);
            if !self.failed.swap(true, std::sync::atomic::Ordering::Relaxed) {
                panic!("strategy failed after appending");
            }
        }
    }

    #[test]
    fn test_unwound_extension_leaves_cache_unchanged() {
        let mut db = PrimeDb::with_sieve(FailsOnce {
            failed: std::sync::atomic::AtomicBool::new(false),
        });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| db.ensure(100)));
        assert!(result.is_err());
        assert_eq!(db.boundary(), 10);
        assert_eq!(db.primes(), &[2, 3, 5, 7]);

        db.ensure(200).unwrap();
        assert_eq!(db.primes(), SqrtBoundedSieve.primes_up_to(200).as_slice());
    }

    #[test]
    fn test_new_is_seeded() {
        let db = PrimeDb::new();
        assert_eq!(db.primes(), &[2, 3, 5, 7]);
        assert_eq!(db.boundary(), 10);
        assert_eq!(db.len(), 4);
    }

    #[test]
    fn test_contains_quick_answers_do_not_extend() {
        let mut db = PrimeDb::new();
        assert!(!db.contains(-10).unwrap());
        assert!(!db.contains(1).unwrap());
        assert!(db.contains(2).unwrap());
        assert!(!db.contains(1_000_000).unwrap());
        assert_eq!(db.boundary(), 10);
    }

    #[test]
    fn test_contains_extends_to_query() {
        let mut db = PrimeDb::new();
        assert!(db.contains(97).unwrap());
        assert_eq!(db.boundary(), 97);
        assert!(!db.contains(91).unwrap());
        assert_eq!(db.boundary(), 97);
    }

    #[test]
    fn test_ensure_is_monotonic() {
        let mut db = PrimeDb::new();
        for n in [500u64, 20, 800, 799, 11] {
            db.ensure(n).unwrap();
        }
        assert_eq!(db.boundary(), 800);
    }

    #[test]
    fn test_ensure_twice_appends_nothing() {
        let mut db = PrimeDb::new();
        db.ensure(1000).unwrap();
        let before = db.primes().to_vec();
        db.ensure(1000).unwrap();
        assert_eq!(db.primes(), before.as_slice());
    }

    #[test]
    fn test_primes_up_to_copies_prefix() {
        let mut db = PrimeDb::new();
        db.ensure(1000).unwrap();
        assert_eq!(db.primes_up_to(20).unwrap(), vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert!(db.primes_up_to(1).unwrap().is_empty());
        assert!(db.primes_up_to(-4).unwrap().is_empty());
        assert_eq!(db.primes_up_to(2).unwrap(), vec![2]);
    }

    #[test]
    fn test_resume_regression_1765() {
        let mut db = PrimeDb::new();
        assert!(!db.contains(1683).unwrap());
        assert!(!db.contains(1765).unwrap());

        let mut db = PrimeDb::new();
        assert!(db.contains(11).unwrap());
        assert!(!db.contains(1765).unwrap());

        let mut db = PrimeDb::new();
        db.primes_up_to(12).unwrap();
        assert_eq!(db.boundary(), 12);
        assert!(!db.contains(1765).unwrap());
    }

    #[test]
    fn test_iterator_yields_primes_in_order() {
        let mut db = PrimeDb::new();
        let first: Vec<u64> = db.iter().take(30).collect();
        assert_eq!(first, SqrtBoundedSieve.primes_up_to(113));
        assert!(db.boundary() >= 113);
    }

    #[test]
    fn test_iterator_doubles_bound() {
        let mut db = PrimeDb::new();
        let mut it = db.iter();
        for _ in 0..4 {
            it.next();
        }
        assert_eq!(it.next(), Some(11));
        drop(it);
        assert_eq!(db.boundary(), 21);
    }

    #[test]
    fn test_iterator_ends_at_limit() {
        let mut db = PrimeDb::new().with_limits(Limits::new(30));
        let all: Vec<u64> = db.iter().collect();
        assert_eq!(all, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(db.boundary(), 30);
    }

    #[test]
    fn test_bound_exceeded() {
        let mut db = PrimeDb::new().with_limits(Limits::for_testing());
        assert!(matches!(
            db.contains(10_001),
            Err(OracleError::BoundExceeded { requested: 10_001, max: 10_000 })
        ));
        assert_eq!(db.boundary(), 10);
    }

    #[test]
    fn test_baseline_strategy_store() {
        let mut memo = PrimeDb::with_sieve(NaiveSieve);
        let mut kernel = PrimeDb::new();
        for n in [50i64, 49, 300, 1765] {
            assert_eq!(memo.primes_up_to(n).unwrap(), kernel.primes_up_to(n).unwrap());
        }
        assert_eq!(PrimeOracle::name(&memo), "memo/naive");
        assert_eq!(PrimeOracle::name(&kernel), "memo");
    }

    #[test]
    fn test_from_config_prewarms() {
        let config = OracleConfig {
            prewarm: Some(5000),
            ..OracleConfig::default()
        };
        let db = PrimeDb::from_config(&config).unwrap();
        assert_eq!(db.boundary(), 5000);
        assert_eq!(db.primes().last(), Some(&4999));
    }
}
