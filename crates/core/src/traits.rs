//! Trait definitions for prime computation
//!
//! Two seams:
//! - [`PrimeSieve`]: a strategy that grows a complete prefix of primes to a
//!   larger bound. The resumable kernel and every baseline implement it, so
//!   stores and the benchmark harness stay implementation-agnostic.
//! - [`PrimeOracle`]: the two questions external callers ask.

use crate::error::OracleResult;

/// Strategy for computing the primes in a range.
///
/// # Contract
///
/// On entry `primes` holds exactly the primes `<= from`, in increasing order.
/// On return it holds exactly the primes `<= to`. Nothing already in the list
/// is reordered or removed. `to <= from` leaves the list untouched.
pub trait PrimeSieve: Send + Sync {
    /// Short identifier used by registries and benchmark output
    fn name(&self) -> &'static str;

    /// Append every prime in `(from, to]` to `primes`
    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64);

    /// Compute every prime `<= n` from scratch
    fn primes_up_to(&self, n: u64) -> Vec<u64> {
        let mut primes = Vec::new();
        self.compute_primes_in_range(&mut primes, 0, n);
        primes
    }
}

impl<S: PrimeSieve + ?Sized> PrimeSieve for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
        (**self).compute_primes_in_range(primes, from, to)
    }
}

/// The operations the benchmark harness and other external callers consume.
///
/// Methods take `&mut self` so single-owner caches can implement it directly;
/// concurrent stores implement it by delegating to their `&self` API.
pub trait PrimeOracle: Send {
    /// Human-readable name of the implementation
    fn name(&self) -> String;

    /// Whether `n` is prime. `n <= 1` is `Ok(false)`.
    fn is_prime(&mut self, n: i64) -> OracleResult<bool>;

    /// Every prime `<= n` in increasing order. `n < 2` yields an empty list.
    fn primes_up_to(&mut self, n: i64) -> OracleResult<Vec<u64>>;
}

impl<O: PrimeOracle + ?Sized> PrimeOracle for Box<O> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn is_prime(&mut self, n: i64) -> OracleResult<bool> {
        (**self).is_prime(n)
    }

    fn primes_up_to(&mut self, n: i64) -> OracleResult<Vec<u64>> {
        (**self).primes_up_to(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trial division, enough to exercise the default methods.
    struct TrialDivision;

    impl PrimeSieve for TrialDivision {
        fn name(&self) -> &'static str {
            "trial-division"
        }

        fn compute_primes_in_range(&self, primes: &mut Vec<u64>, from: u64, to: u64) {
            for k in from.saturating_add(1).max(2)..=to {
                if (2..k).take_while(|d| d * d <= k).all(|d| k % d != 0) {
                    primes.push(k);
                }
            }
        }
    }

    #[test]
    fn test_default_primes_up_to() {
        assert_eq!(TrialDivision.primes_up_to(20), vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert!(TrialDivision.primes_up_to(1).is_empty());
    }

    #[test]
    fn test_boxed_sieve_delegates() {
        let boxed: Box<dyn PrimeSieve> = Box::new(TrialDivision);
        assert_eq!(boxed.name(), "trial-division");
        let mut primes = vec![2, 3, 5, 7];
        boxed.compute_primes_in_range(&mut primes, 10, 13);
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13]);
    }
}
