//! Algorithm registry: name -> boxed oracle.

use primecache_core::{OracleError, OracleResult, PrimeOracle};
use primecache_sieve::{sieve_by_name, OneShot};
use primecache_store::{OracleConfig, PrimeDb, SharedPrimeStore};

/// Every algorithm the harness can drive, in report order.
pub const ALGORITHMS: [&str; 6] = [
    "naive",
    "odd-skip",
    "sqrt-bounded",
    "index-optimized",
    "memo",
    "shared",
];

/// One-line description for `list`.
pub fn describe(name: &str) -> &'static str {
    match name {
        "naive" => "sieve of Eratosthenes over every integer, recomputed per query",
        "odd-skip" => "odd-only sieve, recomputed per query",
        "sqrt-bounded" => "odd-only sieve marking from p*p up to sqrt(n), recomputed per query",
        "index-optimized" => "odd-index bit layout, recomputed per query",
        "memo" => "single-owner cache extended by the segmented sieve",
        "shared" => "thread-safe cache extended by the segmented sieve",
        _ => "",
    }
}

/// Build a fresh oracle for `name`.
///
/// Baselines are wrapped in [`OneShot`]; `memo` and `shared` are built from
/// `config`, including its limits and prewarm bound.
pub fn build_oracle(name: &str, config: &OracleConfig) -> OracleResult<Box<dyn PrimeOracle>> {
    match name {
        "memo" => Ok(Box::new(PrimeDb::from_config(config)?)),
        "shared" => Ok(Box::new(SharedPrimeStore::from_config(config)?)),
        other if ALGORITHMS.contains(&other) => {
            config.validate()?;
            let sieve = sieve_by_name(other)?;
            Ok(Box::new(OneShot::with_limits(sieve, config.limits())))
        }
        other => Err(OracleError::UnknownAlgorithm(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_algorithm_builds_and_agrees() {
        let config = OracleConfig::default();
        let expected = vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29];
        for name in ALGORITHMS {
            let mut oracle = build_oracle(name, &config).unwrap();
            assert_eq!(oracle.primes_up_to(30).unwrap(), expected, "{}", name);
            assert!(oracle.is_prime(97).unwrap(), "{}", name);
            assert!(!oracle.is_prime(1765).unwrap(), "{}", name);
            assert!(!describe(name).is_empty());
        }
    }

    #[test]
    fn test_oracle_names() {
        let config = OracleConfig::default();
        for name in ALGORITHMS {
            assert_eq!(build_oracle(name, &config).unwrap().name(), name);
        }
    }

    #[test]
    fn test_kernel_is_not_a_oneshot_algorithm() {
        let err = build_oracle("segmented", &OracleConfig::default()).err().unwrap();
        assert!(matches!(err, OracleError::UnknownAlgorithm(_)));
    }

    #[test]
    fn test_limits_apply_to_baselines() {
        let config = OracleConfig {
            max_bound: 100,
            ..OracleConfig::default()
        };
        let mut oracle = build_oracle("naive", &config).unwrap();
        assert!(matches!(
            oracle.primes_up_to(101),
            Err(OracleError::BoundExceeded { .. })
        ));
    }
}
