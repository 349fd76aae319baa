//! Conformance Tests
//!
//! Every oracle, whatever its caching strategy, must give the same answers:
//!
//! - Reference correctness: `primes_up_to` matches trial division
//! - Membership: `is_prime` agrees with the listing on `[-10, max)`
//! - Resume: extending from any earlier boundary, odd or even, stays correct
//! - Idempotence and monotonicity of the memoizing stores
//! - Configuration: limits loaded from a file are enforced

mod common;

use std::io::Write;

use common::*;
use primecache::{
    OracleConfig, OracleError, PrimeDb, PrimeOracle, PrimeSieve, SharedPrimeStore, SEED_BOUNDARY,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// REFERENCE CORRECTNESS
// =============================================================================

#[test]
fn test_reference_list_shape() {
    let reference = primes_reference(REFERENCE_MAX);
    assert_eq!(reference.len(), 200);
    assert_eq!(reference[..5], [2, 3, 5, 7, 11]);
    assert_eq!(reference.last(), Some(&1223));
}

#[test]
fn test_every_oracle_lists_reference_primes() {
    let reference = primes_reference(REFERENCE_MAX);
    for mut oracle in all_oracles() {
        let got = oracle.primes_up_to(REFERENCE_MAX as i64).unwrap();
        assert_eq!(got, reference, "{}", oracle.name());
    }
}

#[test]
fn test_every_sieve_lists_reference_primes() {
    let reference = primes_reference(REFERENCE_MAX);
    for sieve in all_sieves() {
        assert_eq!(sieve.primes_up_to(REFERENCE_MAX), reference, "{}", sieve.name());
    }
}

#[test]
fn test_every_oracle_membership_on_range() {
    for mut oracle in all_oracles() {
        let name = oracle.name();
        for i in -10i64..REFERENCE_MAX as i64 {
            assert_eq!(
                oracle.is_prime(i).unwrap(),
                is_prime_reference(i),
                "{} on {}",
                name,
                i
            );
        }
    }
}

#[test]
fn test_small_and_negative_bounds_are_empty() {
    for mut oracle in all_oracles() {
        for n in [-5i64, 0, 1] {
            assert!(oracle.primes_up_to(n).unwrap().is_empty(), "{}", oracle.name());
            assert!(!oracle.is_prime(n).unwrap(), "{}", oracle.name());
        }
        assert_eq!(oracle.primes_up_to(2).unwrap(), vec![2]);
    }
}

#[test]
fn test_listing_and_membership_agree_at_random_bounds() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut oracles = all_oracles();
    for _ in 0..40 {
        let n: i64 = rng.gen_range(-10..20_000);
        let expected = primes_reference(n.max(0) as u64);
        for oracle in oracles.iter_mut() {
            assert_eq!(oracle.primes_up_to(n).unwrap(), expected, "{} at {}", oracle.name(), n);
            assert_eq!(oracle.is_prime(n).unwrap(), is_prime_reference(n));
        }
    }
}

// =============================================================================
// RESUME REGRESSION
// =============================================================================

#[test]
fn test_resume_from_every_small_boundary() {
    let reference = primes_reference(2_000);
    for start in SEED_BOUNDARY..=60 {
        let mut db = PrimeDb::new();
        db.ensure(start).unwrap();
        assert!(!db.contains(1683).unwrap(), "start {}", start);
        assert!(!db.contains(1765).unwrap(), "start {}", start);
        assert_eq!(db.primes_up_to(2_000).unwrap(), reference, "start {}", start);

        let store = SharedPrimeStore::new();
        store.ensure(start).unwrap();
        assert!(!store.contains(1765).unwrap(), "start {}", start);
        assert_eq!(store.snapshot(), primes_reference(1765), "start {}", start);
    }
}

#[test]
fn test_resume_with_every_strategy() {
    for sieve in all_sieves() {
        let name = sieve.name();
        for start in [11u64, 12, 13, 48, 49, 50] {
            let mut primes = primes_reference(start);
            sieve.compute_primes_in_range(&mut primes, start, 1765);
            assert_eq!(primes, primes_reference(1765), "{} from {}", name, start);
        }
    }
}

// =============================================================================
// MEMOIZATION
// =============================================================================

#[test]
fn test_extension_is_idempotent() {
    let mut db = PrimeDb::new();
    let store = SharedPrimeStore::new();
    for n in [500u64, 500, 1_000, 999, 1_000] {
        db.ensure(n).unwrap();
        store.ensure(n).unwrap();
    }
    assert_eq!(db.boundary(), 1_000);
    assert_eq!(store.boundary(), 1_000);
    assert_eq!(db.primes(), primes_reference(1_000).as_slice());
    assert_eq!(store.snapshot(), primes_reference(1_000));
    assert_eq!(store.stats().extensions, 2);
}

#[test]
fn test_stream_matches_listing() {
    let store = SharedPrimeStore::new();
    for n in [-3i64, 2, 10, 11, 1223, 5_000] {
        let streamed: Vec<u64> = store.stream(n).unwrap().collect();
        assert_eq!(streamed, store.primes_up_to(n).unwrap(), "bound {}", n);
    }
}

#[test]
fn test_iterator_matches_reference() {
    let mut db = PrimeDb::new();
    let first: Vec<u64> = db.iter().take(200).collect();
    assert_eq!(first, primes_reference(REFERENCE_MAX));
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_config_file_limits_every_store() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_bound = 2000\nstream_buffer = 8\nprewarm = 1223").unwrap();
    let config = OracleConfig::from_file(file.path()).unwrap();

    let mut db = PrimeDb::from_config(&config).unwrap();
    assert_eq!(db.boundary(), 1223);
    assert!(matches!(
        db.contains(2001),
        Err(OracleError::BoundExceeded { requested: 2001, max: 2000 })
    ));

    let store = SharedPrimeStore::from_config(&config).unwrap();
    assert_eq!(store.boundary(), 1223);
    assert!(store.contains(1999).unwrap());
    assert!(matches!(
        store.primes_up_to(2001),
        Err(OracleError::BoundExceeded { .. })
    ));
    assert_eq!(store.boundary(), 1999);
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_stores_agree_with_reference(targets in prop::collection::vec(0u64..5_000, 1..12)) {
        let mut db = PrimeDb::new();
        let store = SharedPrimeStore::new();
        for &n in &targets {
            let expected = primes_reference(n);
            prop_assert_eq!(db.primes_up_to(n as i64).unwrap(), expected.clone());
            prop_assert_eq!(store.primes_up_to(n as i64).unwrap(), expected);
        }
        let max = targets.iter().copied().max().unwrap_or(0).max(SEED_BOUNDARY);
        prop_assert_eq!(db.boundary(), max);
        prop_assert_eq!(store.boundary(), max);
    }
}
