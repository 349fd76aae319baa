//! primecache - incremental prime number cache
//!
//! primecache answers two questions, "is `n` prime?" and "which primes are
//! `<= n`?", from a cache that grows on demand. Each query past the cached
//! boundary resumes a segmented sieve of Eratosthenes from where the last one
//! stopped instead of starting over.
//!
//! # Quick Start
//!
//! ```
//! use primecache::{PrimeDb, SharedPrimeStore};
//!
//! // Single owner
//! let mut db = PrimeDb::new();
//! assert!(db.contains(97)?);
//! assert_eq!(db.primes_up_to(20)?, vec![2, 3, 5, 7, 11, 13, 17, 19]);
//!
//! // Shared between threads
//! let store = SharedPrimeStore::new();
//! let handle = {
//!     let store = store.clone();
//!     std::thread::spawn(move || store.contains(1_000_003))
//! };
//! assert!(handle.join().unwrap()?);
//! let first: Vec<u64> = store.stream(1_000)?.take(5).collect();
//! assert_eq!(first, vec![2, 3, 5, 7, 11]);
//! # Ok::<(), primecache::OracleError>(())
//! ```
//!
//! # Layout
//!
//! - [`primecache_core`]: errors, limits, the `PrimeSieve` and `PrimeOracle` traits
//! - [`primecache_sieve`]: the resumable kernel and four one-shot baselines
//! - [`primecache_store`]: `PrimeDb`, `SharedPrimeStore`, `PrimeStream`, configuration

pub use primecache_core::*;
pub use primecache_sieve::{
    baseline_sieves, extend_primes, resume_point, sieve_by_name, IndexOptimizedSieve, NaiveSieve,
    OddSkipSieve, OneShot, SegmentedSieve, SqrtBoundedSieve, SIEVE_NAMES,
};
pub use primecache_store::{
    OracleConfig, PrimeDb, PrimeIter, PrimeStream, SharedPrimeStore, StoreState, StoreStats,
};
