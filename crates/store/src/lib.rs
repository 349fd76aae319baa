//! Prime stores for primecache
//!
//! This crate owns the growing list of known primes:
//! - [`PrimeDb`]: single-owner cache, `&mut self` API
//! - [`SharedPrimeStore`]: clonable handle safe to query from many threads,
//!   using a lock-free boundary check plus a double-checked write lock
//! - [`PrimeStream`]: abandonable enumeration backed by a bounded queue
//! - [`OracleConfig`]: `toml` configuration for building stores
//!
//! Stores are always constructed explicitly and passed around by the caller;
//! there is no process-wide cache.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod memo;
pub mod shared;
pub mod stream;

pub use config::OracleConfig;
pub use memo::{PrimeDb, PrimeIter};
pub use shared::{SharedPrimeStore, StoreState, StoreStats};
pub use stream::{BoundedQueue, PrimeStream};

use primecache_core::PrimeSieve;
use tracing::error;

/// Display name for a store, qualified when it does not use the default kernel.
pub(crate) fn store_label<S: PrimeSieve>(base: &str, sieve: &S) -> String {
    match sieve.name() {
        "segmented" => base.to_string(),
        other => format!("{}/{}", base, other),
    }
}

/// Rolls the prime list back to its pre-extension length unless committed.
pub(crate) struct PendingExtension<'a> {
    pub(crate) primes: &'a mut Vec<u64>,
    known: usize,
    committed: bool,
}

impl<'a> PendingExtension<'a> {
    pub(crate) fn begin(primes: &'a mut Vec<u64>) -> Self {
        let known = primes.len();
        PendingExtension {
            primes,
            known,
            committed: false,
        }
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingExtension<'_> {
    fn drop(&mut self) {
        if !self.committed {
            error!(
                appended = self.primes.len().saturating_sub(self.known),
                "extension unwound, discarding partial primes"
            );
            self.primes.truncate(self.known);
        }
    }
}
