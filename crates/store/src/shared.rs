//! Concurrency-safe prime cache
//!
//! `SharedPrimeStore` is a cheaply clonable handle; every clone talks to the
//! same list of primes. Many threads may query and extend it at once.
//!
//! ## Extension protocol
//!
//! ```text
//! ensure(n):
//!   1. boundary.load(Acquire) >= n        -> done, no lock taken   (fast path)
//!   2. inner.write()                       -> exclusive lock
//!   3. inner.boundary >= n                 -> done, someone else extended (re-check)
//!   4. state = Extending; sieve (inner.boundary, n]; inner.boundary = n
//!   5. boundary.store(n, Release); state = Ready; unlock
//! ```
//!
//! Step 1 keeps covered queries off the lock entirely. Step 3 stops a thread
//! that queued behind a larger extension from sieving again, and from moving
//! the boundary backwards: a write only ever happens with `n > inner.boundary`.
//!
//! The atomic boundary is published only after the list has been appended to
//! and while the write lock is still held, so a reader that observes
//! `boundary >= n` and then takes the read lock always sees those primes.
//!
//! ## State machine
//!
//! `Ready -> Extending -> Ready`. There is no error state: an extension that
//! passed the bound check cannot fail. If the strategy panics instead, the
//! list is truncated back to its length before the extension and the
//! boundary stays where it was.
//!
//! ## Preconditions
//!
//! Bounds must fit in `i64` and not exceed the configured `max_bound`;
//! larger requests are rejected with `BoundExceeded` before any work starts.

use parking_lot::RwLock;
use primecache_core::{
    quick_classify, Limits, OracleResult, PrimeOracle, PrimeSieve, SEED_BOUNDARY, SEED_PRIMES,
};
use primecache_sieve::SegmentedSieve;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::config::OracleConfig;
use crate::{store_label, PendingExtension};
use crate::stream::{BoundedQueue, PrimeStream};

/// Lifecycle of a store with respect to extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum StoreState {
    /// Boundary stable; no extension in flight
    Ready = 0,
    /// Write lock held, sieve running
    Extending = 1,
}

impl StoreState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => StoreState::Extending,
            _ => StoreState::Ready,
        }
    }
}

/// Store metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Largest integer whose primality is known
    pub boundary: u64,
    /// Number of primes in the list
    pub primes: usize,
    /// Extensions that actually ran the sieve
    pub extensions: u64,
    /// Slow-path callers that found the work already done after locking
    pub recheck_hits: u64,
    /// Stream producers that have not exited yet
    pub active_streams: usize,
    /// Current state
    pub state: StoreState,
}

struct Inner {
    /// Every prime `<= boundary`, increasing
    primes: Vec<u64>,
    /// Authoritative boundary, only changed under the write lock
    boundary: u64,
}

struct Shared<S> {
    /// Published copy of `Inner::boundary` for the lock-free check
    boundary: AtomicU64,
    state: AtomicU8,
    inner: RwLock<Inner>,
    sieve: S,
    limits: Limits,
    stream_buffer: usize,
    extensions: AtomicU64,
    recheck_hits: AtomicU64,
    active_streams: AtomicUsize,
}

/// Puts the state back to `Ready` even if the sieve panics.
struct ExtendingGuard<'a> {
    state: &'a AtomicU8,
}

impl<'a> ExtendingGuard<'a> {
    fn enter(state: &'a AtomicU8) -> Self {
        state.store(StoreState::Extending as u8, Ordering::Release);
        ExtendingGuard { state }
    }
}

impl Drop for ExtendingGuard<'_> {
    fn drop(&mut self) {
        self.state.store(StoreState::Ready as u8, Ordering::Release);
    }
}

/// RAII guard that counts a live stream producer.
///
/// Decrements on drop, so a producer that panics, or a thread that never
/// spawned, is not counted forever.
struct ActiveStreamGuard<S> {
    shared: Arc<Shared<S>>,
}

impl<S> ActiveStreamGuard<S> {
    fn new(shared: Arc<Shared<S>>) -> Self {
        shared.active_streams.fetch_add(1, Ordering::AcqRel);
        ActiveStreamGuard { shared }
    }
}

impl<S> Drop for ActiveStreamGuard<S> {
    fn drop(&mut self) {
        self.shared.active_streams.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Marks the queue finished when the producer exits, panic or not, so the
/// consumer never waits on a dead producer.
struct FinishOnDrop<'a>(&'a BoundedQueue<u64>);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Thread-safe memoizing prime cache.
pub struct SharedPrimeStore<S = SegmentedSieve> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for SharedPrimeStore<S> {
    fn clone(&self) -> Self {
        SharedPrimeStore {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl SharedPrimeStore<SegmentedSieve> {
    /// Create a store seeded with `2, 3, 5, 7` and boundary 10
    pub fn new() -> Self {
        Self::with_sieve(SegmentedSieve)
    }

    /// Create a store from configuration, sieving up to `prewarm` if set
    pub fn from_config(config: &OracleConfig) -> OracleResult<Self> {
        Self::with_sieve_and_config(SegmentedSieve, config)
    }
}

impl Default for SharedPrimeStore<SegmentedSieve> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PrimeSieve + 'static> SharedPrimeStore<S> {
    /// Create a seeded store that extends itself with `sieve`
    pub fn with_sieve(sieve: S) -> Self {
        Self::build(sieve, Limits::default(), OracleConfig::default().stream_buffer)
    }

    /// Create a store with a custom strategy and configuration
    pub fn with_sieve_and_config(sieve: S, config: &OracleConfig) -> OracleResult<Self> {
        config.validate()?;
        let store = Self::build(sieve, config.limits(), config.stream_buffer);
        if let Some(prewarm) = config.prewarm {
            store.ensure(prewarm)?;
        }
        Ok(store)
    }

    fn build(sieve: S, limits: Limits, stream_buffer: usize) -> Self {
        SharedPrimeStore {
            shared: Arc::new(Shared {
                boundary: AtomicU64::new(SEED_BOUNDARY),
                state: AtomicU8::new(StoreState::Ready as u8),
                inner: RwLock::new(Inner {
                    primes: SEED_PRIMES.to_vec(),
                    boundary: SEED_BOUNDARY,
                }),
                sieve,
                limits,
                stream_buffer,
                extensions: AtomicU64::new(0),
                recheck_hits: AtomicU64::new(0),
                active_streams: AtomicUsize::new(0),
            }),
        }
    }

    /// Largest integer whose primality is known
    pub fn boundary(&self) -> u64 {
        self.shared.boundary.load(Ordering::Acquire)
    }

    /// Current lifecycle state
    pub fn state(&self) -> StoreState {
        StoreState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Limits enforced by this store
    pub fn limits(&self) -> Limits {
        self.shared.limits
    }

    /// Number of primes found so far
    pub fn len(&self) -> usize {
        self.shared.inner.read().primes.len()
    }

    /// Always false: the seed primes are present from construction
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every prime found so far
    pub fn snapshot(&self) -> Vec<u64> {
        self.shared.inner.read().primes.clone()
    }

    /// Return a snapshot of store metrics.
    pub fn stats(&self) -> StoreStats {
        let (boundary, primes) = {
            let inner = self.shared.inner.read();
            (inner.boundary, inner.primes.len())
        };
        StoreStats {
            boundary,
            primes,
            extensions: self.shared.extensions.load(Ordering::Relaxed),
            recheck_hits: self.shared.recheck_hits.load(Ordering::Relaxed),
            active_streams: self.shared.active_streams.load(Ordering::Acquire),
            state: self.state(),
        }
    }

    /// Make sure every integer up to `n` is classified.
    ///
    /// Blocks while another thread holds the write lock. Returns once the
    /// boundary is at least `n`.
    ///
    /// # Errors
    ///
    /// `BoundExceeded` if `n` is past the configured maximum.
    pub fn ensure(&self, n: u64) -> OracleResult<()> {
        if n <= self.shared.boundary.load(Ordering::Acquire) {
            return Ok(());
        }
        let n = self.shared.limits.check_bound(n)?;

        let mut inner = self.shared.inner.write();
        if inner.boundary >= n {
            self.shared.recheck_hits.fetch_add(1, Ordering::Relaxed);
            trace!(requested = n, boundary = inner.boundary, "extension already done");
            return Ok(());
        }

        let from = inner.boundary;
        {
            let _extending = ExtendingGuard::enter(&self.shared.state);
            let mut pending = PendingExtension::begin(&mut inner.primes);
            self.shared
                .sieve
                .compute_primes_in_range(&mut *pending.primes, from, n);
            pending.commit();
            inner.boundary = n;
            self.shared.boundary.store(n, Ordering::Release);
        }
        self.shared.extensions.fetch_add(1, Ordering::Relaxed);
        info!(from, to = n, primes = inner.primes.len(), "moved prime boundary");
        Ok(())
    }

    /// Whether `n` is prime, extending the store first if needed.
    pub fn contains(&self, n: i64) -> OracleResult<bool> {
        if let Some(answer) = quick_classify(n) {
            return Ok(answer);
        }
        let n = n as u64;
        self.ensure(n)?;
        let inner = self.shared.inner.read();
        Ok(inner.primes.binary_search(&n).is_ok())
    }

    /// Every prime `<= n`, extending the store first if needed.
    pub fn primes_up_to(&self, n: i64) -> OracleResult<Vec<u64>> {
        if n < 2 {
            return Ok(Vec::new());
        }
        let n = n as u64;
        self.ensure(n)?;
        Ok(self.copy_prefix(n))
    }

    fn copy_prefix(&self, n: u64) -> Vec<u64> {
        let inner = self.shared.inner.read();
        let end = inner.primes.partition_point(|&p| p <= n);
        inner.primes[..end].to_vec()
    }

    /// Stream every prime `<= n` from a background producer.
    ///
    /// The bound is validated up front; extension happens on the producer
    /// thread. Dropping the returned stream early cancels the producer.
    ///
    /// # Errors
    ///
    /// `BoundExceeded` for a bound past the maximum, `Io` if the producer
    /// thread cannot be spawned.
    pub fn stream(&self, n: i64) -> OracleResult<PrimeStream> {
        let target = if n < 2 {
            None
        } else {
            Some(self.shared.limits.check_bound(n as u64)?)
        };

        let queue = Arc::new(BoundedQueue::new(self.shared.stream_buffer));
        let producer_queue = Arc::clone(&queue);
        let store = self.clone();
        let active = ActiveStreamGuard::new(Arc::clone(&self.shared));

        let handle = std::thread::Builder::new()
            .name("primecache-stream".to_string())
            .spawn(move || {
                let _active = active;
                let _finish = FinishOnDrop(producer_queue.as_ref());
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    store.produce(target, &producer_queue)
                }));
                if let Err(e) = result {
                    error!(
                        "stream producer panicked: {:?}",
                        e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
                    );
                }
            })?;

        Ok(PrimeStream::new(queue, Some(handle)))
    }

    fn produce(&self, target: Option<u64>, queue: &BoundedQueue<u64>) {
        let Some(n) = target else {
            return;
        };
        if queue.is_cancelled() {
            return;
        }
        if let Err(e) = self.ensure(n) {
            error!(bound = n, error = %e, "stream producer could not extend");
            return;
        }
        // Read lock held only for the copy, never while blocked on the queue.
        for prime in self.copy_prefix(n) {
            if !queue.push(prime) {
                trace!(bound = n, "stream abandoned by consumer");
                return;
            }
        }
    }

    /// Whether `n` is prime, answered by scanning a stream.
    ///
    /// Stops reading as soon as the answer is known and abandons the rest of
    /// the stream; the producer is cancelled rather than drained.
    pub fn contains_streaming(&self, n: i64) -> OracleResult<bool> {
        if let Some(answer) = quick_classify(n) {
            return Ok(answer);
        }
        let target = n as u64;
        let stream = self.stream(n)?;
        for prime in stream {
            if prime >= target {
                return Ok(prime == target);
            }
        }
        Ok(false)
    }
}

impl<S: PrimeSieve + 'static> PrimeOracle for SharedPrimeStore<S> {
    fn name(&self) -> String {
        store_label("shared", &self.shared.sieve)
    }

    fn is_prime(&mut self, n: i64) -> OracleResult<bool> {
        self.contains(n)
    }

    fn primes_up_to(&mut self, n: i64) -> OracleResult<Vec<u64>> {
        SharedPrimeStore::primes_up_to(self, n)
    }
}

impl<S: PrimeSieve + 'static> std::fmt::Debug for SharedPrimeStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPrimeStore")
            .field("sieve", &self.shared.sieve.name())
            .field("boundary", &self.boundary())
            .field("state", &self.state())
            .finish()
    }
}
