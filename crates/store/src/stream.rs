//! Abandonable prime enumeration
//!
//! A [`PrimeStream`] hands out the primes up to some bound one at a time. A
//! background producer fills a [`BoundedQueue`]; the consumer drains it
//! through the `Iterator` impl. `None` marks the end of the stream.
//!
//! ## Abandonment
//!
//! Consumers may stop early (a membership scan that found its value, a
//! `take(n)`). Dropping the stream sets the queue's cancellation flag and
//! wakes the producer, which stops pushing and exits on its own. Nothing is
//! left blocked on a full queue and no thread outlives its work.
//!
//! ```text
//! producer: ensure(n) -> copy prefix -> push, push, [full: wait] ... finish
//! consumer: next, next, drop ──cancel──> producer wakes, returns
//! ```

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

struct QueueState<T> {
    items: VecDeque<T>,
    finished: bool,
}

/// Fixed-capacity single-producer/single-consumer queue with cancellation.
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    cancelled: AtomicBool,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BoundedQueue {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                finished: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            cancelled: AtomicBool::new(false),
            capacity,
        }
    }

    /// Maximum number of buffered items
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently buffered items
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether nothing is buffered right now
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the consumer has given up on this queue
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Enqueue `item`, blocking while the queue is full.
    ///
    /// Returns `false` without enqueueing once the queue is cancelled; the
    /// producer should stop.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.state.lock();
        loop {
            if self.is_cancelled() {
                return false;
            }
            if state.items.len() < self.capacity {
                state.items.push_back(item);
                self.not_empty.notify_one();
                return true;
            }
            self.not_full.wait(&mut state);
        }
    }

    /// Dequeue the next item, blocking while the queue is empty.
    ///
    /// Returns `None` once the producer has finished and the buffer is
    /// drained, or as soon as the queue is cancelled.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if self.is_cancelled() {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.finished {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Signal that no more items will be pushed.
    pub fn finish(&self) {
        let mut state = self.state.lock();
        state.finished = true;
        self.not_empty.notify_all();
    }

    /// Abandon the queue: drop buffered items and wake both sides.
    pub fn cancel(&self) {
        // Set the flag under the lock so a side between its check and its
        // wait() cannot miss the notification.
        let mut state = self.state.lock();
        self.cancelled.store(true, Ordering::Release);
        state.items.clear();
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

/// Finite, non-restartable stream of primes up to a bound.
///
/// Produced by [`SharedPrimeStore::stream`](crate::SharedPrimeStore::stream).
/// Dropping it before the end cancels the producer.
pub struct PrimeStream {
    queue: Arc<BoundedQueue<u64>>,
    producer: Option<JoinHandle<()>>,
}

impl PrimeStream {
    pub(crate) fn new(queue: Arc<BoundedQueue<u64>>, producer: Option<JoinHandle<()>>) -> Self {
        PrimeStream { queue, producer }
    }

    /// Stop the producer without waiting for it.
    pub fn cancel(&self) {
        self.queue.cancel();
    }

    /// Whether the stream has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.queue.is_cancelled()
    }

    /// Cancel the stream and wait for the producer thread to exit.
    ///
    /// The producer may still be finishing an extension it started before
    /// the cancellation; `close` waits for that too.
    pub fn close(mut self) {
        self.queue.cancel();
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}

impl Iterator for PrimeStream {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.queue.pop()
    }
}

impl FusedIterator for PrimeStream {}

impl Drop for PrimeStream {
    fn drop(&mut self) {
        self.queue.cancel();
    }
}

impl std::fmt::Debug for PrimeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimeStream")
            .field("buffered", &self.queue.len())
            .field("cancelled", &self.queue.is_cancelled())
            .finish()
    }
}
