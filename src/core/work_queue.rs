//! FIFO queue of opaque work items.
//!
//! Producers may append from any thread while the scheduling thread drains.
//! The lock is only held for the append, pop or clear itself, never while a
//! processing action runs.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::core::SchedulerError;

/// Insertion-ordered queue of work items.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    /// Lifetime count of appended items.
    total_enqueued: AtomicU64,
}

impl<T> WorkQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            total_enqueued: AtomicU64::new(0),
        }
    }

    /// Append every item to the tail, preserving iteration order.
    ///
    /// The whole batch is appended under one lock acquisition, so two
    /// concurrent batches never interleave. Returns the number appended.
    pub fn enqueue<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        // Collect outside the lock; the iterator may be arbitrarily slow.
        let batch: Vec<T> = items.into_iter().collect();
        let count = batch.len();
        if count == 0 {
            return 0;
        }
        let mut items = self.items.lock();
        items.extend(batch);
        // Counted under the lock so observers never see more items than appends.
        self.total_enqueued.fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Append a single item.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        self.total_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove and return the head.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::EmptyQueue`] if there is nothing queued.
    pub fn dequeue_head(&self) -> Result<T, SchedulerError> {
        self.try_dequeue().ok_or(SchedulerError::EmptyQueue)
    }

    /// Remove and return the head if any. Check and pop happen under one lock.
    pub fn try_dequeue(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Discard all pending items and return how many were dropped.
    pub fn clear(&self) -> usize {
        // Swap under the lock, drop the items after releasing it.
        let discarded = std::mem::take(&mut *self.items.lock());
        discarded.len()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether no items are pending.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Number of items ever appended to this queue.
    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued.load(Ordering::Relaxed)
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("len", &self.len())
            .field("total_enqueued", &self.total_enqueued())
            .finish()
    }
}
