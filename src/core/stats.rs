//! Scheduler counters and their serializable snapshot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Point-in-time view of a scheduler, suitable for display or metrics export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Items waiting in the queue.
    pub queued: usize,
    /// Items ever appended to the queue.
    pub total_enqueued: u64,
    /// Items whose processing action succeeded since the last reset.
    pub processed: u64,
    /// Items whose processing action failed since the last reset.
    pub failed: u64,
    /// Drains that dequeued at least one item since the last reset.
    pub batches: u64,
    /// Cumulative processing time in milliseconds since the last reset.
    pub elapsed_ms: u64,
    /// Whether the scheduler is subscribed to trigger signals.
    pub attached: bool,
    /// Whether trigger signals are currently ignored.
    pub paused: bool,
    /// Whether the scheduler has been disposed.
    pub disposed: bool,
}

impl SchedulerStats {
    /// Cumulative processing time.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Shared counters (lock-free atomics).
///
/// Written only by the scheduling thread, read from any thread through
/// [`SchedulerHandle`](crate::core::SchedulerHandle).
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub processed: AtomicU64,
    pub failed: AtomicU64,
    pub batches: AtomicU64,
    pub elapsed_nanos: AtomicU64,
    pub attached: AtomicBool,
    pub paused: AtomicBool,
    pub disposed: AtomicBool,
}

impl SchedulerCounters {
    pub fn add_elapsed(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        self.processed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.batches.store(0, Ordering::Relaxed);
        self.elapsed_nanos.store(0, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, queued: usize, total_enqueued: u64) -> SchedulerStats {
        SchedulerStats {
            queued,
            total_enqueued,
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX),
            attached: self.attached.load(Ordering::Acquire),
            paused: self.paused.load(Ordering::Acquire),
            disposed: self.disposed.load(Ordering::Acquire),
        }
    }
}
