//! Cross-thread handle for producers and control surfaces.
//!
//! The scheduler itself is driven from a single thread. Anything else, such
//! as a worker producing items or a status window toggling pause, talks to it
//! through a [`SchedulerHandle`]: items go straight into the shared queue,
//! while state changes are posted as [`ControlCommand`]s and applied on the
//! scheduling thread at the next [`pump_commands`](crate::core::BatchScheduler::pump_commands)
//! or trigger.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::core::stats::SchedulerCounters;
use crate::core::{SchedulerError, SchedulerStats, WorkQueue};

/// State change requested from outside the scheduling thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Subscribe to trigger signals.
    Attach,
    /// Unsubscribe from trigger signals.
    Detach,
    /// Pause or resume trigger-driven draining.
    SetPaused(bool),
    /// Replace the per-drain time budget.
    SetBatchBudget(Duration),
    /// Toggle draining on idle signals.
    SetDoWorkDuringIdle(bool),
    /// Toggle draining on progress signals.
    SetDoWorkDuringProgress(bool),
    /// Toggle the immediate redrive hint.
    SetRaiseImmediately(bool),
    /// Discard all pending items.
    ClearWork,
    /// Zero the statistics.
    ResetStats,
    /// Run one budgeted drain.
    DrainSome,
    /// Drain until the queue is empty.
    DrainAll,
    /// Dispose the scheduler.
    Dispose,
}

/// Cloneable, thread-safe handle to a [`BatchScheduler`](crate::core::BatchScheduler).
pub struct SchedulerHandle<T> {
    queue: Arc<WorkQueue<T>>,
    counters: Arc<SchedulerCounters>,
    commands: Sender<ControlCommand>,
}

impl<T> SchedulerHandle<T> {
    pub(crate) const fn new(
        queue: Arc<WorkQueue<T>>,
        counters: Arc<SchedulerCounters>,
        commands: Sender<ControlCommand>,
    ) -> Self {
        Self {
            queue,
            counters,
            commands,
        }
    }

    /// Append items to the scheduler's queue. Legal in any scheduler state.
    pub fn enqueue<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.queue.enqueue(items)
    }

    /// Append one item.
    pub fn push(&self, item: T) {
        self.queue.push(item);
    }

    /// Pending item count.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot of the scheduler's counters and flags.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot(self.queue.len(), self.queue.total_enqueued())
    }

    /// Whether the scheduler has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.counters.disposed.load(Ordering::Acquire)
    }

    /// Post a command for the scheduling thread.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Disposed`] if the scheduler has been disposed
    /// or dropped.
    pub fn post(&self, command: ControlCommand) -> Result<(), SchedulerError> {
        if self.is_disposed() {
            return Err(SchedulerError::Disposed);
        }
        self.commands.send(command).map_err(|_| SchedulerError::Disposed)
    }

    /// Request [`ControlCommand::Attach`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn attach(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::Attach)
    }

    /// Request [`ControlCommand::Detach`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn detach(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::Detach)
    }

    /// Request [`ControlCommand::SetPaused`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn set_paused(&self, paused: bool) -> Result<(), SchedulerError> {
        self.post(ControlCommand::SetPaused(paused))
    }

    /// Request [`ControlCommand::SetBatchBudget`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn set_batch_budget(&self, budget: Duration) -> Result<(), SchedulerError> {
        self.post(ControlCommand::SetBatchBudget(budget))
    }

    /// Request [`ControlCommand::SetDoWorkDuringIdle`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn set_do_work_during_idle(&self, enabled: bool) -> Result<(), SchedulerError> {
        self.post(ControlCommand::SetDoWorkDuringIdle(enabled))
    }

    /// Request [`ControlCommand::SetDoWorkDuringProgress`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn set_do_work_during_progress(&self, enabled: bool) -> Result<(), SchedulerError> {
        self.post(ControlCommand::SetDoWorkDuringProgress(enabled))
    }

    /// Request [`ControlCommand::SetRaiseImmediately`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn set_raise_immediately(&self, enabled: bool) -> Result<(), SchedulerError> {
        self.post(ControlCommand::SetRaiseImmediately(enabled))
    }

    /// Request [`ControlCommand::ClearWork`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn clear_work(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::ClearWork)
    }

    /// Request [`ControlCommand::ResetStats`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn reset_stats(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::ResetStats)
    }

    /// Request [`ControlCommand::DrainSome`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn drain_some(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::DrainSome)
    }

    /// Request [`ControlCommand::DrainAll`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn drain_all(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::DrainAll)
    }

    /// Request [`ControlCommand::Dispose`].
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post).
    pub fn dispose(&self) -> Result<(), SchedulerError> {
        self.post(ControlCommand::Dispose)
    }
}

impl<T> Clone for SchedulerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            counters: Arc::clone(&self.counters),
            commands: self.commands.clone(),
        }
    }
}

impl<T> fmt::Debug for SchedulerHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("queued", &self.queue.len())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
