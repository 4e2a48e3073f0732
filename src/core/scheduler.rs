//! Time-boxed batch scheduler.
//!
//! [`BatchScheduler`] turns host trigger signals into bounded drains of a
//! [`WorkQueue`]. Each drain pops items in FIFO order and applies the
//! processing action until the queue is empty or the per-drain budget is
//! spent. The budget is checked after each item, so every drain that finds
//! work makes progress even with a zero budget.
//!
//! Drains take `&mut self` and run on the calling thread; a scheduler is
//! never drained from two places at once. Producers on other threads use a
//! [`SchedulerHandle`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, trace, warn};

use crate::config::{SchedulerConfig, MAX_BATCH_BUDGET_MS};
use crate::core::failure::ActionPanicked;
use crate::core::stats::SchedulerCounters;
use crate::core::{
    ControlCommand, FailureSink, InMemoryFailureSink, ProcessingFailure, SchedulerError,
    SchedulerHandle, SchedulerStats, TriggerHost, TriggerKind, WorkProcessor, WorkQueue,
};
use crate::util::clock::Clock;

/// Outcome of one drain invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Items whose processing action succeeded.
    pub processed: u64,
    /// Items whose processing action failed; they are discarded.
    pub failed: u64,
    /// Items left in the queue when the drain returned.
    pub remaining: usize,
    /// Time spent in this drain.
    pub elapsed: Duration,
    /// The drain stopped with work still queued because the budget ran out.
    pub budget_exhausted: bool,
    /// The host should re-trigger without its normal delay.
    pub redrive_requested: bool,
}

impl DrainReport {
    /// Items removed from the queue by this drain.
    #[must_use]
    pub const fn dequeued(&self) -> u64 {
        self.processed + self.failed
    }
}

/// Why a trigger did not drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The scheduler has been disposed.
    Disposed,
    /// The scheduler is not attached.
    Detached,
    /// Processing is paused.
    Paused,
    /// Draining is disabled for this trigger kind.
    SourceDisabled,
}

/// Result of a trigger handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A budgeted drain ran.
    Drained(DrainReport),
    /// The trigger was ignored.
    Skipped(SkipReason),
}

impl TriggerOutcome {
    /// The drain report, if a drain ran.
    #[must_use]
    pub const fn report(&self) -> Option<&DrainReport> {
        match self {
            Self::Drained(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }

    /// Whether the host was asked to re-trigger without delay.
    #[must_use]
    pub fn redrive_requested(&self) -> bool {
        matches!(self, Self::Drained(report) if report.redrive_requested)
    }
}

/// Single-consumer, time-sliced drainer of a [`WorkQueue`].
pub struct BatchScheduler<T> {
    config: SchedulerConfig,
    queue: Arc<WorkQueue<T>>,
    /// Released on dispose.
    processor: Option<Box<dyn WorkProcessor<T>>>,
    host: Box<dyn TriggerHost>,
    clock: Arc<dyn Clock>,
    counters: Arc<SchedulerCounters>,
    failure_sinks: Vec<Box<dyn FailureSink>>,
    failure_history: Option<InMemoryFailureSink>,
    failure_seq: u64,
    attached: bool,
    paused: bool,
    disposed: bool,
    command_tx: Sender<ControlCommand>,
    command_rx: Receiver<ControlCommand>,
}

impl<T: Send + 'static> BatchScheduler<T> {
    /// Create a scheduler with a system clock and a host that never calls
    /// back on its own. Attaches immediately if `config.attach_on_start`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if `config` is invalid.
    pub fn new<P>(processor: P, config: SchedulerConfig) -> Result<Self, SchedulerError>
    where
        P: WorkProcessor<T> + 'static,
    {
        crate::builders::SchedulerBuilder::new()
            .config(config)
            .processor(processor)
            .build()
    }

    pub(crate) fn from_parts(
        config: SchedulerConfig,
        queue: Arc<WorkQueue<T>>,
        processor: Box<dyn WorkProcessor<T>>,
        host: Box<dyn TriggerHost>,
        clock: Arc<dyn Clock>,
        failure_sinks: Vec<Box<dyn FailureSink>>,
    ) -> Self {
        let (command_tx, command_rx) = unbounded();
        let failure_history =
            (config.failure_history > 0).then(|| InMemoryFailureSink::new(config.failure_history));
        Self {
            config,
            queue,
            processor: Some(processor),
            host,
            clock,
            counters: Arc::new(SchedulerCounters::default()),
            failure_sinks,
            failure_history,
            failure_seq: 0,
            attached: false,
            paused: false,
            disposed: false,
            command_tx,
            command_rx,
        }
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Subscribe to the host's idle and progress signals. No-op if attached.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Disposed`] after [`dispose`](Self::dispose).
    pub fn attach(&mut self) -> Result<(), SchedulerError> {
        if self.disposed {
            return Err(SchedulerError::Disposed);
        }
        if self.attached {
            return Ok(());
        }
        for kind in TriggerKind::ALL {
            self.host.subscribe(kind);
        }
        self.attached = true;
        self.counters.attached.store(true, Ordering::Release);
        info!(queued = self.queue.len(), "scheduler attached");
        Ok(())
    }

    /// Unsubscribe from all trigger signals. Safe to call when never attached.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        for kind in TriggerKind::ALL {
            self.host.unsubscribe(kind);
        }
        self.attached = false;
        self.counters.attached.store(false, Ordering::Release);
        info!(queued = self.queue.len(), "scheduler detached");
    }

    /// Attach when `enabled`, detach otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Disposed`] when enabling a disposed scheduler.
    pub fn set_attached(&mut self, enabled: bool) -> Result<(), SchedulerError> {
        if enabled {
            self.attach()
        } else {
            self.detach();
            Ok(())
        }
    }

    /// Detach, release the processing action and failure observers, and
    /// refuse further drains. Idempotent. Queued items are left in place.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.detach();
        self.processor = None;
        self.failure_sinks.clear();
        self.disposed = true;
        self.counters.disposed.store(true, Ordering::Release);
        info!(
            queued = self.queue.len(),
            processed = self.counters.processed.load(Ordering::Relaxed),
            "scheduler disposed"
        );
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Pause or resume trigger-driven draining. Queue and stats are untouched.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!(paused, "scheduler pause toggled");
        }
        self.paused = paused;
        self.counters.paused.store(paused, Ordering::Release);
    }

    /// Set the per-drain budget in milliseconds. Takes effect on the next drain.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] for a negative value or
    /// one above [`MAX_BATCH_BUDGET_MS`]; the current budget is kept.
    pub fn set_batch_budget_ms(&mut self, ms: i64) -> Result<(), SchedulerError> {
        let ms = u64::try_from(ms).map_err(|_| {
            SchedulerError::InvalidConfiguration(format!(
                "batch budget must be non-negative, got {ms}"
            ))
        })?;
        if ms > MAX_BATCH_BUDGET_MS {
            return Err(SchedulerError::InvalidConfiguration(format!(
                "batch budget must be at most {MAX_BATCH_BUDGET_MS} ms, got {ms}"
            )));
        }
        self.config.batch_budget_ms = ms;
        Ok(())
    }

    /// Set the per-drain budget, truncated to whole milliseconds.
    ///
    /// A `Duration` cannot be negative, so the only rejected value is one
    /// above the upper bound.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if the budget exceeds
    /// [`MAX_BATCH_BUDGET_MS`].
    pub fn set_batch_budget(&mut self, budget: Duration) -> Result<(), SchedulerError> {
        let ms = i64::try_from(budget.as_millis()).unwrap_or(i64::MAX);
        self.set_batch_budget_ms(ms)
    }

    /// Toggle draining on idle signals.
    pub fn set_do_work_during_idle(&mut self, enabled: bool) {
        self.config.do_work_during_idle = enabled;
    }

    /// Toggle draining on progress signals.
    pub fn set_do_work_during_progress(&mut self, enabled: bool) {
        self.config.do_work_during_progress = enabled;
    }

    /// Toggle the immediate redrive hint.
    pub fn set_raise_immediately_on_next_trigger(&mut self, enabled: bool) {
        self.config.raise_immediately_on_next_trigger = enabled;
    }

    /// Register an additional failure observer. A panicking observer is
    /// logged and skipped; it never interrupts a drain.
    pub fn subscribe_failures<S>(&mut self, sink: S)
    where
        S: FailureSink + 'static,
    {
        self.failure_sinks.push(Box::new(sink));
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    /// Append items to the queue. Legal in any state.
    pub fn enqueue<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.queue.enqueue(items)
    }

    /// Discard pending items. Stats are untouched.
    pub fn clear_work(&mut self) -> usize {
        let discarded = self.queue.clear();
        if discarded > 0 {
            debug!(discarded, "cleared pending work");
        }
        discarded
    }

    /// Zero processed/failed/batch counters and the elapsed accumulator.
    pub fn reset_stats(&mut self) {
        self.counters.reset();
        debug!("scheduler stats reset");
    }

    /// Cross-thread handle sharing this scheduler's queue.
    #[must_use]
    pub fn handle(&self) -> SchedulerHandle<T> {
        SchedulerHandle::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.counters),
            self.command_tx.clone(),
        )
    }

    // ------------------------------------------------------------------
    // Draining
    // ------------------------------------------------------------------

    /// Drain the queue.
    ///
    /// With `force_full == false` the drain stops once the time spent exceeds
    /// the batch budget, or after one item when the budget is zero; otherwise
    /// it runs until the queue is empty. Failures of the processing action are
    /// reported to failure observers and never returned here.
    ///
    /// When a budgeted drain stops with work left and the redrive hint is set,
    /// an attached scheduler asks the host to re-raise without delay: the
    /// trigger that started the drain, or [`TriggerKind::Idle`] for explicit
    /// drains.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Disposed`] after [`dispose`](Self::dispose).
    pub fn drain(&mut self, force_full: bool) -> Result<DrainReport, SchedulerError> {
        self.run_batch(force_full, None)
    }

    /// One budgeted drain.
    ///
    /// # Errors
    ///
    /// See [`drain`](Self::drain).
    pub fn drain_some(&mut self) -> Result<DrainReport, SchedulerError> {
        self.drain(false)
    }

    /// Drain until the queue is empty, ignoring the budget.
    ///
    /// # Errors
    ///
    /// See [`drain`](Self::drain).
    pub fn drain_all(&mut self) -> Result<DrainReport, SchedulerError> {
        self.drain(true)
    }

    fn run_batch(
        &mut self,
        force_full: bool,
        trigger: Option<TriggerKind>,
    ) -> Result<DrainReport, SchedulerError> {
        let processor = self.processor.as_mut().ok_or(SchedulerError::Disposed)?;
        let budget = self.config.batch_budget();
        let started = self.clock.now();
        let mut report = DrainReport::default();

        while let Some(item) = self.queue.try_dequeue() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.process(item)));
            let error = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(payload) => Some(ActionPanicked::from_payload(payload.as_ref()).into()),
            };
            match error {
                None => {
                    report.processed += 1;
                    self.counters.processed.fetch_add(1, Ordering::Relaxed);
                }
                Some(error) => {
                    report.failed += 1;
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    self.failure_seq += 1;
                    let failure = ProcessingFailure::new(self.failure_seq, trigger, error);
                    warn!(
                        failure_id = %failure.id,
                        sequence = failure.sequence,
                        trigger = ?trigger,
                        error = %failure.message,
                        "work item processing failed"
                    );
                    if let Some(history) = self.failure_history.as_mut() {
                        notify_sink(history, &failure);
                    }
                    for sink in &mut self.failure_sinks {
                        notify_sink(&mut **sink, &failure);
                    }
                }
            }

            // A zero budget stops after one item even if the clock has not moved.
            let elapsed = self.clock.now().saturating_duration_since(started);
            if !force_full && (budget.is_zero() || elapsed > budget) {
                report.budget_exhausted = !self.queue.is_empty();
                break;
            }
        }

        report.elapsed = self.clock.now().saturating_duration_since(started);
        report.remaining = self.queue.len();
        report.redrive_requested =
            report.budget_exhausted && self.config.raise_immediately_on_next_trigger;
        if report.redrive_requested && self.attached {
            self.host.raise_without_delay(trigger.unwrap_or(TriggerKind::Idle));
        }

        if report.dequeued() > 0 {
            self.counters.add_elapsed(report.elapsed);
            self.counters.batches.fetch_add(1, Ordering::Relaxed);
            debug!(
                processed = report.processed,
                failed = report.failed,
                remaining = report.remaining,
                elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
                budget_exhausted = report.budget_exhausted,
                force_full,
                trigger = ?trigger,
                "drain finished"
            );
        }
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Trigger handlers
    // ------------------------------------------------------------------

    /// Idle signal from the host.
    pub fn on_idle(&mut self) -> TriggerOutcome {
        self.on_trigger(TriggerKind::Idle)
    }

    /// Progress signal from the host.
    pub fn on_progress(&mut self) -> TriggerOutcome {
        self.on_trigger(TriggerKind::Progress)
    }

    /// Handle a trigger signal: apply posted commands, then run one budgeted
    /// drain if attached, not paused and enabled for `kind`. When the drain
    /// stops on budget with the redrive hint enabled, the host is asked to
    /// re-raise `kind` without delay.
    pub fn on_trigger(&mut self, kind: TriggerKind) -> TriggerOutcome {
        self.pump_commands();

        if let Some(reason) = self.skip_reason(kind) {
            trace!(trigger = %kind, ?reason, "trigger skipped");
            return TriggerOutcome::Skipped(reason);
        }

        match self.run_batch(false, Some(kind)) {
            Ok(report) => TriggerOutcome::Drained(report),
            Err(_) => TriggerOutcome::Skipped(SkipReason::Disposed),
        }
    }

    fn skip_reason(&self, kind: TriggerKind) -> Option<SkipReason> {
        let source_enabled = match kind {
            TriggerKind::Idle => self.config.do_work_during_idle,
            TriggerKind::Progress => self.config.do_work_during_progress,
        };
        if self.disposed {
            Some(SkipReason::Disposed)
        } else if !self.attached {
            Some(SkipReason::Detached)
        } else if self.paused {
            Some(SkipReason::Paused)
        } else if !source_enabled {
            Some(SkipReason::SourceDisabled)
        } else {
            None
        }
    }

    /// Apply every command posted through handles, in posting order.
    /// Returns the number applied.
    pub fn pump_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.command_rx.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, command: ControlCommand) {
        trace!(?command, "applying control command");
        let result = match command {
            ControlCommand::Attach => self.attach(),
            ControlCommand::Detach => {
                self.detach();
                Ok(())
            }
            ControlCommand::SetPaused(paused) => {
                self.set_paused(paused);
                Ok(())
            }
            ControlCommand::SetBatchBudget(budget) => self.set_batch_budget(budget),
            ControlCommand::SetDoWorkDuringIdle(enabled) => {
                self.set_do_work_during_idle(enabled);
                Ok(())
            }
            ControlCommand::SetDoWorkDuringProgress(enabled) => {
                self.set_do_work_during_progress(enabled);
                Ok(())
            }
            ControlCommand::SetRaiseImmediately(enabled) => {
                self.set_raise_immediately_on_next_trigger(enabled);
                Ok(())
            }
            ControlCommand::ClearWork => {
                self.clear_work();
                Ok(())
            }
            ControlCommand::ResetStats => {
                self.reset_stats();
                Ok(())
            }
            ControlCommand::DrainSome => self.drain(false).map(|_| ()),
            ControlCommand::DrainAll => self.drain(true).map(|_| ()),
            ControlCommand::Dispose => {
                self.dispose();
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(error = %e, "control command rejected");
        }
    }
}

impl<T> BatchScheduler<T> {
    // ------------------------------------------------------------------
    // Observability
    // ------------------------------------------------------------------

    /// Pending item count.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Shared queue.
    #[must_use]
    pub const fn queue(&self) -> &Arc<WorkQueue<T>> {
        &self.queue
    }

    /// Items processed successfully since the last reset.
    #[must_use]
    pub fn processed_count(&self) -> u64 {
        self.counters.processed.load(Ordering::Relaxed)
    }

    /// Items whose processing failed since the last reset.
    #[must_use]
    pub fn failed_count(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Cumulative processing time since the last reset.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.counters.elapsed()
    }

    /// Whether subscribed to trigger signals.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether trigger signals are ignored.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether [`dispose`](BatchScheduler::dispose) has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Current per-drain budget.
    #[must_use]
    pub const fn batch_budget(&self) -> Duration {
        self.config.batch_budget()
    }

    /// Current configuration, including toggles changed through setters.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Most recent failures kept by the built-in history, oldest first.
    #[must_use]
    pub fn recent_failures(&self) -> Vec<ProcessingFailure> {
        self.failure_history
            .as_ref()
            .map(InMemoryFailureSink::failures)
            .unwrap_or_default()
    }

    /// Snapshot of counters and flags.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot(self.queue.len(), self.queue.total_enqueued())
    }
}

/// Deliver `failure` to one observer, containing any panic it raises.
fn notify_sink(sink: &mut dyn FailureSink, failure: &ProcessingFailure) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink.report(failure))) {
        warn!(
            failure_id = %failure.id,
            panic = %ActionPanicked::from_payload(payload.as_ref()).0,
            "failure observer panicked"
        );
    }
}

impl<T> Drop for BatchScheduler<T> {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        // Same teardown as `dispose`, without the logging.
        if self.attached {
            for kind in TriggerKind::ALL {
                self.host.unsubscribe(kind);
            }
            self.attached = false;
        }
        self.processor = None;
        self.failure_sinks.clear();
        self.disposed = true;
        self.counters.attached.store(false, Ordering::Release);
        self.counters.disposed.store(true, Ordering::Release);
    }
}

impl<T> fmt::Debug for BatchScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("config", &self.config)
            .field("queued", &self.queue.len())
            .field("attached", &self.attached)
            .field("paused", &self.paused)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
