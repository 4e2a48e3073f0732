//! Tokio-driven idle loop acting as the host for a [`BatchScheduler`].
//!
//! The ticker raises an idle signal every `idle_interval_ms`, optionally a
//! progress signal every `progress_every` ticks, and skips the interval when
//! the previous drain asked for an immediate redrive. It runs on the calling
//! task and borrows the scheduler mutably, so drains stay on one task.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::IdleTickerConfig;
use crate::core::{BatchScheduler, SchedulerError, TriggerHost, TriggerKind, TriggerOutcome};

#[derive(Debug, Default)]
struct TickerState {
    idle_subscribed: AtomicBool,
    progress_subscribed: AtomicBool,
    redrive: AtomicBool,
    redrive_requests: AtomicU64,
}

impl TickerState {
    fn flag(&self, kind: TriggerKind) -> &AtomicBool {
        match kind {
            TriggerKind::Idle => &self.idle_subscribed,
            TriggerKind::Progress => &self.progress_subscribed,
        }
    }

    fn is_subscribed(&self, kind: TriggerKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }
}

/// [`TriggerHost`] half of an [`IdleTicker`]; hand it to the scheduler builder.
#[derive(Debug, Clone)]
pub struct IdleTickerHost {
    state: Arc<TickerState>,
}

impl TriggerHost for IdleTickerHost {
    fn subscribe(&mut self, kind: TriggerKind) {
        self.state.flag(kind).store(true, Ordering::Release);
    }

    fn unsubscribe(&mut self, kind: TriggerKind) {
        self.state.flag(kind).store(false, Ordering::Release);
    }

    fn raise_without_delay(&mut self, _kind: TriggerKind) {
        self.state.redrive.store(true, Ordering::Release);
        self.state.redrive_requests.fetch_add(1, Ordering::Relaxed);
    }
}

/// Totals for one [`IdleTicker::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickerSummary {
    /// Loop iterations.
    pub ticks: u64,
    /// Triggers that ran a drain.
    pub drains: u64,
    /// Iterations that skipped the idle interval because of a redrive.
    pub redrives: u64,
}

/// Periodic idle/progress signal source.
#[derive(Debug)]
pub struct IdleTicker {
    config: IdleTickerConfig,
    state: Arc<TickerState>,
}

impl IdleTicker {
    /// Create a ticker and the host to register with the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(config: IdleTickerConfig) -> Result<(Self, IdleTickerHost), SchedulerError> {
        config
            .validate()
            .map_err(SchedulerError::InvalidConfiguration)?;
        let state = Arc::new(TickerState::default());
        let host = IdleTickerHost {
            state: Arc::clone(&state),
        };
        Ok((Self { config, state }, host))
    }

    /// Redrive hints received from the scheduler so far.
    #[must_use]
    pub fn redrive_requests(&self) -> u64 {
        self.state.redrive_requests.load(Ordering::Relaxed)
    }

    /// Drive `scheduler` until `shutdown` becomes `true` or its sender is
    /// dropped.
    ///
    /// Signals are only raised for kinds the scheduler is subscribed to. While
    /// it is detached the ticker still applies posted control commands, so a
    /// handle can attach it.
    pub async fn run<T>(
        &self,
        scheduler: &mut BatchScheduler<T>,
        mut shutdown: watch::Receiver<bool>,
    ) -> TickerSummary
    where
        T: Send + 'static,
    {
        let interval = self.config.idle_interval();
        let mut summary = TickerSummary::default();
        info!(
            idle_interval_ms = self.config.idle_interval_ms,
            progress_every = self.config.progress_every,
            "idle ticker started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            if self.state.redrive.swap(false, Ordering::AcqRel) {
                summary.redrives += 1;
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }

            summary.ticks += 1;
            let mut raised = false;

            if self.state.is_subscribed(TriggerKind::Idle) {
                raised = true;
                if let TriggerOutcome::Drained(_) = scheduler.on_idle() {
                    summary.drains += 1;
                }
            }

            let every = u64::from(self.config.progress_every);
            if every > 0
                && summary.ticks % every == 0
                && self.state.is_subscribed(TriggerKind::Progress)
            {
                raised = true;
                if let TriggerOutcome::Drained(_) = scheduler.on_progress() {
                    summary.drains += 1;
                }
            }

            if !raised {
                scheduler.pump_commands();
            }

            if scheduler.is_disposed() {
                debug!("scheduler disposed, stopping idle ticker");
                break;
            }
        }

        info!(
            ticks = summary.ticks,
            drains = summary.drains,
            redrives = summary.redrives,
            "idle ticker stopped"
        );
        summary
    }
}
