//! # Idle Batch
//!
//! A time-boxed background work queue for host applications with an event
//! loop.
//!
//! Work that should not block its producer is appended to a FIFO
//! [`WorkQueue`](core::WorkQueue). Whenever the host has a quiet moment (an
//! idle tick, a progress callback, or an explicit "process now" request) it
//! calls into a [`BatchScheduler`](core::BatchScheduler), which pops items and
//! applies a processing action until the queue is empty or the per-batch time
//! budget is spent. The host's loop is never blocked for much longer than the
//! budget.
//!
//! ## Key Features
//!
//! - **Time budget**: each drain yields once it exceeds `batch_budget_ms`,
//!   but always processes at least one item so work cannot starve
//! - **Failure isolation**: an item whose action errors or panics is dropped
//!   and reported to failure observers; the drain carries on
//! - **Pause / attach / dispose**: triggers can be ignored without losing
//!   queued work, and disposal releases the action deterministically
//! - **Cross-thread producers**: [`SchedulerHandle`](core::SchedulerHandle)
//!   enqueues from any thread and posts control commands to the scheduling thread
//! - **Redrive hint**: a budget-limited drain can ask the host to re-trigger
//!   without its usual delay
//!
//! ## Example
//!
//! ```rust
//! use idle_batch::config::SchedulerConfig;
//! use idle_batch::core::{BatchScheduler, TriggerOutcome};
//!
//! let mut scheduler = BatchScheduler::new(
//!     |element_id: u64| -> anyhow::Result<()> {
//!         // re-index element_id ...
//!         let _ = element_id;
//!         Ok(())
//!     },
//!     SchedulerConfig::new().with_batch_budget_ms(10),
//! )?;
//!
//! scheduler.enqueue([11, 12, 13]);
//! scheduler.attach()?;
//!
//! // Called by the host whenever its event loop goes idle.
//! if let TriggerOutcome::Drained(report) = scheduler.on_idle() {
//!     assert_eq!(report.dequeued(), 3);
//! }
//! # Ok::<(), idle_batch::core::SchedulerError>(())
//! ```
//!
//! With the `tokio-runtime` feature, [`runtime::IdleTicker`] provides a ready
//! made idle loop.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Work queue, scheduler, failure channel and control handle.
pub mod core;
/// Configuration models for the scheduler and idle ticker.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Runtime adapters that raise trigger signals.
pub mod runtime;
/// Shared utilities.
pub mod util;
