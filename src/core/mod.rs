//! Work queue, batch scheduler and the contracts around them.

pub mod control;
pub mod error;
pub mod failure;
pub mod host;
pub mod processor;
pub mod scheduler;
pub mod stats;
pub mod work_queue;

pub use control::{ControlCommand, SchedulerHandle};
pub use error::{AppResult, SchedulerError};
pub use failure::{ActionPanicked, FailureSink, InMemoryFailureSink, ProcessingFailure};
pub use host::{NoopHost, TriggerHost, TriggerKind};
pub use processor::{processor_fn, InfallibleFn, WorkProcessor};
pub use scheduler::{BatchScheduler, DrainReport, SkipReason, TriggerOutcome};
pub use stats::SchedulerStats;
pub use work_queue::WorkQueue;
