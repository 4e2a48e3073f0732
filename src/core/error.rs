//! Error types for queue and scheduler operations.

use thiserror::Error;

/// Errors produced by the work queue and batch scheduler.
///
/// Failures raised by the processing action are not represented here; they
/// are contained by the drain loop and reported as
/// [`ProcessingFailure`](crate::core::ProcessingFailure) records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Dequeue attempted on an empty queue.
    #[error("queue is empty")]
    EmptyQueue,
    /// A configuration value or construction argument was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The scheduler has been disposed and no longer accepts work or commands.
    #[error("scheduler disposed")]
    Disposed,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
