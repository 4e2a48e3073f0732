//! Reported-failure channel for processing actions.
//!
//! The drain loop never lets a per-item failure escape. Instead it builds a
//! [`ProcessingFailure`] and hands it to every registered [`FailureSink`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::TriggerKind;
use crate::util::clock::now_ms;

/// One work item whose processing action failed or panicked.
#[derive(Debug, Clone)]
pub struct ProcessingFailure {
    /// Unique identifier of this failure.
    pub id: Uuid,
    /// Failure ordinal within the scheduler's lifetime, starting at 1.
    pub sequence: u64,
    /// Trigger that started the drain, `None` for explicit drains.
    pub trigger: Option<TriggerKind>,
    /// Wall-clock timestamp in milliseconds since epoch.
    pub occurred_at_ms: u128,
    /// Rendered error chain.
    pub message: String,
    /// Original failure detail.
    pub error: Arc<anyhow::Error>,
}

impl ProcessingFailure {
    /// Build a failure record stamped with the current time.
    #[must_use]
    pub fn new(sequence: u64, trigger: Option<TriggerKind>, error: anyhow::Error) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            trigger,
            occurred_at_ms: now_ms(),
            message: format!("{error:#}"),
            error: Arc::new(error),
        }
    }

    /// Whether the action panicked rather than returning an error.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.error.is::<ActionPanicked>()
    }
}

impl fmt::Display for ProcessingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "processing failure #{}: {}", self.sequence, self.message)
    }
}

/// Error recorded when the processing action panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("processing action panicked: {0}")]
pub struct ActionPanicked(pub String);

impl ActionPanicked {
    /// Extract the panic message from a `catch_unwind` payload.
    #[must_use]
    pub fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self(msg)
    }
}

/// Observer of processing failures.
pub trait FailureSink: Send {
    /// Receive one failure record.
    fn report(&mut self, failure: &ProcessingFailure);
}

impl<F> FailureSink for F
where
    F: FnMut(&ProcessingFailure) + Send,
{
    fn report(&mut self, failure: &ProcessingFailure) {
        self(failure);
    }
}

/// Bounded in-memory failure log for testing and status displays.
///
/// Clones share the same buffer, so one clone can be registered with the
/// scheduler while another is kept for reading.
#[derive(Clone)]
pub struct InMemoryFailureSink {
    failures: Arc<Mutex<VecDeque<ProcessingFailure>>>,
    max_failures: usize,
}

impl InMemoryFailureSink {
    /// Create a sink keeping at most `max_failures` most recent records.
    #[must_use]
    pub fn new(max_failures: usize) -> Self {
        Self {
            failures: Arc::new(Mutex::new(VecDeque::with_capacity(max_failures.min(1024)))),
            max_failures,
        }
    }

    /// Snapshot of stored failures, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<ProcessingFailure> {
        self.failures.lock().iter().cloned().collect()
    }

    /// Number of stored failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Drop all stored failures.
    pub fn clear(&self) {
        self.failures.lock().clear();
    }
}

impl fmt::Debug for InMemoryFailureSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryFailureSink")
            .field("len", &self.len())
            .field("max_failures", &self.max_failures)
            .finish()
    }
}

impl FailureSink for InMemoryFailureSink {
    fn report(&mut self, failure: &ProcessingFailure) {
        if self.max_failures == 0 {
            return;
        }
        let mut failures = self.failures.lock();
        if failures.len() >= self.max_failures {
            failures.pop_front();
        }
        failures.push_back(failure.clone());
    }
}
