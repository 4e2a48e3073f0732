//! Tests for error types

use idle_batch::core::{ActionPanicked, SchedulerError};

#[test]
fn test_empty_queue_error() {
    let err = SchedulerError::EmptyQueue;
    assert_eq!(format!("{}", err), "queue is empty");
}

#[test]
fn test_invalid_configuration_error() {
    let err = SchedulerError::InvalidConfiguration("batch_budget_ms must be at least 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: batch_budget_ms must be at least 0"
    );
}

#[test]
fn test_disposed_error() {
    let err = SchedulerError::Disposed;
    assert_eq!(format!("{}", err), "scheduler disposed");
}

#[test]
fn test_scheduler_error_converts_to_anyhow() {
    fn fails() -> idle_batch::core::AppResult<()> {
        Result::<(), _>::Err(SchedulerError::Disposed)?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert_eq!(err.downcast_ref::<SchedulerError>(), Some(&SchedulerError::Disposed));
}

#[test]
fn test_action_panicked_message() {
    let err = ActionPanicked("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "processing action panicked: index out of bounds");
}
