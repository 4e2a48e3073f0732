//! Tests for failure records and sinks

use std::sync::Arc;

use idle_batch::config::SchedulerConfig;
use idle_batch::core::{
    processor_fn, BatchScheduler, FailureSink, InMemoryFailureSink, ProcessingFailure, TriggerKind,
};
use parking_lot::Mutex;

#[test]
fn test_failure_ids_are_unique() {
    let a = ProcessingFailure::new(1, None, anyhow::anyhow!("a"));
    let b = ProcessingFailure::new(1, None, anyhow::anyhow!("a"));
    assert_ne!(a.id, b.id);
}

#[test]
fn test_failure_keeps_original_error() {
    let failure = ProcessingFailure::new(
        3,
        Some(TriggerKind::Progress),
        std::io::Error::new(std::io::ErrorKind::NotFound, "element 9 missing").into(),
    );
    assert!(failure.error.downcast_ref::<std::io::Error>().is_some());
    assert_eq!(failure.trigger, Some(TriggerKind::Progress));
    assert_eq!(failure.to_string(), "processing failure #3: element 9 missing");
}

#[test]
fn test_closure_sink_receives_failures() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_sink = Arc::clone(&seen);
    let mut sink = move |failure: &ProcessingFailure| seen_by_sink.lock().push(failure.sequence);

    sink.report(&ProcessingFailure::new(1, None, anyhow::anyhow!("x")));
    sink.report(&ProcessingFailure::new(2, None, anyhow::anyhow!("y")));

    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn test_sink_clones_share_buffer() {
    let sink = InMemoryFailureSink::new(8);
    let mut writer = sink.clone();
    writer.report(&ProcessingFailure::new(1, None, anyhow::anyhow!("x")));

    assert_eq!(sink.len(), 1);
    sink.clear();
    assert!(writer.is_empty());
}

#[test]
fn test_scheduler_failure_history_is_bounded() {
    let mut scheduler = BatchScheduler::new(
        |_: u32| -> anyhow::Result<()> { anyhow::bail!("always fails") },
        SchedulerConfig::new().with_failure_history(2),
    )
    .unwrap();
    scheduler.enqueue(0..5);
    scheduler.drain_all().unwrap();

    let recent = scheduler.recent_failures();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].sequence, 4);
    assert_eq!(recent[1].sequence, 5);
    assert_eq!(scheduler.failed_count(), 5);
}

#[test]
fn test_scheduler_without_failure_history() {
    let mut scheduler = BatchScheduler::new(
        processor_fn(|n: u32| assert!(n < 1, "too large")),
        SchedulerConfig::new().with_failure_history(0),
    )
    .unwrap();
    scheduler.enqueue([0, 1]);
    let report = scheduler.drain_all().unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert!(scheduler.recent_failures().is_empty());
}
