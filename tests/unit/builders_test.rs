//! Tests for builder modules

use std::sync::Arc;

use idle_batch::builders::{build_from_json, SchedulerBuilder};
use idle_batch::config::SchedulerConfig;
use idle_batch::core::{processor_fn, InMemoryFailureSink, SchedulerError, WorkQueue};
use idle_batch::util::ManualClock;

#[test]
fn test_builder_requires_processor() {
    let err = SchedulerBuilder::<u32>::new().build().unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let err = SchedulerBuilder::new()
        .config(SchedulerConfig::new().with_batch_budget_ms(u64::MAX))
        .processor(processor_fn(|_: u32| {}))
        .build()
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));
}

#[test]
fn test_builder_defaults() {
    let scheduler = SchedulerBuilder::new()
        .processor(processor_fn(|_: u32| {}))
        .build()
        .unwrap();
    assert!(!scheduler.is_attached());
    assert!(!scheduler.is_paused());
    assert_eq!(scheduler.batch_budget().as_millis(), 100);
    assert_eq!(scheduler.queue_len(), 0);
}

#[test]
fn test_builder_shares_existing_queue() {
    let queue = Arc::new(WorkQueue::new());
    queue.enqueue([1_u32, 2, 3]);

    let mut scheduler = SchedulerBuilder::new()
        .queue(Arc::clone(&queue))
        .processor(processor_fn(|_: u32| {}))
        .clock(ManualClock::new())
        .build()
        .unwrap();
    assert_eq!(scheduler.queue_len(), 3);

    scheduler.drain_all().unwrap();
    assert!(queue.is_empty());
}

#[test]
fn test_builder_registers_failure_sink() {
    let sink = InMemoryFailureSink::new(4);
    let mut scheduler = SchedulerBuilder::new()
        .processor(|n: u32| {
            if n == 2 {
                anyhow::bail!("cannot index {n}");
            }
            Ok(())
        })
        .failure_sink(sink.clone())
        .build()
        .unwrap();

    scheduler.enqueue([1, 2, 3]);
    scheduler.drain_all().unwrap();

    assert_eq!(sink.len(), 1);
    assert_eq!(sink.failures()[0].message, "cannot index 2");
}

#[test]
fn test_build_from_json() {
    let scheduler = build_from_json(
        r#"{ "batch_budget_ms": 5, "attach_on_start": true }"#,
        processor_fn(|_: u32| {}),
    )
    .unwrap();
    assert!(scheduler.is_attached());
    assert_eq!(scheduler.batch_budget().as_millis(), 5);
}

#[test]
fn test_build_from_json_invalid() {
    let err = build_from_json("{ not json", processor_fn(|_: u32| {})).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));
}
