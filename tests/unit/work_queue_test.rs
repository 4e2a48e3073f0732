//! Tests for the work queue

use idle_batch::core::{SchedulerError, WorkQueue};

#[test]
fn test_enqueue_empty_batch() {
    let q: WorkQueue<u8> = WorkQueue::new();
    assert_eq!(q.enqueue(Vec::new()), 0);
    assert!(q.is_empty());
    assert_eq!(q.total_enqueued(), 0);
}

#[test]
fn test_dequeue_head_on_empty_queue() {
    let q: WorkQueue<u8> = WorkQueue::default();
    assert_eq!(q.dequeue_head(), Err(SchedulerError::EmptyQueue));
}

#[test]
fn test_batches_keep_order() {
    let q = WorkQueue::new();
    q.enqueue(["a", "b"]);
    q.push("c");
    q.enqueue(vec!["d"]);

    let drained: Vec<_> = std::iter::from_fn(|| q.try_dequeue()).collect();
    assert_eq!(drained, ["a", "b", "c", "d"]);
}

#[test]
fn test_clear_returns_discarded_count() {
    let q = WorkQueue::new();
    q.enqueue(0..7);
    assert_eq!(q.clear(), 7);
    assert_eq!(q.len(), 0);
    // Lifetime count is unaffected.
    assert_eq!(q.total_enqueued(), 7);
}
