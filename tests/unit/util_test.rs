//! Tests for utility functions

use std::time::Duration;

use idle_batch::util::{init_tracing, init_tracing_with, now_ms, Clock, ManualClock, SystemClock};

#[test]
fn test_now_ms_is_after_epoch() {
    // 2020-01-01T00:00:00Z
    assert!(now_ms() > 1_577_836_800_000);
}

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}

#[test]
fn test_manual_clock_only_moves_when_advanced() {
    let clock = ManualClock::new();
    let start = clock.now();
    std::thread::sleep(Duration::from_millis(2));
    assert_eq!(clock.now(), start);

    clock.advance(Duration::from_millis(7));
    clock.advance(Duration::from_millis(3));
    assert_eq!(clock.now() - start, Duration::from_millis(10));
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing_with("idle_batch=trace");
    tracing::info!("tracing initialized twice without panicking");
}
