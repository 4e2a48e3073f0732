//! Benchmarks for the work queue and drain loop.
//!
//! Benchmarks cover:
//! - Queue append/pop throughput
//! - Concurrent producers against one queue
//! - Full and budgeted drains through the scheduler
//! - Trigger handling with posted control commands

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use idle_batch::builders::SchedulerBuilder;
use idle_batch::config::SchedulerConfig;
use idle_batch::core::{processor_fn, BatchScheduler, WorkQueue};
use idle_batch::util::ManualClock;

// ============================================================================
// Helper Functions
// ============================================================================

fn build_scheduler(budget_ms: u64) -> BatchScheduler<u64> {
    SchedulerBuilder::new()
        .config(
            SchedulerConfig::new()
                .with_batch_budget_ms(budget_ms)
                .with_attach_on_start(true)
                .with_failure_history(0),
        )
        .processor(processor_fn(|id: u64| {
            black_box(id.wrapping_mul(31));
        }))
        .build()
        .unwrap()
}

// ============================================================================
// Queue Benchmarks
// ============================================================================

fn bench_queue_enqueue_dequeue(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_enqueue_dequeue");

    for size in [100_u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let q = WorkQueue::new();
                for i in 0..size {
                    q.push(i);
                }
                while let Some(item) = q.try_dequeue() {
                    black_box(item);
                }
            });
        });
    }
    group.finish();
}

fn bench_queue_batch_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_batch_enqueue");

    for size in [100_u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let q = WorkQueue::new();
                black_box(q.enqueue(0..size));
                black_box(q.clear());
            });
        });
    }
    group.finish();
}

fn bench_queue_concurrent_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_concurrent_producers");
    let per_producer = 2_500_u64;

    for producers in [2_u64, 4] {
        group.throughput(Throughput::Elements(producers * per_producer));
        group.bench_with_input(
            BenchmarkId::from_parameter(producers),
            &producers,
            |b, &producers| {
                b.iter(|| {
                    let q = Arc::new(WorkQueue::new());
                    let handles: Vec<_> = (0..producers)
                        .map(|p| {
                            let q = Arc::clone(&q);
                            thread::spawn(move || {
                                for i in 0..per_producer {
                                    q.push(p * per_producer + i);
                                }
                            })
                        })
                        .collect();
                    for h in handles {
                        h.join().unwrap();
                    }
                    black_box(q.len());
                });
            },
        );
    }
    group.finish();
}

// ============================================================================
// Drain Benchmarks
// ============================================================================

fn bench_drain_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_all");

    for size in [100_u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut scheduler = build_scheduler(100);
            b.iter(|| {
                scheduler.enqueue(0..size);
                black_box(scheduler.drain_all().unwrap());
            });
        });
    }
    group.finish();
}

fn bench_budgeted_drain_manual_clock(c: &mut Criterion) {
    // Clock advanced by the action: every drain stops after a fixed count.
    let mut group = c.benchmark_group("budgeted_drain_manual_clock");

    for per_batch in [10_u64, 100] {
        group.throughput(Throughput::Elements(per_batch));
        group.bench_with_input(
            BenchmarkId::from_parameter(per_batch),
            &per_batch,
            |b, &per_batch| {
                let clock = ManualClock::new();
                let action_clock = clock.clone();
                let mut scheduler = SchedulerBuilder::new()
                    .config(
                        SchedulerConfig::new()
                            .with_batch_budget_ms(per_batch - 1)
                            .with_attach_on_start(true),
                    )
                    .processor(processor_fn(move |id: u64| {
                        action_clock.advance(std::time::Duration::from_millis(1));
                        black_box(id);
                    }))
                    .clock(clock)
                    .build()
                    .unwrap();
                b.iter(|| {
                    scheduler.enqueue(0..per_batch * 2);
                    black_box(scheduler.on_idle());
                    scheduler.clear_work();
                });
            },
        );
    }
    group.finish();
}

// ============================================================================
// Trigger Benchmarks
// ============================================================================

fn bench_trigger_with_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigger_with_commands");

    group.bench_function("pause_resume_round_trip", |b| {
        let mut scheduler = build_scheduler(100);
        let handle = scheduler.handle();
        b.iter(|| {
            handle.set_paused(true).unwrap();
            black_box(scheduler.on_idle());
            handle.set_paused(false).unwrap();
            handle.enqueue(0..16);
            black_box(scheduler.on_idle());
        });
    });

    group.bench_function("skipped_trigger", |b| {
        let mut scheduler = build_scheduler(100);
        scheduler.set_paused(true);
        b.iter(|| black_box(scheduler.on_progress()));
    });
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    queue_benches,
    bench_queue_enqueue_dequeue,
    bench_queue_batch_enqueue,
    bench_queue_concurrent_producers
);

criterion_group!(drain_benches, bench_drain_all, bench_budgeted_drain_manual_clock);

criterion_group!(trigger_benches, bench_trigger_with_commands);

criterion_main!(queue_benches, drain_benches, trigger_benches);
