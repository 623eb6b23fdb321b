use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam::queue::SegQueue;
use crossbeam_epoch as epoch;
use msqueue::LockFreeQueue;
use std::collections::VecDeque;
use std::hint::black_box;
use std::sync::Mutex;

fn benchmark_lockfree_queue_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lock-Free Queue Single-threaded");

    for &size in &[200, 400, 600, 800, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("Enqueue Single-threaded (LockFreeQueue)", size),
            &size,
            |b, &size| {
                let queue = LockFreeQueue::new();
                b.iter(|| {
                    for i in 0..size {
                        queue.enqueue(black_box(i));
                    }
                });
            },
        );
    }

    // Holding an outer guard makes the per-operation pin a cheap re-entry.
    for &size in &[200, 400, 600, 800, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("Enqueue Single-threaded (LockFreeQueue, outer pin)", size),
            &size,
            |b, &size| {
                let queue = LockFreeQueue::new();
                b.iter(|| {
                    let _guard = epoch::pin();
                    for i in 0..size {
                        queue.enqueue(black_box(i));
                    }
                });
            },
        );
    }

    for &size in &[200, 400, 600, 800, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("Enqueue Single-threaded (SegQueue)", size),
            &size,
            |b, &size| {
                let queue = SegQueue::new();
                b.iter(|| {
                    for i in 0..size {
                        queue.push(black_box(i));
                    }
                });
            },
        );
    }

    for &size in &[200, 400, 600, 800, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("Enqueue Single-threaded (Mutex<VecDeque>)", size),
            &size,
            |b, &size| {
                let queue = Mutex::new(VecDeque::new());
                b.iter(|| {
                    for i in 0..size {
                        queue.lock().unwrap().push_back(black_box(i));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_lockfree_queue_single_threaded);
criterion_main!(benches);
