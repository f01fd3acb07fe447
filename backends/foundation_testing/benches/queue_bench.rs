use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use foundation_taskqueue::SynchronizedQueue;
use foundation_testing::scenarios::WorkerPool;
use foundation_testing::stress::{run_queue_stress, StressConfig};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Benchmark uncontended push/pop/mark_done on one thread.
fn bench_queue_uncontended(c: &mut Criterion) {
    let queue = SynchronizedQueue::new();

    c.bench_function("queue_push_pop_uncontended", |b| {
        b.iter(|| {
            queue.push(black_box(42u64));
            let value = queue.pop();
            queue.mark_done();
            black_box(value);
        });
    });

    c.bench_function("queue_push_pop_with_guard_uncontended", |b| {
        b.iter(|| {
            queue.push(black_box(42u64));
            let (value, guard) = queue.pop_with_guard();
            guard.complete();
            black_box(value);
        });
    });
}

/// Benchmark a single item handed to a blocked worker and joined.
fn bench_queue_handoff(c: &mut Criterion) {
    c.bench_function("queue_handoff_and_join", |b| {
        b.iter_batched(
            || Arc::new(SynchronizedQueue::<u64>::new()),
            |queue| {
                let worker_queue = Arc::clone(&queue);
                let worker = thread::spawn(move || {
                    let (value, _guard) = worker_queue.pop_with_guard();
                    black_box(value);
                });

                queue.push(7);
                queue.join();
                worker.join().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark submitting a batch of jobs to a worker pool and waiting idle.
fn bench_worker_pool(c: &mut Criterion) {
    let pool = WorkerPool::new(4);

    c.bench_function("worker_pool_100_jobs", |b| {
        b.iter(|| {
            for i in 0..100u64 {
                pool.execute(move || {
                    black_box(i * 2);
                });
            }
            pool.wait_idle();
        });
    });
}

/// Benchmark a full producer/consumer stress run.
fn bench_stress_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress_run");
    group.sample_size(10);

    for consumers in [1usize, 4, 8] {
        group.bench_function(format!("4_producers_{consumers}_consumers"), |b| {
            b.iter(|| {
                let config = StressConfig::new()
                    .producers(4)
                    .consumers(consumers)
                    .items_per_producer(1000)
                    .pop_timeout(Duration::from_millis(20));
                black_box(run_queue_stress(config).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_queue_uncontended,
    bench_queue_handoff,
    bench_worker_pool,
    bench_stress_run
);
criterion_main!(benches);
