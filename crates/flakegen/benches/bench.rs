use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakegen::{DEFAULT_EPOCH, IdGenStatus, IdGenerator, MonotonicClock, SystemClock, TimeSource};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// One full millisecond of sequence numbers: the most a fixed clock can serve
// without spinning forever.
const TOTAL_IDS: usize = 4096;

fn fixed_generator() -> IdGenerator<FixedMockTime> {
    let millis = DEFAULT_EPOCH.as_millis() as u64 + 1;
    IdGenerator::new(1, 1, FixedMockTime { millis }).unwrap()
}

fn thread_counts() -> Vec<usize> {
    let max = num_cpus::get().max(1);
    [1, 2, 4, 8, 16]
        .into_iter()
        .filter(|&n| n <= max)
        .collect()
}

/// Hot path: a fresh generator per iteration never has to wait.
fn bench_generator<T>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> IdGenerator<T>,
) where
    T: TimeSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.try_next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Non-blocking polling with a caller-side yield on `Pending`.
fn bench_generator_poll_yield<T>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> IdGenerator<T>,
) where
    T: TimeSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let generator = generator_fn();
            let start = Instant::now();

            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    loop {
                        match generator.try_poll_id().unwrap() {
                            IdGenStatus::Ready { id } => {
                                black_box(id);
                                break;
                            }
                            IdGenStatus::Pending { .. } => std::thread::yield_now(),
                        }
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// One generator shared by several threads, all hammering the same lock.
fn bench_generator_contended<T>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> IdGenerator<T>,
) where
    T: TimeSource + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in thread_counts() {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_fn());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(generator.try_next_id().unwrap());
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/lock", fixed_generator);
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", fixed_generator);
}

fn benchmark_mono_sequential(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    bench_generator(c, "mono/sequential/lock", || IdGenerator::new(1, 1, clock.clone()).unwrap());
}

fn benchmark_mono_poll(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    bench_generator_poll_yield(c, "mono/poll/lock", || {
        IdGenerator::new(1, 1, clock.clone()).unwrap()
    });
}

fn benchmark_mono_contended(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    bench_generator_contended(c, "mono/contended/lock", || {
        IdGenerator::new(1, 1, clock.clone()).unwrap()
    });
}

fn benchmark_system_sequential(c: &mut Criterion) {
    bench_generator(c, "system/sequential/lock", || IdGenerator::new(1, 1, SystemClock).unwrap());
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential,
    benchmark_mock_contended,
    // Monotonic clock (may spin on exhaustion)
    benchmark_mono_sequential,
    benchmark_mono_poll,
    benchmark_mono_contended,
    // Wall clock
    benchmark_system_sequential,
);
criterion_main!(benches);
