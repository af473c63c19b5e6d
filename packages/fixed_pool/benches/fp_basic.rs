//! Basic benchmarks for the `fixed_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use fixed_pool::FixedPool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;
const POOL_CAPACITY: usize = 1024;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_basic");

    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(FixedPool::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    group.bench_function("resize_1024", |b| {
        b.iter_custom(|iters| {
            let pools = iter::repeat_with(FixedPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let start = Instant::now();

            for pool in &pools {
                pool.resize(black_box(POOL_CAPACITY)).unwrap();
            }

            start.elapsed()
        });
    });

    group.bench_function("acquire_release", |b| {
        b.iter_custom(|iters| {
            let pool = FixedPool::<TestItem>::new();
            pool.resize(POOL_CAPACITY).unwrap();

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(pool.acquire(black_box(TEST_VALUE)).unwrap()));
            }

            start.elapsed()
        });
    });

    group.bench_function("acquire_with_release", |b| {
        b.iter_custom(|iters| {
            let pool = FixedPool::<TestItem>::new();
            pool.resize(POOL_CAPACITY).unwrap();

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(
                    pool.acquire_with(|| black_box(TEST_VALUE)).unwrap(),
                ));
            }

            start.elapsed()
        });
    });

    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let pool = FixedPool::<TestItem>::new();
            pool.resize(POOL_CAPACITY).unwrap();

            let item = pool.acquire(TEST_VALUE).unwrap();

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(*item);
            }

            start.elapsed()
        });
    });

    group.bench_function("available", |b| {
        b.iter_custom(|iters| {
            let pool = FixedPool::<TestItem>::new();
            pool.resize(POOL_CAPACITY).unwrap();

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.available());
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("fixed_slow");

    group.bench_function("drain_and_refill_1024", |b| {
        // Acquire every slot, release them all, and repeat. This stresses the
        // free-stack bookkeeping at both extremes of occupancy.
        b.iter_custom(|iters| {
            let pool = FixedPool::<TestItem>::new();
            pool.resize(POOL_CAPACITY).unwrap();

            let mut handles = Vec::with_capacity(POOL_CAPACITY);

            let start = Instant::now();

            for _ in 0..iters {
                for _ in 0..POOL_CAPACITY {
                    handles.push(pool.acquire(black_box(TEST_VALUE)).unwrap());
                }

                handles.clear();
            }

            start.elapsed()
        });
    });

    group.finish();
}
