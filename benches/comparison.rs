use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use fork_pool::ThreadPool;

fn fib_fork_pool(pool: &Arc<ThreadPool>, n: u64) -> u64 {
    if n < 2 {
        return n;
    }

    let left = {
        let inner = pool.clone();
        pool.spawn(move || fib_fork_pool(&inner, n - 1))
    };
    let right = {
        let inner = pool.clone();
        pool.spawn(move || fib_fork_pool(&inner, n - 2))
    };

    pool.join(&left);
    pool.join(&right);

    left.take().unwrap() + right.take().unwrap()
}

fn fib_rayon(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let (left, right) = rayon::join(|| fib_rayon(n - 1), || fib_rayon(n - 2));
    left + right
}

// Recursive fork-join, the workload the helping protocol exists for
fn bench_recursive_fork_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive_fib_16");

    group.bench_function("fork_pool", |b| {
        let pool = Arc::new(fork_pool::new().unwrap());
        b.iter(|| {
            let result = fib_fork_pool(&pool, black_box(16));
            assert_eq!(result, 987);
            result
        });
    });

    group.bench_function("rayon", |b| {
        b.iter(|| {
            let result = fib_rayon(black_box(16));
            assert_eq!(result, 987);
            result
        });
    });

    group.finish();
}

// Flat batch of independent small tasks
fn bench_flat_tasks(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_tasks_1000");

    group.bench_function("fork_pool", |b| {
        let pool = fork_pool::new().unwrap();
        b.iter(|| {
            let futures: Vec<_> = (0..1000u64)
                .map(|i| pool.spawn(move || i.wrapping_mul(17).wrapping_add(23)))
                .collect();
            let mut sum = 0u64;
            for future in &futures {
                pool.join(future);
                sum = sum.wrapping_add(future.take().unwrap());
            }
            black_box(sum)
        });
    });

    group.bench_function("rayon", |b| {
        use rayon::prelude::*;
        b.iter(|| {
            let sum = (0..1000u64)
                .into_par_iter()
                .map(|i| i.wrapping_mul(17).wrapping_add(23))
                .reduce(|| 0, u64::wrapping_add);
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_recursive_fork_join, bench_flat_tasks);
criterion_main!(benches);
