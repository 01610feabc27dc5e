//! Benchmark for compact pool churn.
//!
//! TARGET: full pool age-and-compact well under 10us
//!
//! Run with: cargo bench --package kaboom_core --bench pool_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kaboom_core::CompactPool;

fn benchmark_fill_and_drain(c: &mut Criterion) {
    let mut pool: CompactPool<f32> = CompactPool::new(300);

    c.bench_function("compact_pool_fill_drain_300", |b| {
        b.iter(|| {
            for i in 0..300 {
                pool.push(black_box(i as f32 * 0.01));
            }
            // Ten ticks of aging, everything dies on the last
            for _ in 0..10 {
                pool.retain_mut(|life| {
                    *life -= 0.3;
                    *life > 0.0
                });
            }
            pool.clear();
        });
    });
}

criterion_group!(benches, benchmark_fill_and_drain);
criterion_main!(benches);
