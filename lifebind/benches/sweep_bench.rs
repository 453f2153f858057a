//! Benchmarks for registry sweeps.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use lifebind::prelude::*;
use lifebind::testing::CountingResource;
use std::sync::Arc;

fn manual_registry() -> Arc<ResourceRegistry> {
    ResourceRegistry::new(RegistryConfig::new().with_auto_start(false))
        .unwrap_or_else(|e| panic!("invalid bench config: {e}"))
}

fn sweep_benchmark(c: &mut Criterion) {
    let live = Arc::new(());
    let idle = manual_registry();
    for _ in 0..1_000 {
        idle.register(CountingResource::new(), LivenessToken::new(&live));
    }
    c.bench_function("sweep_1000_live", |b| {
        b.iter(|| black_box(idle.sweep_once()))
    });

    c.bench_function("sweep_1000_expired", |b| {
        b.iter_batched(
            || {
                let registry = manual_registry();
                for _ in 0..1_000 {
                    registry.register(CountingResource::new(), LivenessToken::expired());
                }
                registry
            },
            |registry| black_box(registry.sweep_once()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, sweep_benchmark);
criterion_main!(benches);
