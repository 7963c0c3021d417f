//! Benchmarks for the CPU simulation step and the two streaming paths.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use embers::stream::{compact_live, expand_pool};
use embers::{Emitter, EmitterConfig};

/// Builds an emitter at steady state: the pool is full and every update
/// retires about as many particles as it spawns.
fn steady_emitter(capacity: usize) -> Emitter {
    let config = EmitterConfig::new()
        .with_max_particles(capacity)
        .with_rate(capacity as f32)
        .with_lifetime(1.0)
        .with_velocity(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5))
        .with_acceleration(Vec3::new(0.0, -2.0, 0.0))
        .with_rotation(0.0..1.0, 0.0..6.0);
    let mut emitter = Emitter::with_seed(config, 97);
    for _ in 0..128 {
        emitter.update(1.0 / 64.0);
    }
    emitter
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitter_update");

    for capacity in [256, 1024, 4096] {
        group.bench_with_input(
            BenchmarkId::new("steady_state", capacity),
            &capacity,
            |b, &capacity| {
                let mut emitter = steady_emitter(capacity);
                b.iter(|| {
                    emitter.update(black_box(1.0 / 240.0));
                    black_box(emitter.live_count())
                })
            },
        );
    }

    group.finish();
}

fn bench_expand_quads(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_quads");

    for capacity in [256, 1024, 4096] {
        group.bench_with_input(
            BenchmarkId::new("pool", capacity),
            &capacity,
            |b, &capacity| {
                let emitter = steady_emitter(capacity);
                let mut scratch = Vec::with_capacity(capacity * 4);
                b.iter(|| {
                    let live = expand_pool(
                        emitter.pool(),
                        emitter.config(),
                        Vec3::X,
                        Vec3::Y,
                        &mut scratch,
                    );
                    black_box(live)
                })
            },
        );
    }

    group.finish();
}

fn bench_compact_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact_records");

    for capacity in [256, 1024, 4096] {
        group.bench_with_input(
            BenchmarkId::new("pool", capacity),
            &capacity,
            |b, &capacity| {
                let emitter = steady_emitter(capacity);
                let mut scratch = Vec::with_capacity(capacity);
                b.iter(|| {
                    compact_live(emitter.pool(), &mut scratch);
                    black_box(scratch.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_update, bench_expand_quads, bench_compact_records);
criterion_main!(benches);
