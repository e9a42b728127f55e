//! Animation binding and blending benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench blend
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench blend -- update

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use kinema::{
    BlendType, HierarchyMatchFlags, PartSubset, Skeleton, animation_system, transform_system,
};
use kinema_bench::*;

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");
    for &(depth, fanout) in &[(3usize, 3usize), (4, 4), (5, 4)] {
        let anim = sway(depth, fanout, 10, 0.0);
        let label = format!("{depth}x{fanout}");
        group.bench_with_input(BenchmarkId::from_parameter(label), &anim, |b, anim| {
            b.iter_batched(
                || skeleton(depth, fanout),
                |mut bundle| {
                    bundle.bind_anim(anim.clone(), HierarchyMatchFlags::empty(), &PartSubset::new())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

fn bench_update(c: &mut Criterion) {
    let blend_types = [
        ("linear", BlendType::Linear),
        ("normalized_linear", BlendType::NormalizedLinear),
        ("componentwise", BlendType::Componentwise),
        ("componentwise_quat", BlendType::ComponentwiseQuat),
    ];

    let mut group = c.benchmark_group("update/blend_type");
    for (name, blend_type) in blend_types {
        let mut bundle = blended_skeleton(4, 3, 3);
        bundle.set_blend_type(blend_type);
        group.bench_function(name, |b| {
            b.iter(|| {
                bundle.advance(1.0 / 60.0);
                bundle.update(&())
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("update/layers");
    for &layers in &[1usize, 2, 4, 8] {
        let mut bundle = blended_skeleton(4, 3, layers);
        bundle.set_frame_blend_flag(true);
        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.iter(|| {
                bundle.advance(1.0 / 60.0);
                bundle.update(&())
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

fn bench_world(c: &mut Criterion) {
    let mut group = c.benchmark_group("world/skeletons");
    for &n in &[16usize, 64, 256] {
        let mut world = hecs::World::new();
        for _ in 0..n {
            world.spawn((Skeleton(blended_skeleton(3, 3, 2)),));
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                transform_system(&mut world);
                animation_system(&mut world, 1.0 / 60.0);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bind, bench_update, bench_world);
criterion_main!(benches);
