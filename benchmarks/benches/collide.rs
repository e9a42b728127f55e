//! Intersection benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench collide
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench collide -- floor_mesh

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Mat4, Vec3};
use kinema::{CollisionDispatcher, CollisionEntry, CollisionPlane, CollisionSegment, Plane};
use kinema_bench::*;

// ---------------------------------------------------------------------------
// Floor mesh
// ---------------------------------------------------------------------------

fn bench_floor_mesh(c: &mut Criterion) {
    let dispatcher = CollisionDispatcher::default();
    let mut group = c.benchmark_group("floor_mesh/ray");
    for &n in &[8u32, 32, 128] {
        let mesh = Arc::new(floor_grid(n));
        let entries = drop_rays(&mesh, n, 256);
        group.bench_with_input(BenchmarkId::from_parameter(n * n * 2), &entries, |b, entries| {
            b.iter(|| {
                entries
                    .iter()
                    .filter(|entry| dispatcher.test_intersection(entry).is_some())
                    .count()
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Solid pairs
// ---------------------------------------------------------------------------

fn bench_pairs(c: &mut Criterion) {
    let dispatcher = CollisionDispatcher::default();
    let mut group = c.benchmark_group("pairs");

    let spheres = sphere_pairs(1024);
    group.bench_function("sphere_sphere", |b| {
        b.iter(|| {
            spheres
                .iter()
                .filter(|entry| dispatcher.test_intersection(entry).is_some())
                .count()
        });
    });

    let plane = Arc::new(CollisionPlane::new(Plane::new(Vec3::Z, 0.0)));
    let segments: Vec<CollisionEntry> = (0..1024)
        .map(|i| {
            let x = i as f32 * 0.01;
            let segment = CollisionSegment::new(
                Vec3::new(x, 0.0, 1.0),
                Vec3::new(x, 1.0, -1.0 + (i % 5) as f32),
            );
            CollisionEntry::new(Arc::new(segment), plane.clone(), Mat4::IDENTITY)
        })
        .collect();
    group.bench_function("segment_plane", |b| {
        b.iter(|| {
            segments
                .iter()
                .filter(|entry| dispatcher.test_intersection(entry).is_some())
                .count()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_floor_mesh, bench_pairs);
criterion_main!(benches);
