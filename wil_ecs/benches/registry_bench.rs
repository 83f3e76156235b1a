//! Registry benchmarks.
//!
//! Run with: `cargo bench --package wil_ecs`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wil_ecs::{Component, Entity, Registry};

#[derive(Component, Clone, Copy)]
struct Transform([f32; 3]);

#[derive(Component, Clone, Copy)]
struct Velocity([f32; 3]);

#[derive(Component, Clone, Copy)]
struct Model(u32);

fn populated(count: usize) -> (Registry, Vec<Entity>) {
    let mut registry = Registry::new();
    let entities: Vec<Entity> = (0..count).map(|_| registry.create_entity()).collect();
    for (i, &e) in entities.iter().enumerate() {
        registry.add_component(e, Transform([i as f32; 3])).unwrap();
        if i % 2 == 0 {
            registry.add_component(e, Velocity([1.0, 0.0, 0.0])).unwrap();
        }
        if i % 3 == 0 {
            registry.add_component(e, Model(i as u32)).unwrap();
        }
    }
    (registry, entities)
}

fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_destroy");

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut registry = Registry::new();
            b.iter(|| {
                let entities: Vec<Entity> = (0..count).map(|_| registry.create_entity()).collect();
                for e in entities {
                    registry.destroy_entity(e).unwrap();
                }
                black_box(registry.entity_count())
            });
        });
    }

    group.finish();
}

fn bench_component_churn(c: &mut Criterion) {
    let (mut registry, entities) = populated(10_000);
    let _view = registry.register_view::<(Transform, Velocity)>().unwrap();

    c.bench_function("add_remove_velocity_10k", |b| {
        b.iter(|| {
            for &e in entities.iter().skip(1).step_by(2) {
                registry.add_component(e, Velocity([0.0, 1.0, 0.0])).unwrap();
            }
            for &e in entities.iter().skip(1).step_by(2) {
                black_box(registry.remove_component::<Velocity>(e).unwrap());
            }
        });
    });
}

fn bench_view_iteration(c: &mut Criterion) {
    let (mut registry, _) = populated(10_000);
    let moving = registry.register_view::<(Transform, Velocity)>().unwrap();

    c.bench_function("view_iterate_transform_velocity_10k", |b| {
        b.iter(|| {
            let view = registry.view(moving).unwrap();
            let mut sum = 0.0f32;
            for e in view.entities() {
                let (transform, velocity) = registry
                    .get_components::<(Transform, Velocity)>(e)
                    .unwrap();
                sum += transform.0[0] + velocity.0[0];
            }
            black_box(sum)
        });
    });

    c.bench_function("dense_iterate_transform_10k", |b| {
        b.iter(|| {
            let transforms = registry.storage::<Transform>().unwrap();
            black_box(transforms.components().iter().map(|t| t.0[1]).sum::<f32>())
        });
    });
}

criterion_group!(
    benches,
    bench_create_destroy,
    bench_component_churn,
    bench_view_iteration
);
criterion_main!(benches);
