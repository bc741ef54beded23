use bevy::math::UVec2;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use overlay_core::{
    attach_overlay, build_overlay_app, run_tick, BuildingBundle, Effectiveness, FactoryMeta,
    RecordingContainer,
};

fn factory_app(size: u32) -> bevy::app::App {
    let mut app = build_overlay_app(FactoryMeta {
        tiles_x: size,
        tiles_y: size,
    });
    for y in 0..size {
        for x in 0..size {
            app.world.spawn(
                BuildingBundle::new("conveyor", UVec2::new(x, y), UVec2::ONE)
                    .with_effectiveness(((x + y) % 101) as i32),
            );
        }
    }
    let mut container = RecordingContainer::new();
    attach_overlay(&mut app.world, &mut container, 16);
    app
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for size in [16u32, 32, 64, 128] {
        group.bench_with_input(BenchmarkId::new("unchanged", size), &size, |b, &size| {
            b.iter_batched(
                || factory_app(size),
                |mut app| run_tick(&mut app),
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("all_changed", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut app = factory_app(size);
                    let mut query = app.world.query::<&mut Effectiveness>();
                    for mut effectiveness in query.iter_mut(&mut app.world) {
                        *effectiveness = Effectiveness::percent(100);
                    }
                    app
                },
                |mut app| run_tick(&mut app),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(tick_benches, bench_tick);
criterion_main!(tick_benches);
