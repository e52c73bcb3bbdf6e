//! Criterion benchmark for a full drag through the plugin.
//!
//! Builds a `TestGrid` (headless Bevy App), requests a 32x32 Box drag with a
//! zero interval and measures the frame that places every target.
//!
//! Run with: cargo bench -p grid_building --bench drag_bench --features bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use grid_building::coords::{CellCoord, Direction};
use grid_building::objects::ObjectDescriptor;
use grid_building::params::PlacementParams;
use grid_building::sequence::{DragRequest, DragTopology};
use grid_building::shape::PlacementPattern;
use grid_building::test_harness::TestGrid;
use grid_building::DragRequested;

fn bench_box_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("plugin_drag");
    group.sample_size(20);

    group.bench_function("box_32x32", |b| {
        b.iter_batched(
            || {
                let mut app = TestGrid::with_params(PlacementParams {
                    width: 64,
                    length: 64,
                    placement_interval: 0.0,
                    ..Default::default()
                });
                app.send(DragRequested(DragRequest::new(
                    0,
                    PlacementPattern::Box,
                    DragTopology::Filling {
                        direction: Direction::North,
                    },
                    CellCoord::new(0, 0),
                    CellCoord::new(31, 31),
                    ObjectDescriptor::new("floor", "floor"),
                )));
                app
            },
            |mut app| {
                app.tick(1);
                black_box(app.live_objects())
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_box_drag);
criterion_main!(benches);
