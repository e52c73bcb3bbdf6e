//! Criterion benchmarks for placement on a direct `BuildingGrid`.
//!
//! Benchmarks:
//!   - shape expansion for a 64x64 Box and WireBox drag
//!   - validate + place + undo of a single 2x2 building
//!   - edge placement with neighbor mirroring
//!
//! Run with: cargo bench -p grid_building --bench placement_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use grid_building::coords::{CellCoord, Direction};
use grid_building::objects::ObjectDescriptor;
use grid_building::params::PlacementParams;
use grid_building::shape::{expand_cells, expand_edges, PlacementPattern};
use grid_building::BuildingGrid;

fn bench_grid() -> BuildingGrid {
    BuildingGrid::new(PlacementParams {
        width: 128,
        length: 128,
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Benchmark: shape expansion
// ---------------------------------------------------------------------------

fn bench_shape_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_expansion");
    group.sample_size(200);

    let origin = CellCoord::new(0, 0);
    let end = CellCoord::new(63, 63);

    group.bench_function("box_64x64", |b| {
        b.iter(|| {
            black_box(expand_cells(
                PlacementPattern::Box,
                black_box(origin),
                Some(black_box(end)),
                false,
            ))
        });
    });

    group.bench_function("wire_box_edges_64x64", |b| {
        b.iter(|| {
            black_box(expand_edges(
                PlacementPattern::WireBox,
                black_box(origin),
                Some(black_box(end)),
                false,
                Direction::North,
            ))
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: place + undo
// ---------------------------------------------------------------------------

fn bench_place_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_undo");
    group.sample_size(500);

    let shed = ObjectDescriptor::new("shed", "building").with_size(2, 2);
    let fence = ObjectDescriptor::new("fence", "fence");

    // Undo after every iteration keeps the grid empty and history shallow.
    group.bench_function("filling_2x2", |b| {
        let mut grid = bench_grid();
        b.iter(|| {
            let result = grid.place_filling(
                0,
                black_box(CellCoord::new(64, 64)),
                &shed,
                Direction::North,
                None,
            );
            black_box(&result);
            grid.undo();
        });
    });

    group.bench_function("edge_mirrored", |b| {
        let mut grid = bench_grid();
        b.iter(|| {
            let result = grid.place_edge(
                0,
                black_box(CellCoord::new(64, 64)),
                Direction::East,
                &fence,
                None,
            );
            black_box(&result);
            grid.undo();
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Register groups
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_shape_expansion, bench_place_undo);
criterion_main!(benches);
