use bevy::log::LogPlugin;
use bevy::prelude::*;

use grid_building::objects::{ObjectDescriptor, PrefabVariant};
use grid_building::sequence::{DragRequest, DragTopology};
use grid_building::shape::PlacementPattern;
use grid_building::{
    BuildingGrid, CellCoord, Corner, Direction, DragRequested, PlacementFailed, PlacementParams,
    PlacementPlugin, PlacementRequest, PlacementRequested, PlacementSucceeded, TargetSpec,
    UndoRequested,
};

mod agent_mode;

/// Frames the scripted demo runs after queueing its requests.
const DEMO_FRAMES: u32 = 120;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let params = load_params(&args);

    if args.iter().any(|a| a == "--agent") {
        agent_mode::run_agent_mode(params);
        return;
    }

    run_demo(params);
}

/// `--params <path>` reads grid parameters from a JSON file.
fn load_params(args: &[String]) -> PlacementParams {
    let Some(path) = args
        .iter()
        .position(|a| a == "--params")
        .and_then(|i| args.get(i + 1))
    else {
        return PlacementParams::default();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => PlacementParams::from_json_or_default(&text),
        Err(e) => {
            eprintln!("could not read {path}: {e}, using default parameters");
            PlacementParams::default()
        }
    }
}

/// Build a headless App with the placement systems and no rendering.
fn headless_app(params: PlacementParams) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LogPlugin::default());
    app.insert_resource(params);
    app.add_plugins(PlacementPlugin);
    app.add_systems(Update, log_results);
    // Initial update so the plugin's resources settle before requests arrive.
    app.update();
    app
}

fn log_results(
    mut succeeded: EventReader<PlacementSucceeded>,
    mut failed: EventReader<PlacementFailed>,
) {
    for ev in succeeded.read() {
        info!(
            "placed {} as {:?} on layer {}",
            ev.descriptor, ev.object, ev.layer
        );
    }
    for ev in failed.read() {
        warn!(
            "could not place {} on layer {}: {}",
            ev.descriptor,
            ev.layer,
            ev.error.message()
        );
    }
}

// ---------------------------------------------------------------------------
// Scripted demo
// ---------------------------------------------------------------------------

fn run_demo(params: PlacementParams) {
    let mut app = headless_app(params);

    let barn = ObjectDescriptor::new("barn", "building")
        .with_size(3, 2)
        .with_variants(vec![
            PrefabVariant::new("barn_red", 3.0),
            PrefabVariant::new("barn_grey", 1.0),
        ]);
    let fence = ObjectDescriptor::new("fence", "fence");
    let post = ObjectDescriptor::new("post", "post");
    let crop = ObjectDescriptor::new("wheat", "crop").replaceable();

    let world = app.world_mut();
    world.send_event(PlacementRequested(PlacementRequest::new(
        0,
        TargetSpec::Filling {
            cell: CellCoord::new(2, 2),
            direction: Direction::East,
        },
        barn.clone(),
    )));
    // Overlaps the first barn and is rejected.
    world.send_event(PlacementRequested(PlacementRequest::new(
        0,
        TargetSpec::Filling {
            cell: CellCoord::new(3, 3),
            direction: Direction::North,
        },
        barn,
    )));
    world.send_event(DragRequested(DragRequest::new(
        0,
        PlacementPattern::WireBox,
        DragTopology::Edge {
            direction: Direction::North,
        },
        CellCoord::new(8, 8),
        CellCoord::new(12, 11),
        fence,
    )));
    world.send_event(DragRequested(
        DragRequest::new(
            0,
            PlacementPattern::WireBox,
            DragTopology::Corner {
                corner: Corner::SouthWest,
            },
            CellCoord::new(8, 8),
            CellCoord::new(12, 11),
            post,
        )
        .endpoints_only(),
    ));
    world.send_event(DragRequested(DragRequest::new(
        0,
        PlacementPattern::Box,
        DragTopology::Filling {
            direction: Direction::North,
        },
        CellCoord::new(9, 9),
        CellCoord::new(11, 10),
        crop,
    )));

    for _ in 0..DEMO_FRAMES {
        app.update();
    }

    app.world_mut().send_event(UndoRequested);
    app.update();

    let grid = app.world().resource::<BuildingGrid>();
    info!(
        "demo finished: {} live objects, {} undo steps",
        grid.objects().live_count(),
        grid.history().undo_stack.len()
    );
}
