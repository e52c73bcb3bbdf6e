//! Headless `--agent` mode: a blocking loop that reads JSON commands from
//! stdin and writes one JSON response per command to stdout.
//!
//! ## Protocol
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator:
//!
//! ```text
//! {"cmd":"place","layer":0,"target":{"Filling":{"cell":{"x":1,"z":2},"direction":"North"}},"descriptor":{...}}
//! {"cmd":"drag","layer":0,"pattern":"Box","topology":{"Filling":{"direction":"North"}},"origin":{...},"end":{...},"descriptor":{...}}
//! {"cmd":"step","frames":10}
//! {"cmd":"query","layer":0,"cell":{"x":1,"z":2}}
//! {"cmd":"undo"} / {"cmd":"redo"} / {"cmd":"remove","id":3} / {"cmd":"snapshot"} / {"cmd":"quit"}
//! ```
//!
//! Free placements are not exposed; they need a world position rather than a
//! cell.

use std::io::{BufRead, Write};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use grid_building::objects::ObjectDescriptor;
use grid_building::sequence::{DragRequest, DragTopology};
use grid_building::shape::PlacementPattern;
use grid_building::snapshot::OccupancySnapshot;
use grid_building::{
    BuildingGrid, CellCoord, Corner, Direction, DragCancelled, DragRequested, ObjectId,
    PlacementFailed, PlacementParams, PlacementPlugin, PlacementRequest, PlacementRequested,
    PlacementSucceeded, RedoRequested, RemoveRequested, TargetSpec, UndoRequested,
};

/// Cell-addressed targets accepted over the protocol.
#[derive(Debug, Deserialize)]
enum AgentTarget {
    Filling { cell: CellCoord, direction: Direction },
    Edge { cell: CellCoord, direction: Direction },
    Corner { cell: CellCoord, corner: Corner },
}

impl AgentTarget {
    fn into_target(self) -> TargetSpec {
        match self {
            AgentTarget::Filling { cell, direction } => TargetSpec::Filling { cell, direction },
            AgentTarget::Edge { cell, direction } => TargetSpec::Edge {
                cell,
                direction,
                flipped: false,
            },
            AgentTarget::Corner { cell, corner } => TargetSpec::Corner { cell, corner },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum AgentCommand {
    Place {
        layer: usize,
        target: AgentTarget,
        descriptor: ObjectDescriptor,
        #[serde(default)]
        variant: Option<usize>,
    },
    Drag {
        layer: usize,
        pattern: PlacementPattern,
        topology: DragTopology,
        origin: CellCoord,
        end: CellCoord,
        descriptor: ObjectDescriptor,
        #[serde(default)]
        endpoints_only: bool,
    },
    CancelDrags,
    Step {
        frames: u32,
    },
    Remove {
        id: ObjectId,
    },
    Undo,
    Redo,
    Query {
        layer: usize,
        cell: CellCoord,
    },
    Snapshot,
    Quit,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AgentResponse {
    Ready,
    /// Results observed while running frames for the command.
    Results {
        placed: Vec<ObjectId>,
        failed: Vec<String>,
        live_objects: usize,
    },
    Cell {
        occupancy: OccupancySnapshot,
    },
    /// Bitcode-encoded [`grid_building::snapshot::GridSnapshot`].
    Snapshot {
        bytes: Vec<u8>,
    },
    Error {
        message: String,
    },
    Goodbye,
}

pub fn run_agent_mode(params: PlacementParams) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(params);
    app.add_plugins(PlacementPlugin);
    app.update();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    respond(&mut stdout, &AgentResponse::Ready);
    // Log to stderr so it does not interfere with the JSON protocol on stdout.
    eprintln!("grid-building agent mode ready, waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<AgentCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => AgentResponse::Error {
                message: format!("Parse error: {e}"),
            },
        };
        let is_goodbye = matches!(response, AgentResponse::Goodbye);
        respond(&mut stdout, &response);
        if is_goodbye {
            break;
        }
    }

    eprintln!("grid-building agent mode shutting down");
}

fn respond(out: &mut impl Write, response: &AgentResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
        }
        Err(e) => {
            let _ = writeln!(out, r#"{{"type":"error","message":"encode failed: {e}"}}"#);
        }
    }
    let _ = out.flush();
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn process_command(cmd: AgentCommand, app: &mut App) -> AgentResponse {
    match cmd {
        AgentCommand::Place {
            layer,
            target,
            descriptor,
            variant,
        } => {
            let mut request = PlacementRequest::new(layer, target.into_target(), descriptor);
            request.variant = variant;
            app.world_mut().send_event(PlacementRequested(request));
            run_frames(app, 1)
        }
        AgentCommand::Drag {
            layer,
            pattern,
            topology,
            origin,
            end,
            descriptor,
            endpoints_only,
        } => {
            let mut request = DragRequest::new(layer, pattern, topology, origin, end, descriptor);
            request.endpoints_only = endpoints_only;
            app.world_mut().send_event(DragRequested(request));
            run_frames(app, 1)
        }
        AgentCommand::CancelDrags => {
            app.world_mut().send_event(DragCancelled);
            run_frames(app, 1)
        }
        AgentCommand::Step { frames } => run_frames(app, frames.max(1)),
        AgentCommand::Remove { id } => {
            app.world_mut().send_event(RemoveRequested(id));
            run_frames(app, 1)
        }
        AgentCommand::Undo => {
            app.world_mut().send_event(UndoRequested);
            run_frames(app, 1)
        }
        AgentCommand::Redo => {
            app.world_mut().send_event(RedoRequested);
            run_frames(app, 1)
        }
        AgentCommand::Query { layer, cell } => AgentResponse::Cell {
            occupancy: app
                .world()
                .resource::<BuildingGrid>()
                .cell_occupancy(layer, cell),
        },
        AgentCommand::Snapshot => AgentResponse::Snapshot {
            bytes: app.world().resource::<BuildingGrid>().snapshot().encode(),
        },
        AgentCommand::Quit => AgentResponse::Goodbye,
    }
}

/// Run `frames` updates and collect every placement result they produced.
fn run_frames(app: &mut App, frames: u32) -> AgentResponse {
    let mut placed = Vec::new();
    let mut failed = Vec::new();
    for _ in 0..frames {
        app.update();
        let world = app.world_mut();
        placed.extend(
            world
                .resource_mut::<Events<PlacementSucceeded>>()
                .drain()
                .map(|ev| ev.object),
        );
        failed.extend(
            world
                .resource_mut::<Events<PlacementFailed>>()
                .drain()
                .map(|ev| format!("{}: {}", ev.descriptor, ev.error.message())),
        );
    }
    AgentResponse::Results {
        placed,
        failed,
        live_objects: app
            .world()
            .resource::<BuildingGrid>()
            .objects()
            .live_count(),
    }
}
