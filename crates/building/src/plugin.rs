//! Bevy wiring for the placement core.

use bevy::prelude::*;

use crate::building_grid::BuildingGrid;
use crate::events::{
    DragCancelled, DragRequested, GridMode, GridModeChanged, PlacementFailed,
    PlacementRequested, PlacementSucceeded, RedoRequested, RemoveRequested, UndoRequested,
};
use crate::params::PlacementParams;
use crate::result_log::PlacementLog;
use crate::results::{PlacementOutcome, PlacementResult};
use crate::sequence::PlacementSequence;

/// Drags currently being paced out.
#[derive(Resource, Debug, Default)]
pub struct ActiveDrags {
    pub sequences: Vec<PlacementSequence>,
}

impl ActiveDrags {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    fn cancel_all(&mut self) {
        for sequence in &mut self.sequences {
            sequence.cancel();
        }
        self.sequences.clear();
    }
}

/// Registers grid resources, request/result events and the systems that
/// serve them.
///
/// Insert a [`PlacementParams`] (or a ready [`BuildingGrid`]) before adding
/// the plugin to configure the grid; defaults are used otherwise.
pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlacementParams>()
            .init_resource::<PlacementLog>()
            .init_resource::<ActiveDrags>()
            .init_resource::<GridMode>()
            .add_event::<PlacementRequested>()
            .add_event::<DragRequested>()
            .add_event::<DragCancelled>()
            .add_event::<GridModeChanged>()
            .add_event::<RemoveRequested>()
            .add_event::<UndoRequested>()
            .add_event::<RedoRequested>()
            .add_event::<PlacementSucceeded>()
            .add_event::<PlacementFailed>();

        if !app.world().contains_resource::<BuildingGrid>() {
            let params = app.world().resource::<PlacementParams>().clone();
            app.insert_resource(BuildingGrid::new(params));
        }

        app.add_systems(
            Update,
            (
                apply_grid_mode,
                cancel_drags,
                handle_placement_requests,
                start_drags,
                advance_drags,
                handle_removals,
                process_undo,
                process_redo,
            )
                .chain(),
        );
    }
}

/// Log the result and emit the matching event. Move mode stays silent.
fn report(
    grid: &BuildingGrid,
    descriptor: &str,
    layer: usize,
    result: PlacementResult,
    log: &mut PlacementLog,
    succeeded: &mut EventWriter<PlacementSucceeded>,
    failed: &mut EventWriter<PlacementFailed>,
) {
    let silent = grid.is_moving();
    match &result {
        Ok(PlacementOutcome::Placed(object)) if !silent => {
            succeeded.send(PlacementSucceeded {
                object: *object,
                descriptor: descriptor.to_string(),
                layer,
            });
        }
        Err(error) => {
            warn!("Placement of {descriptor} on layer {layer} failed: {}", error.message());
            if !silent {
                failed.send(PlacementFailed {
                    descriptor: descriptor.to_string(),
                    layer,
                    error: error.clone(),
                });
            }
        }
        _ => {}
    }
    log.push(descriptor, layer, result);
}

fn apply_grid_mode(
    mut events: EventReader<GridModeChanged>,
    mut mode: ResMut<GridMode>,
    mut drags: ResMut<ActiveDrags>,
) {
    for GridModeChanged(next) in events.read() {
        if *mode == *next {
            continue;
        }
        if !drags.is_empty() {
            info!("Grid mode change cancels {} running drag(s)", drags.len());
        }
        drags.cancel_all();
        *mode = *next;
    }
}

fn cancel_drags(mut events: EventReader<DragCancelled>, mut drags: ResMut<ActiveDrags>) {
    if events.read().count() > 0 {
        drags.cancel_all();
    }
}

fn handle_placement_requests(
    mut events: EventReader<PlacementRequested>,
    mode: Res<GridMode>,
    mut grid: ResMut<BuildingGrid>,
    mut log: ResMut<PlacementLog>,
    mut succeeded: EventWriter<PlacementSucceeded>,
    mut failed: EventWriter<PlacementFailed>,
) {
    for PlacementRequested(request) in events.read() {
        if *mode == GridMode::Disabled {
            debug!("Grid disabled, dropping placement of {}", request.descriptor.name);
            continue;
        }
        let result = grid.place(request);
        report(
            &grid,
            &request.descriptor.name,
            request.layer,
            result,
            &mut log,
            &mut succeeded,
            &mut failed,
        );
    }
}

fn start_drags(
    mut events: EventReader<DragRequested>,
    mode: Res<GridMode>,
    grid: Res<BuildingGrid>,
    mut drags: ResMut<ActiveDrags>,
) {
    for DragRequested(request) in events.read() {
        if *mode == GridMode::Disabled {
            debug!("Grid disabled, dropping drag of {}", request.descriptor.name);
            continue;
        }
        let sequence = grid.begin_drag(request);
        debug!(
            "Drag of {} started with {} target(s)",
            request.descriptor.name,
            sequence.targets().len()
        );
        drags.sequences.push(sequence);
    }
}

fn advance_drags(
    time: Res<Time>,
    mut grid: ResMut<BuildingGrid>,
    mut drags: ResMut<ActiveDrags>,
    mut log: ResMut<PlacementLog>,
    mut succeeded: EventWriter<PlacementSucceeded>,
    mut failed: EventWriter<PlacementFailed>,
) {
    let dt = time.delta_secs();
    for sequence in &mut drags.sequences {
        let layer = sequence.request().layer;
        let name = sequence.request().descriptor.name.clone();
        for (_, result) in grid.step_sequence(sequence, dt) {
            report(
                &grid,
                &name,
                layer,
                result,
                &mut log,
                &mut succeeded,
                &mut failed,
            );
        }
    }
    drags.sequences.retain(|s| !s.is_finished());
}

fn handle_removals(mut events: EventReader<RemoveRequested>, mut grid: ResMut<BuildingGrid>) {
    for RemoveRequested(id) in events.read() {
        if let Err(error) = grid.remove(*id) {
            warn!("Removal failed: {}", error.message());
        }
    }
}

fn process_undo(mut events: EventReader<UndoRequested>, mut grid: ResMut<BuildingGrid>) {
    for _ in events.read() {
        match grid.undo() {
            Some(id) => debug!("Undid edit of {:?}", id),
            None => debug!("Nothing to undo"),
        }
    }
}

fn process_redo(mut events: EventReader<RedoRequested>, mut grid: ResMut<BuildingGrid>) {
    for _ in events.read() {
        match grid.redo() {
            Some(id) => debug!("Redid edit of {:?}", id),
            None => debug!("Nothing to redo"),
        }
    }
}
