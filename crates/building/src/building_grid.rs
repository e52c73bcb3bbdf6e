//! Placement entry points and read queries over the whole grid.
//!
//! [`BuildingGrid`] ties the pieces together: it resolves a request into
//! slot targets, validates them, picks a prefab variant and runs the
//! resulting command through the undo history. Failures never mutate the
//! grid and never touch history.

use bevy::prelude::*;

use crate::cell::{Slot, SlotAddress};
use crate::commands::{CommandContext, CommandStack, PlacementCommand};
use crate::coords::{CellCoord, CellRect, Corner, Direction};
use crate::corner::CornerResolver;
use crate::grid::{GridLayers, GridSpace};
use crate::objects::{Category, ObjectDescriptor, ObjectId, ObjectStore, PlacedObject, Topology};
use crate::params::PlacementParams;
use crate::policy::{AreaPolicies, Destroyer, LoggingDestroyer, Mover};
use crate::prefab::{select_variant, variant_by_index};
use crate::results::{PlacementError, PlacementOutcome, PlacementResult};
use crate::rng::PlacementRng;
use crate::sequence::{DragRequest, PlacementSequence};
use crate::snapshot::{GridSnapshot, LayerSnapshot, OccupancySnapshot};
use crate::validator::{shared_slots, PlacementTarget, PlacementValidator, ValidationOptions};

/// Where and how one object should attach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSpec {
    Filling {
        cell: CellCoord,
        direction: Direction,
    },
    Edge {
        cell: CellCoord,
        direction: Direction,
        flipped: bool,
    },
    Corner {
        cell: CellCoord,
        corner: Corner,
    },
    Free {
        position: Vec3,
        direction: Direction,
    },
}

impl TargetSpec {
    pub fn topology(&self) -> Topology {
        match self {
            TargetSpec::Filling { .. } => Topology::Filling,
            TargetSpec::Edge { .. } => Topology::Edge,
            TargetSpec::Corner { .. } => Topology::Corner,
            TargetSpec::Free { .. } => Topology::Free,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub layer: usize,
    pub target: TargetSpec,
    pub descriptor: ObjectDescriptor,
    /// Explicit variant index; weighted random selection when `None`.
    pub variant: Option<usize>,
    pub ignore_replacement: bool,
}

impl PlacementRequest {
    pub fn new(layer: usize, target: TargetSpec, descriptor: ObjectDescriptor) -> Self {
        Self {
            layer,
            target,
            descriptor,
            variant: None,
            ignore_replacement: false,
        }
    }

    pub fn with_variant(mut self, index: usize) -> Self {
        self.variant = Some(index);
        self
    }

    pub fn ignoring_replacement(mut self) -> Self {
        self.ignore_replacement = true;
        self
    }
}

/// Resolved geometry of one request, before validation.
struct Plan {
    targets: Vec<PlacementTarget>,
    origin: CellCoord,
    direction: Direction,
    corner: Option<Corner>,
    flipped: bool,
    world_position: Vec3,
}

fn plan(grid: &GridSpace, target: TargetSpec, descriptor: &ObjectDescriptor) -> Plan {
    let cell_size = grid.cell_size();
    match target {
        TargetSpec::Filling { cell, direction } => {
            let clip = CellRect::around_grid(grid.width(), grid.length());
            let cells = descriptor.footprint_within(cell, direction, &clip);
            let (sx, sz) = descriptor.rotated_size(direction);
            let extent = Vec3::new(sx as f32 * cell_size, 0.0, sz as f32 * cell_size);
            Plan {
                targets: cells
                    .into_iter()
                    .map(|c| PlacementTarget::new(c, Slot::Base))
                    .collect(),
                origin: cell,
                direction,
                corner: None,
                flipped: false,
                world_position: grid.cell_to_world(cell) + extent * 0.5,
            }
        }
        TargetSpec::Edge {
            cell,
            direction,
            flipped,
        } => {
            let half = cell_size * 0.5;
            let offset = match direction {
                Direction::North => Vec3::new(half, 0.0, cell_size),
                Direction::East => Vec3::new(cell_size, 0.0, half),
                Direction::South => Vec3::new(half, 0.0, 0.0),
                Direction::West => Vec3::new(0.0, 0.0, half),
            };
            Plan {
                targets: vec![PlacementTarget::new(cell, Slot::Edge(direction))],
                origin: cell,
                direction,
                corner: None,
                flipped,
                world_position: grid.cell_to_world(cell) + offset,
            }
        }
        TargetSpec::Corner { cell, corner } => {
            let (ux, uz) = corner.unit_offset();
            Plan {
                targets: vec![PlacementTarget::new(cell, Slot::Corner(corner))],
                origin: cell,
                direction: Direction::North,
                corner: Some(corner),
                flipped: false,
                world_position: grid.cell_to_world(cell)
                    + Vec3::new(ux * cell_size, 0.0, uz * cell_size),
            }
        }
        TargetSpec::Free {
            position,
            direction,
        } => {
            let cell = grid.world_to_cell(position);
            Plan {
                targets: vec![PlacementTarget::new(cell, Slot::Free)],
                origin: cell,
                direction,
                corner: None,
                flipped: false,
                world_position: position,
            }
        }
    }
}

#[derive(Resource)]
pub struct BuildingGrid {
    layers: GridLayers,
    objects: ObjectStore,
    history: CommandStack,
    pub policies: AreaPolicies,
    destroyer: Option<Box<dyn Destroyer>>,
    mover: Option<Box<dyn Mover>>,
    rng: PlacementRng,
    params: PlacementParams,
}

impl Default for BuildingGrid {
    fn default() -> Self {
        Self::new(PlacementParams::default())
    }
}

impl BuildingGrid {
    /// A grid with a [`LoggingDestroyer`] and no area policies.
    pub fn new(params: PlacementParams) -> Self {
        let params = params.sanitized();
        Self {
            layers: GridLayers::new(&params),
            objects: ObjectStore::default(),
            history: CommandStack::with_limit(params.max_history as usize),
            policies: AreaPolicies::default(),
            destroyer: Some(Box::new(LoggingDestroyer::default())),
            mover: None,
            rng: PlacementRng::from_seed_u64(params.seed),
            params,
        }
    }

    pub fn set_destroyer(&mut self, destroyer: Option<Box<dyn Destroyer>>) {
        self.destroyer = destroyer;
    }

    pub fn set_mover(&mut self, mover: Option<Box<dyn Mover>>) {
        self.mover = mover;
    }

    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    pub fn layers(&self) -> &GridLayers {
        &self.layers
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(id).filter(|o| o.alive)
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn is_moving(&self) -> bool {
        self.mover.as_ref().is_some_and(|m| m.is_moving())
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Validate and execute one placement.
    pub fn place(&mut self, request: &PlacementRequest) -> PlacementResult {
        let grid = self
            .layers
            .layer(request.layer)
            .ok_or(PlacementError::UnknownLayer(request.layer))?;
        let plan = plan(grid, request.target, &request.descriptor);

        if self.already_placed(request, &plan) {
            return Ok(PlacementOutcome::NoOp);
        }

        let moving = self.is_moving();
        let options = ValidationOptions {
            ignore_replacement: request.ignore_replacement,
            move_mode: moving,
        };
        let validated = PlacementValidator::new(
            grid,
            &self.objects,
            &self.policies,
            self.destroyer.is_some(),
        )
        .validate(&plan.targets, &request.descriptor, options)?;

        let variants = &request.descriptor.variants;
        let variant = match request.variant {
            Some(index) => variant_by_index(variants, index),
            None => select_variant(variants, &mut self.rng.0),
        }
        .ok_or(PlacementError::NoVariantSelectable)?
        .name
        .clone();

        let mut footprint = Vec::new();
        for target in &validated.targets {
            for (cell, slot) in shared_slots(grid, target.cell, target.slot) {
                footprint.push(SlotAddress::new(request.layer, cell, slot));
            }
        }

        let object = PlacedObject {
            id: ObjectId(0),
            descriptor: request.descriptor.clone(),
            topology: request.target.topology(),
            variant,
            layer: request.layer,
            origin: plan.origin,
            direction: plan.direction,
            corner: plan.corner,
            flipped: plan.flipped,
            world_position: plan.world_position,
            footprint,
            alive: false,
        };
        let command = PlacementCommand::place(object, validated.replaced, moving);
        match self.execute(command) {
            Some(id) => {
                debug!(
                    "Placed {} ({:?}) on layer {} at {:?}",
                    request.descriptor.name, id, request.layer, plan.origin
                );
                Ok(PlacementOutcome::Placed(id))
            }
            None => Ok(PlacementOutcome::NoOp),
        }
    }

    /// `true` when every primary slot is in bounds and already holds a live
    /// object of the same descriptor with the same orientation and flip.
    fn already_placed(&self, request: &PlacementRequest, plan: &Plan) -> bool {
        if request.target.topology() == Topology::Free {
            return false;
        }
        let category = &request.descriptor.category;
        !plan.targets.is_empty()
            && plan.targets.iter().all(|target| {
                self.layers.in_bounds(request.layer, target.cell)
                    && self
                        .layers
                        .get_cell(request.layer, target.cell)
                        .occupant(target.slot, category)
                        .and_then(|id| self.object(id))
                        .is_some_and(|existing| {
                            existing.descriptor.name == request.descriptor.name
                                && existing.origin == plan.origin
                                && existing.direction == plan.direction
                                && existing.corner == plan.corner
                                && existing.flipped == plan.flipped
                        })
            })
    }

    pub fn place_filling(
        &mut self,
        layer: usize,
        cell: CellCoord,
        descriptor: &ObjectDescriptor,
        direction: Direction,
        variant: Option<usize>,
    ) -> PlacementResult {
        let mut request = PlacementRequest::new(
            layer,
            TargetSpec::Filling { cell, direction },
            descriptor.clone(),
        );
        request.variant = variant;
        self.place(&request)
    }

    pub fn place_edge(
        &mut self,
        layer: usize,
        cell: CellCoord,
        direction: Direction,
        descriptor: &ObjectDescriptor,
        variant: Option<usize>,
    ) -> PlacementResult {
        let mut request = PlacementRequest::new(
            layer,
            TargetSpec::Edge {
                cell,
                direction,
                flipped: false,
            },
            descriptor.clone(),
        );
        request.variant = variant;
        self.place(&request)
    }

    pub fn place_corner(
        &mut self,
        layer: usize,
        cell: CellCoord,
        corner: Corner,
        descriptor: &ObjectDescriptor,
        variant: Option<usize>,
    ) -> PlacementResult {
        let mut request =
            PlacementRequest::new(layer, TargetSpec::Corner { cell, corner }, descriptor.clone());
        request.variant = variant;
        self.place(&request)
    }

    /// Place a free object. The layer is derived from the height of `position`.
    pub fn place_free(
        &mut self,
        position: Vec3,
        descriptor: &ObjectDescriptor,
        variant: Option<usize>,
    ) -> PlacementResult {
        let layer = self.layers.layer_for_height(position.y);
        let mut request = PlacementRequest::new(
            layer,
            TargetSpec::Free {
                position,
                direction: Direction::North,
            },
            descriptor.clone(),
        );
        request.variant = variant;
        self.place(&request)
    }

    /// Remove a live object. Reversible through [`BuildingGrid::undo`].
    pub fn remove(&mut self, id: ObjectId) -> Result<ObjectId, PlacementError> {
        if !self.objects.is_alive(id) {
            return Err(PlacementError::ObjectNotFound(id));
        }
        let silent = self.is_moving();
        self.execute(PlacementCommand::remove(id, silent))
            .ok_or(PlacementError::ObjectNotFound(id))
    }

    fn context(&mut self) -> (CommandContext<'_>, &mut CommandStack) {
        (
            CommandContext {
                layers: &mut self.layers,
                objects: &mut self.objects,
                destroyer: &mut self.destroyer,
            },
            &mut self.history,
        )
    }

    fn execute(&mut self, command: PlacementCommand) -> Option<ObjectId> {
        let (mut ctx, history) = self.context();
        history.execute(command, &mut ctx)
    }

    /// Revert the most recent edit. Returns the object it affected.
    pub fn undo(&mut self) -> Option<ObjectId> {
        let (mut ctx, history) = self.context();
        history.undo(&mut ctx)
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> Option<ObjectId> {
        let (mut ctx, history) = self.context();
        history.redo(&mut ctx)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn in_bounds(&self, layer: usize, cell: CellCoord) -> bool {
        self.layers.in_bounds(layer, cell)
    }

    pub fn cell_occupancy(&self, layer: usize, cell: CellCoord) -> OccupancySnapshot {
        OccupancySnapshot {
            layer,
            cell,
            in_bounds: self.in_bounds(layer, cell),
            record: self.layers.get_cell(layer, cell),
        }
    }

    /// Live object of `category` in `slot`, if any.
    pub fn occupant(
        &self,
        layer: usize,
        cell: CellCoord,
        slot: Slot,
        category: &Category,
    ) -> Option<ObjectId> {
        self.layers
            .get_cell(layer, cell)
            .occupant(slot, category)
            .filter(|id| self.objects.is_alive(*id))
    }

    pub fn modifier(&self, layer: usize, cell: CellCoord, key: &str) -> f32 {
        self.layers
            .layer(layer)
            .map(|g| g.modifier(cell, key))
            .unwrap_or(0.0)
    }

    /// Modifiers are metadata: writes bypass validation and history.
    pub fn set_modifier(
        &mut self,
        layer: usize,
        cell: CellCoord,
        key: &str,
        value: f32,
    ) -> Result<(), PlacementError> {
        let grid = self
            .layers
            .layer_mut(layer)
            .ok_or(PlacementError::UnknownLayer(layer))?;
        grid.set_modifier(cell, key, value);
        Ok(())
    }

    pub fn set_size(&mut self, width: u32, length: u32) {
        self.params.width = width;
        self.params.length = length;
        self.layers.set_size(width, length);
    }

    /// Layer and cell under a world position.
    pub fn locate(&self, world: Vec3) -> Option<(usize, CellCoord)> {
        let layer = self.layers.layer_for_height(world.y);
        let grid = self.layers.layer(layer)?;
        Some((layer, grid.world_to_cell(world)))
    }

    /// Cell under `world` on `layer` and the corner of it nearest to `world`.
    pub fn corner_at(&self, layer: usize, world: Vec3) -> Option<(CellCoord, Corner)> {
        let grid = self.layers.layer(layer)?;
        let cell = grid.world_to_cell(world);
        let resolver = CornerResolver::new(grid.cell_size());
        Some((cell, resolver.resolve_corner(world, grid.cell_to_world(cell))))
    }

    /// Cell under `world` on `layer` and the edge of it nearest to `world`.
    pub fn edge_at(&self, layer: usize, world: Vec3) -> Option<(CellCoord, Direction)> {
        let grid = self.layers.layer(layer)?;
        let cell = grid.world_to_cell(world);
        let resolver = CornerResolver::new(grid.cell_size());
        Some((cell, resolver.resolve_edge(world, grid.cell_to_world(cell))))
    }

    // -----------------------------------------------------------------------
    // Drags
    // -----------------------------------------------------------------------

    /// Expand a drag into a paced sequence using the configured interval and
    /// batch size. Nothing is placed until the sequence is stepped.
    ///
    /// Targets further than one cell outside the grid are dropped, so a drag
    /// to a far-away cell costs no more than one across the whole grid.
    pub fn begin_drag(&self, request: &DragRequest) -> PlacementSequence {
        let clip = match self.layers.layer(request.layer) {
            Some(grid) => CellRect::around_grid(grid.width(), grid.length()),
            None => CellRect::around_grid(self.params.width, self.params.length),
        };
        PlacementSequence::clipped(
            request.clone(),
            &clip,
            self.params.placement_interval,
            self.params.batch_size as usize,
        )
    }

    /// Place whatever `sequence` releases after `dt` seconds. Each target is
    /// validated and recorded on its own.
    pub fn step_sequence(
        &mut self,
        sequence: &mut PlacementSequence,
        dt: f32,
    ) -> Vec<(TargetSpec, PlacementResult)> {
        let due = sequence.advance(dt);
        let drag = sequence.request();
        due.into_iter()
            .map(|target| {
                let request = PlacementRequest {
                    layer: drag.layer,
                    target,
                    descriptor: drag.descriptor.clone(),
                    variant: drag.variant,
                    ignore_replacement: drag.ignore_replacement,
                };
                (target, self.place(&request))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.params.width,
            length: self.params.length,
            layers: self
                .layers
                .iter()
                .map(|grid| LayerSnapshot {
                    layer: grid.layer() as u32,
                    cells: grid
                        .stored_cells()
                        .into_iter()
                        .map(|cell| (cell, grid.get_cell(cell)))
                        .collect(),
                })
                .collect(),
            rng: Some(self.rng.snapshot()),
        }
    }
}
