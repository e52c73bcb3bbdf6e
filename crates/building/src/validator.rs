//! Multi-stage placement validation.
//!
//! Per target, in order:
//! 1. Bounds: any out-of-bounds cell aborts with [`PlacementError::OutOfBounds`].
//! 2. Occupancy: a live occupant of the same category is either marked for
//!    replacement (replaceable, replacement not ignored, destroyer present)
//!    or makes the cell unbuildable.
//! 3. Basic area enabler, then 4. scoped area enabler: either one forces the
//!    cell buildable and skips the disablers.
//! 5. Basic area disabler, then 6. scoped area disabler: either one blocks.
//!
//! Every target is evaluated even after a failure so the reported cell is
//! the first failing one in target order. Nothing is mutated here.

use crate::cell::Slot;
use crate::coords::{CellCoord, Direction};
use crate::corner::{edge_neighbor, shared_corner_cells};
use crate::grid::GridSpace;
use crate::objects::{ObjectDescriptor, ObjectId, ObjectStore};
use crate::policy::AreaPolicies;
use crate::results::PlacementError;

/// One slot the placement wants to claim, before mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementTarget {
    pub cell: CellCoord,
    pub slot: Slot,
}

impl PlacementTarget {
    pub const fn new(cell: CellCoord, slot: Slot) -> Self {
        Self { cell, slot }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.slot {
            Slot::Edge(direction) => Some(direction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Treat every live same-category occupant as blocking.
    pub ignore_replacement: bool,
    /// An object is being moved: no replacement, no area policies.
    pub move_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPlacement {
    pub targets: Vec<PlacementTarget>,
    /// Live occupants to destroy before placing, in discovery order.
    pub replaced: Vec<ObjectId>,
}

/// `slot` at `cell` plus every in-bounds slot that mirrors it.
///
/// Edge slots are shared with the neighbor across the edge, corner slots with
/// the three cells touching the corner. Base and free slots are not shared.
pub fn shared_slots(grid: &GridSpace, cell: CellCoord, slot: Slot) -> Vec<(CellCoord, Slot)> {
    let mut slots = vec![(cell, slot)];
    match slot {
        Slot::Edge(direction) => {
            let (neighbor, seen) = edge_neighbor(cell, direction);
            if grid.in_bounds(neighbor) {
                slots.push((neighbor, Slot::Edge(seen)));
            }
        }
        Slot::Corner(corner) => {
            for (neighbor, seen) in shared_corner_cells(cell, corner) {
                if grid.in_bounds(neighbor) {
                    slots.push((neighbor, Slot::Corner(seen)));
                }
            }
        }
        Slot::Base | Slot::Free => {}
    }
    slots
}

pub struct PlacementValidator<'a> {
    grid: &'a GridSpace,
    objects: &'a ObjectStore,
    policies: &'a AreaPolicies,
    destroyer_available: bool,
}

impl<'a> PlacementValidator<'a> {
    pub fn new(
        grid: &'a GridSpace,
        objects: &'a ObjectStore,
        policies: &'a AreaPolicies,
        destroyer_available: bool,
    ) -> Self {
        Self {
            grid,
            objects,
            policies,
            destroyer_available,
        }
    }

    fn can_replace(&self, occupant: ObjectId, options: ValidationOptions) -> bool {
        !options.ignore_replacement
            && !options.move_mode
            && self.destroyer_available
            && self
                .objects
                .get(occupant)
                .is_some_and(|o| o.descriptor.replaceable)
    }

    pub fn validate(
        &self,
        targets: &[PlacementTarget],
        descriptor: &ObjectDescriptor,
        options: ValidationOptions,
    ) -> Result<ValidatedPlacement, PlacementError> {
        if let Some(target) = targets.iter().find(|t| !self.grid.in_bounds(t.cell)) {
            return Err(PlacementError::OutOfBounds { cell: target.cell });
        }

        let layer = self.grid.layer();
        let mut replaced: Vec<ObjectId> = Vec::new();
        let mut occupied: Option<PlacementError> = None;
        let mut blocked: Option<PlacementError> = None;

        for target in targets {
            let mut buildable = true;

            if target.slot != Slot::Free {
                for (cell, slot) in shared_slots(self.grid, target.cell, target.slot) {
                    let record = self.grid.get_cell(cell);
                    let Some(occupant) = record.occupant(slot, &descriptor.category) else {
                        continue;
                    };
                    if !self.objects.is_alive(occupant) {
                        continue;
                    }
                    if self.can_replace(occupant, options) {
                        if !replaced.contains(&occupant) {
                            replaced.push(occupant);
                        }
                    } else {
                        buildable = false;
                        occupied.get_or_insert(PlacementError::Occupied {
                            cell: target.cell,
                            occupant,
                        });
                    }
                }
            }

            if !buildable || options.move_mode {
                continue;
            }

            let direction = target.direction();
            if self
                .policies
                .enables(descriptor, layer, target.cell, direction)
            {
                continue;
            }
            if self
                .policies
                .disables(descriptor, layer, target.cell, direction)
            {
                blocked.get_or_insert(PlacementError::BlockedByAreaPolicy { cell: target.cell });
            }
        }

        if let Some(err) = occupied.or(blocked) {
            return Err(err);
        }
        Ok(ValidatedPlacement {
            targets: targets.to_vec(),
            replaced,
        })
    }
}
