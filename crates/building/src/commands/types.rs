//! Reversible placement and removal commands.

use crate::cell::{CellRecord, SlotAddress};
use crate::coords::CellCoord;
use crate::grid::GridLayers;
use crate::objects::{ObjectId, ObjectStore, PlacedObject, Topology};
use crate::policy::Destroyer;

/// Everything a command may mutate.
pub struct CommandContext<'a> {
    pub layers: &'a mut GridLayers,
    pub objects: &'a mut ObjectStore,
    pub destroyer: &'a mut Option<Box<dyn Destroyer>>,
}

/// A cell record as it was before a command touched it.
#[derive(Debug, Clone, PartialEq)]
struct PriorCell {
    layer: usize,
    cell: CellCoord,
    record: CellRecord,
}

fn capture(layers: &GridLayers, cells: &[(usize, CellCoord)]) -> Vec<PriorCell> {
    cells
        .iter()
        .map(|&(layer, cell)| PriorCell {
            layer,
            cell,
            record: layers.get_cell(layer, cell),
        })
        .collect()
}

/// Put back the captured slot contents. Modifiers written since the capture
/// are not occupancy and stay as they are.
fn restore(layers: &mut GridLayers, prior: &[PriorCell]) {
    for entry in prior {
        let current = layers.get_cell(entry.layer, entry.cell);
        let mut record = entry.record.clone();
        record.modifiers = current.modifiers;
        layers.set_cell(entry.layer, entry.cell, record);
    }
}

fn push_cells(cells: &mut Vec<(usize, CellCoord)>, footprint: &[SlotAddress]) {
    for addr in footprint {
        let key = (addr.layer, addr.cell);
        if !cells.contains(&key) {
            cells.push(key);
        }
    }
}

/// Detach every slot reference of `object`, notify the destroyer and mark it dead.
fn destroy(ctx: &mut CommandContext, object: &PlacedObject, bypass_validation: bool, silent: bool) {
    if let Some(destroyer) = ctx.destroyer.as_mut() {
        destroyer.destroy(object, bypass_validation, silent);
    }
    for addr in &object.footprint {
        let mut record = ctx.layers.get_cell(addr.layer, addr.cell);
        if record.detach(addr.slot, object.id) {
            ctx.layers.set_cell(addr.layer, addr.cell, record);
        }
    }
    ctx.objects.set_alive(object.id, false);
}

/// Places one object, destroying the occupants it replaces.
#[derive(Debug, Clone)]
pub struct PlaceObject {
    /// The object to create. Its `id` is assigned on first apply and reused
    /// on redo.
    pub object: PlacedObject,
    pub replaced: Vec<ObjectId>,
    /// Suppress destroyer messages (move mode).
    pub silent: bool,
    created: Option<ObjectId>,
    prior: Vec<PriorCell>,
}

impl PlaceObject {
    pub fn new(object: PlacedObject, replaced: Vec<ObjectId>, silent: bool) -> Self {
        Self {
            object,
            replaced,
            silent,
            created: None,
            prior: Vec::new(),
        }
    }

    pub fn created(&self) -> Option<ObjectId> {
        self.created
    }

    fn apply(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        let victims: Vec<PlacedObject> = self
            .replaced
            .iter()
            .filter_map(|id| ctx.objects.get(*id))
            .filter(|o| o.alive)
            .cloned()
            .collect();

        let mut touched = Vec::new();
        push_cells(&mut touched, &self.object.footprint);
        for victim in &victims {
            push_cells(&mut touched, &victim.footprint);
        }
        self.prior = capture(ctx.layers, &touched);

        for victim in &victims {
            destroy(ctx, victim, true, self.silent);
        }

        let id = match self.created {
            Some(id) => id,
            None => ctx.objects.allocate_id(),
        };
        let mut object = self.object.clone();
        object.id = id;
        object.alive = true;
        for addr in &object.footprint {
            let mut record = ctx.layers.get_cell(addr.layer, addr.cell);
            record.attach(addr.slot, &object.descriptor.category, id);
            ctx.layers.set_cell(addr.layer, addr.cell, record);
        }
        ctx.objects.insert(object);
        self.created = Some(id);
        Some(id)
    }

    fn revert(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        restore(ctx.layers, &self.prior);
        let id = self.created?;
        ctx.objects.set_alive(id, false);
        for replaced in &self.replaced {
            ctx.objects.set_alive(*replaced, true);
        }
        Some(id)
    }
}

/// Removes a live object from the grid.
#[derive(Debug, Clone)]
pub struct RemoveObject {
    pub id: ObjectId,
    pub silent: bool,
    prior: Vec<PriorCell>,
}

impl RemoveObject {
    pub fn new(id: ObjectId, silent: bool) -> Self {
        Self {
            id,
            silent,
            prior: Vec::new(),
        }
    }

    fn apply(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        let object = ctx.objects.get(self.id).filter(|o| o.alive).cloned()?;
        let mut touched = Vec::new();
        push_cells(&mut touched, &object.footprint);
        self.prior = capture(ctx.layers, &touched);
        destroy(ctx, &object, false, self.silent);
        Some(self.id)
    }

    fn revert(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        restore(ctx.layers, &self.prior);
        ctx.objects.set_alive(self.id, true);
        Some(self.id)
    }
}

/// A single undoable grid edit.
#[derive(Debug, Clone)]
pub enum PlacementCommand {
    /// A cell-filling object was placed on base slots.
    Filling(PlaceObject),
    /// An edge-aligned object was placed, mirrored across the edge.
    Edge(PlaceObject),
    /// A corner-aligned object was placed, mirrored into the sharing cells.
    Corner(PlaceObject),
    /// A free object was placed at a world position.
    Free(PlaceObject),
    /// A placed object was removed.
    Remove(RemoveObject),
}

impl PlacementCommand {
    /// Wrap a placement in the variant matching its topology.
    pub fn place(object: PlacedObject, replaced: Vec<ObjectId>, silent: bool) -> Self {
        let topology = object.topology;
        let place = PlaceObject::new(object, replaced, silent);
        match topology {
            Topology::Filling => PlacementCommand::Filling(place),
            Topology::Edge => PlacementCommand::Edge(place),
            Topology::Corner => PlacementCommand::Corner(place),
            Topology::Free => PlacementCommand::Free(place),
        }
    }

    pub fn remove(id: ObjectId, silent: bool) -> Self {
        PlacementCommand::Remove(RemoveObject::new(id, silent))
    }

    /// Run the command. Returns the object it produced (or removed), `None`
    /// when it had no effect.
    pub fn apply(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        match self {
            PlacementCommand::Filling(cmd)
            | PlacementCommand::Edge(cmd)
            | PlacementCommand::Corner(cmd)
            | PlacementCommand::Free(cmd) => cmd.apply(ctx),
            PlacementCommand::Remove(cmd) => cmd.apply(ctx),
        }
    }

    /// Undo the last [`PlacementCommand::apply`] from the captured records.
    pub fn revert(&mut self, ctx: &mut CommandContext) -> Option<ObjectId> {
        match self {
            PlacementCommand::Filling(cmd)
            | PlacementCommand::Edge(cmd)
            | PlacementCommand::Corner(cmd)
            | PlacementCommand::Free(cmd) => cmd.revert(ctx),
            PlacementCommand::Remove(cmd) => cmd.revert(ctx),
        }
    }

    /// The object this command creates or removes, once known.
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            PlacementCommand::Filling(cmd)
            | PlacementCommand::Edge(cmd)
            | PlacementCommand::Corner(cmd)
            | PlacementCommand::Free(cmd) => cmd.created(),
            PlacementCommand::Remove(cmd) => Some(cmd.id),
        }
    }
}
