//! Layered per-cell occupancy record.
//!
//! A [`CellRecord`] is a plain value: the grid hands out clones and takes
//! records back wholesale (see [`crate::grid::GridSpace::get_cell`]). Every
//! slot map keys objects by [`Category`], so a cell holds at most one object
//! per category in each slot.

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::coords::{CellCoord, Corner, Direction};
use crate::objects::{Category, ObjectId};

pub type SlotMap = BTreeMap<Category, ObjectId>;

/// Which part of a cell an object attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    Base,
    Edge(Direction),
    Corner(Corner),
    Free,
}

/// A slot on a specific cell of a specific layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotAddress {
    pub layer: usize,
    pub cell: CellCoord,
    pub slot: Slot,
}

impl SlotAddress {
    pub const fn new(layer: usize, cell: CellCoord, slot: Slot) -> Self {
        Self { layer, cell, slot }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct CellRecord {
    /// Cell-filling objects.
    pub base: SlotMap,
    /// Edge-aligned objects, indexed by [`Direction::index`].
    pub edges: [SlotMap; 4],
    /// Corner-aligned objects, indexed by [`Corner::index`].
    pub corners: [SlotMap; 4],
    /// Free-floating objects whose position falls inside this cell.
    pub free: Vec<ObjectId>,
    /// Named numeric tags attached to the cell.
    pub modifiers: BTreeMap<String, f32>,
}

impl CellRecord {
    /// Slot map for `slot`, or `None` for the free list.
    pub fn slot_map(&self, slot: Slot) -> Option<&SlotMap> {
        match slot {
            Slot::Base => Some(&self.base),
            Slot::Edge(dir) => Some(&self.edges[dir.index()]),
            Slot::Corner(corner) => Some(&self.corners[corner.index()]),
            Slot::Free => None,
        }
    }

    fn slot_map_mut(&mut self, slot: Slot) -> Option<&mut SlotMap> {
        match slot {
            Slot::Base => Some(&mut self.base),
            Slot::Edge(dir) => Some(&mut self.edges[dir.index()]),
            Slot::Corner(corner) => Some(&mut self.corners[corner.index()]),
            Slot::Free => None,
        }
    }

    /// The object of `category` held in `slot`, if any. Liveness is not checked.
    pub fn occupant(&self, slot: Slot, category: &Category) -> Option<ObjectId> {
        self.slot_map(slot)
            .and_then(|map| map.get(category))
            .copied()
    }

    /// Attach `id` to `slot`. Returns the reference it displaced, if any.
    ///
    /// Callers must have destroyed (or validated the absence of) a live
    /// occupant beforehand; this only maintains the map.
    pub fn attach(&mut self, slot: Slot, category: &Category, id: ObjectId) -> Option<ObjectId> {
        match self.slot_map_mut(slot) {
            Some(map) => map.insert(category.clone(), id),
            None => {
                if !self.free.contains(&id) {
                    self.free.push(id);
                }
                None
            }
        }
    }

    /// Remove every reference to `id` from `slot`. Returns `true` if one was found.
    pub fn detach(&mut self, slot: Slot, id: ObjectId) -> bool {
        match self.slot_map_mut(slot) {
            Some(map) => {
                let before = map.len();
                map.retain(|_, v| *v != id);
                map.len() != before
            }
            None => {
                let before = self.free.len();
                self.free.retain(|v| *v != id);
                self.free.len() != before
            }
        }
    }

    /// All object references held by this cell, in slot order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.base
            .values()
            .chain(self.edges.iter().flat_map(|m| m.values()))
            .chain(self.corners.iter().flat_map(|m| m.values()))
            .chain(self.free.iter())
            .copied()
    }

    /// `true` when no slot holds a reference. Modifiers are ignored.
    pub fn is_unoccupied(&self) -> bool {
        self.objects().next().is_none()
    }

    /// Modifier value, `0.0` when the key is absent.
    pub fn modifier(&self, key: &str) -> f32 {
        self.modifiers.get(key).copied().unwrap_or(0.0)
    }

    pub fn set_modifier(&mut self, key: impl Into<String>, value: f32) {
        self.modifiers.insert(key.into(), value);
    }
}
