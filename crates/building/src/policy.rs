//! Collaborator seams: area policies, the destroyer and the mover.
//!
//! The placement core never decides on its own whether a region is allowed
//! or forbidden; it asks up to four [`AreaPolicy`] providers. Destruction of
//! replaced or removed objects is reported to a [`Destroyer`] so hosts can
//! tear down visuals and refund costs.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coords::{CellCoord, Direction};
use crate::objects::{Category, ObjectDescriptor, ObjectId, PlacedObject};

/// Answers whether a policy applies to an object at a cell.
pub trait AreaPolicy: Send + Sync {
    fn query(
        &self,
        descriptor: &ObjectDescriptor,
        layer: usize,
        cell: CellCoord,
        direction: Option<Direction>,
    ) -> bool;
}

/// Applies everywhere while active. An empty category list matches every
/// category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalAreaPolicy {
    pub active: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl GlobalAreaPolicy {
    pub fn active() -> Self {
        Self {
            active: true,
            categories: Vec::new(),
        }
    }

    pub fn for_categories(categories: Vec<Category>) -> Self {
        Self {
            active: true,
            categories,
        }
    }
}

impl AreaPolicy for GlobalAreaPolicy {
    fn query(
        &self,
        descriptor: &ObjectDescriptor,
        _layer: usize,
        _cell: CellCoord,
        _direction: Option<Direction>,
    ) -> bool {
        self.active
            && (self.categories.is_empty() || self.categories.contains(&descriptor.category))
    }
}

/// Inclusive rectangle of cells on one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRegion {
    pub layer: usize,
    pub min: CellCoord,
    pub max: CellCoord,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl AreaRegion {
    pub fn new(layer: usize, a: CellCoord, b: CellCoord) -> Self {
        Self {
            layer,
            min: CellCoord::new(a.x.min(b.x), a.z.min(b.z)),
            max: CellCoord::new(a.x.max(b.x), a.z.max(b.z)),
            categories: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn contains(&self, layer: usize, cell: CellCoord) -> bool {
        layer == self.layer
            && (self.min.x..=self.max.x).contains(&cell.x)
            && (self.min.z..=self.max.z).contains(&cell.z)
    }
}

/// Applies inside any of its regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionAreaPolicy {
    pub regions: Vec<AreaRegion>,
}

impl RegionAreaPolicy {
    pub fn new(regions: Vec<AreaRegion>) -> Self {
        Self { regions }
    }
}

impl AreaPolicy for RegionAreaPolicy {
    fn query(
        &self,
        descriptor: &ObjectDescriptor,
        layer: usize,
        cell: CellCoord,
        _direction: Option<Direction>,
    ) -> bool {
        self.regions.iter().any(|region| {
            region.contains(layer, cell)
                && (region.categories.is_empty()
                    || region.categories.contains(&descriptor.category))
        })
    }
}

/// The four optional policy providers consulted by the validator.
#[derive(Default)]
pub struct AreaPolicies {
    pub basic_enabler: Option<Box<dyn AreaPolicy>>,
    pub scoped_enabler: Option<Box<dyn AreaPolicy>>,
    pub basic_disabler: Option<Box<dyn AreaPolicy>>,
    pub scoped_disabler: Option<Box<dyn AreaPolicy>>,
}

fn consult(
    provider: &Option<Box<dyn AreaPolicy>>,
    responds: bool,
    descriptor: &ObjectDescriptor,
    layer: usize,
    cell: CellCoord,
    direction: Option<Direction>,
) -> bool {
    responds
        && provider
            .as_ref()
            .is_some_and(|p| p.query(descriptor, layer, cell, direction))
}

impl AreaPolicies {
    /// `true` when a provider the object responds to forces the cell buildable.
    pub fn enables(
        &self,
        descriptor: &ObjectDescriptor,
        layer: usize,
        cell: CellCoord,
        direction: Option<Direction>,
    ) -> bool {
        let flags = descriptor.area_policies;
        consult(
            &self.basic_enabler,
            flags.basic_enabler,
            descriptor,
            layer,
            cell,
            direction,
        ) || consult(
            &self.scoped_enabler,
            flags.scoped_enabler,
            descriptor,
            layer,
            cell,
            direction,
        )
    }

    /// `true` when a provider the object responds to blocks the cell.
    pub fn disables(
        &self,
        descriptor: &ObjectDescriptor,
        layer: usize,
        cell: CellCoord,
        direction: Option<Direction>,
    ) -> bool {
        let flags = descriptor.area_policies;
        consult(
            &self.basic_disabler,
            flags.basic_disabler,
            descriptor,
            layer,
            cell,
            direction,
        ) || consult(
            &self.scoped_disabler,
            flags.scoped_disabler,
            descriptor,
            layer,
            cell,
            direction,
        )
    }
}

/// Notified whenever the core removes an object from the grid.
pub trait Destroyer: Send + Sync {
    fn destroy(&mut self, object: &PlacedObject, bypass_validation: bool, bypass_messages: bool);
}

/// Default destroyer: remembers what it was asked to destroy.
#[derive(Debug, Clone, Default)]
pub struct LoggingDestroyer {
    pub destroyed: Vec<ObjectId>,
}

impl Destroyer for LoggingDestroyer {
    fn destroy(&mut self, object: &PlacedObject, _bypass_validation: bool, bypass_messages: bool) {
        if !bypass_messages {
            debug!(
                "Destroyed {} ({:?}) at layer {} {:?}",
                object.descriptor.name, object.id, object.layer, object.origin
            );
        }
        self.destroyed.push(object.id);
    }
}

/// Reports whether an existing object is currently being moved.
pub trait Mover: Send + Sync {
    fn is_moving(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveState {
    pub moving: Option<ObjectId>,
}

impl Mover for MoveState {
    fn is_moving(&self) -> bool {
        self.moving.is_some()
    }
}
