//! Grid building placement core.
//!
//! A layered occupancy model for structures that attach to a cell, an edge
//! between cells, a cell corner, or float freely; shape expansion for drag
//! gestures; multi-stage placement validation; and an undoable command
//! history. [`BuildingGrid`] is the entry point for direct use and
//! [`PlacementPlugin`] wires it into a Bevy app.

pub mod building_grid;
pub mod cell;
pub mod commands;
pub mod config;
pub mod coords;
pub mod corner;
pub mod events;
pub mod grid;
pub mod objects;
pub mod params;
pub mod plugin;
pub mod policy;
pub mod prefab;
pub mod result_log;
pub mod results;
pub mod rng;
pub mod sequence;
pub mod shape;
pub mod snapshot;
pub mod validator;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use building_grid::{BuildingGrid, PlacementRequest, TargetSpec};
pub use cell::{CellRecord, Slot, SlotAddress};
pub use coords::{CellCoord, Corner, Direction};
pub use events::{
    DragCancelled, DragRequested, GridMode, GridModeChanged, PlacementFailed,
    PlacementRequested, PlacementSucceeded, RedoRequested, RemoveRequested, UndoRequested,
};
pub use objects::{Category, ObjectDescriptor, ObjectId, PrefabVariant, Topology};
pub use params::PlacementParams;
pub use plugin::{ActiveDrags, PlacementPlugin};
pub use results::{PlacementError, PlacementOutcome, PlacementResult};
pub use sequence::{DragRequest, DragTopology, PlacementSequence};
pub use shape::PlacementPattern;
