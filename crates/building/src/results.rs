use serde::{Deserialize, Serialize};

use crate::coords::CellCoord;
use crate::objects::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    Placed(ObjectId),
    /// Accepted without effect: nothing was mutated and nothing was recorded.
    NoOp,
}

impl PlacementOutcome {
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            PlacementOutcome::Placed(id) => Some(*id),
            PlacementOutcome::NoOp => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementError {
    OutOfBounds { cell: CellCoord },
    /// A live object of the same category holds the slot and cannot be replaced.
    Occupied { cell: CellCoord, occupant: ObjectId },
    BlockedByAreaPolicy { cell: CellCoord },
    NoVariantSelectable,
    UnknownLayer(usize),
    ObjectNotFound(ObjectId),
}

impl PlacementError {
    /// Short human-readable reason, for logs and UI toasts.
    pub fn message(&self) -> String {
        match self {
            PlacementError::OutOfBounds { cell } => {
                format!("cell ({}, {}) is outside the grid", cell.x, cell.z)
            }
            PlacementError::Occupied { cell, occupant } => format!(
                "cell ({}, {}) is occupied by object {}",
                cell.x, cell.z, occupant.0
            ),
            PlacementError::BlockedByAreaPolicy { cell } => {
                format!("cell ({}, {}) is blocked by an area policy", cell.x, cell.z)
            }
            PlacementError::NoVariantSelectable => "no prefab variant could be selected".into(),
            PlacementError::UnknownLayer(layer) => format!("layer {layer} does not exist"),
            PlacementError::ObjectNotFound(id) => format!("object {} does not exist", id.0),
        }
    }
}

pub type PlacementResult = Result<PlacementOutcome, PlacementError>;
