//! Read-only views of grid occupancy for external consumers.
//!
//! [`GridSnapshot`] is the hand-off point for persistence: it is serde
//! serializable and encodes compactly with bitcode.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::cell::CellRecord;
use crate::coords::CellCoord;
use crate::rng::RngSnapshot;

/// One cell as seen through [`crate::BuildingGrid::cell_occupancy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    pub layer: usize,
    pub cell: CellCoord,
    pub in_bounds: bool,
    pub record: CellRecord,
}

impl OccupancySnapshot {
    pub fn is_empty(&self) -> bool {
        self.record.is_unoccupied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct LayerSnapshot {
    pub layer: u32,
    /// Stored records, sorted by coordinate.
    pub cells: Vec<(CellCoord, CellRecord)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct GridSnapshot {
    pub width: u32,
    pub length: u32,
    pub layers: Vec<LayerSnapshot>,
    #[serde(skip)]
    pub rng: Option<RngSnapshot>,
}

impl GridSnapshot {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        bitcode::decode(bytes)
    }

    pub fn cell(&self, layer: usize, cell: CellCoord) -> Option<&CellRecord> {
        self.layers
            .iter()
            .find(|l| l.layer as usize == layer)?
            .cells
            .iter()
            .find(|(coord, _)| *coord == cell)
            .map(|(_, record)| record)
    }
}
