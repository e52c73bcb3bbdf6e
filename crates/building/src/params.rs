//! Data-driven placement parameters.
//!
//! Grid dimensions, pacing and history limits live in a single
//! [`PlacementParams`] resource instead of module constants so a host can load
//! them from JSON before adding the [`crate::PlacementPlugin`]. Missing fields
//! fall back to the defaults in [`crate::config`].

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CELL_SIZE, DEFAULT_GRID_LENGTH, DEFAULT_GRID_WIDTH,
    DEFAULT_LAYER_COUNT, DEFAULT_LAYER_HEIGHT, DEFAULT_PLACEMENT_INTERVAL, DEFAULT_SEED,
    MAX_HISTORY,
};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct PlacementParams {
    /// Cells along the X axis.
    pub width: u32,
    /// Cells along the Z axis.
    pub length: u32,
    pub cell_size: f32,
    pub layer_count: u32,
    pub layer_height: f32,
    /// World position of the south-west corner of cell (0, 0) on layer 0.
    pub origin: [f32; 3],
    /// Seconds between two batches of a drag sequence. Zero places everything at once.
    pub placement_interval: f32,
    /// Targets placed per drag batch.
    pub batch_size: u32,
    pub max_history: u32,
    pub seed: u64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            length: DEFAULT_GRID_LENGTH,
            cell_size: DEFAULT_CELL_SIZE,
            layer_count: DEFAULT_LAYER_COUNT,
            layer_height: DEFAULT_LAYER_HEIGHT,
            origin: [0.0; 3],
            placement_interval: DEFAULT_PLACEMENT_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            max_history: MAX_HISTORY as u32,
            seed: DEFAULT_SEED,
        }
    }
}

impl PlacementParams {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(text).map(Self::sanitized)
    }

    /// Parse JSON, logging a warning and returning defaults on failure.
    pub fn from_json_or_default(text: &str) -> Self {
        match Self::from_json(text) {
            Ok(params) => params,
            Err(e) => {
                warn!(
                    "PlacementParams: failed to parse {} bytes of JSON, falling back to defaults: {}",
                    text.len(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    /// Clamp values that would make the grid unusable.
    pub fn sanitized(mut self) -> Self {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            self.cell_size = DEFAULT_CELL_SIZE;
        }
        if !(self.layer_height.is_finite() && self.layer_height > 0.0) {
            self.layer_height = DEFAULT_LAYER_HEIGHT;
        }
        if !self.placement_interval.is_finite() {
            self.placement_interval = DEFAULT_PLACEMENT_INTERVAL;
        }
        self.placement_interval = self.placement_interval.max(0.0);
        self.layer_count = self.layer_count.max(1);
        self.batch_size = self.batch_size.max(1);
        self.max_history = self.max_history.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let params = PlacementParams::from_json(r#"{ "width": 10, "length": 12 }"#).unwrap();
        assert_eq!(params.width, 10);
        assert_eq!(params.length, 12);
        assert_eq!(params.cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(params.max_history, MAX_HISTORY as u32);
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let params = PlacementParams::from_json_or_default("{ not json");
        assert_eq!(params, PlacementParams::default());
    }

    #[test]
    fn sanitize_rejects_degenerate_values() {
        let params = PlacementParams {
            cell_size: 0.0,
            layer_count: 0,
            batch_size: 0,
            placement_interval: -3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(params.layer_count, 1);
        assert_eq!(params.batch_size, 1);
        assert_eq!(params.placement_interval, 0.0);
    }

    #[test]
    fn bitcode_roundtrip() {
        let params = PlacementParams {
            width: 7,
            seed: 9,
            ..Default::default()
        };
        let bytes = bitcode::encode(&params);
        let decoded: PlacementParams = bitcode::decode(&bytes).unwrap();
        assert_eq!(decoded, params);
    }
}
