//! Grid layers and the sparse per-layer cell store.
//!
//! Records follow copy-in/copy-out semantics: [`GridSpace::get_cell`] returns
//! a clone and [`GridSpace::set_cell`] replaces the stored value. No `&mut`
//! to a stored [`CellRecord`] ever leaves this module, so a stale copy held by
//! an outer read-modify-write cannot alias slots written by a nested one.

use std::collections::HashMap;

use bevy::math::Vec3;

use crate::cell::CellRecord;
use crate::coords::CellCoord;
use crate::params::PlacementParams;

/// Floor `v` toward negative infinity. A value on a cell boundary belongs
/// to the cell that starts there.
#[inline]
fn floor_to_cell(v: f32) -> i32 {
    v.floor() as i32
}

/// One horizontal layer of the building surface.
#[derive(Debug, Clone)]
pub struct GridSpace {
    layer: usize,
    width: u32,
    length: u32,
    cell_size: f32,
    origin: Vec3,
    layer_height: f32,
    cells: HashMap<CellCoord, CellRecord>,
}

impl GridSpace {
    pub fn new(
        layer: usize,
        width: u32,
        length: u32,
        cell_size: f32,
        origin: Vec3,
        layer_height: f32,
    ) -> Self {
        Self {
            layer,
            width,
            length,
            cell_size,
            origin,
            layer_height,
            cells: HashMap::new(),
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World height of this layer's surface.
    pub fn elevation(&self) -> f32 {
        self.origin.y + self.layer as f32 * self.layer_height
    }

    #[inline]
    pub fn in_bounds(&self, coord: CellCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.width
            && (coord.z as u32) < self.length
    }

    /// Cell containing `world` in the grid plane. The height is ignored.
    pub fn world_to_cell(&self, world: Vec3) -> CellCoord {
        let local = world - self.origin;
        CellCoord::new(
            floor_to_cell(local.x / self.cell_size),
            floor_to_cell(local.z / self.cell_size),
        )
    }

    /// World position of the south-west corner of `coord` on this layer.
    pub fn cell_to_world(&self, coord: CellCoord) -> Vec3 {
        Vec3::new(
            self.origin.x + coord.x as f32 * self.cell_size,
            self.elevation(),
            self.origin.z + coord.z as f32 * self.cell_size,
        )
    }

    pub fn cell_center(&self, coord: CellCoord) -> Vec3 {
        let half = self.cell_size * 0.5;
        self.cell_to_world(coord) + Vec3::new(half, 0.0, half)
    }

    /// A copy of the record at `coord`; the default record when none is stored.
    pub fn get_cell(&self, coord: CellCoord) -> CellRecord {
        self.cells.get(&coord).cloned().unwrap_or_default()
    }

    pub fn set_cell(&mut self, coord: CellCoord, record: CellRecord) {
        self.cells.insert(coord, record);
    }

    /// Change the bounds. Records outside the new bounds are kept but no
    /// longer reachable through bounds-respecting queries.
    pub fn set_size(&mut self, width: u32, length: u32) {
        self.width = width;
        self.length = length;
    }

    pub fn modifier(&self, coord: CellCoord, key: &str) -> f32 {
        self.cells
            .get(&coord)
            .map(|record| record.modifier(key))
            .unwrap_or(0.0)
    }

    pub fn set_modifier(&mut self, coord: CellCoord, key: &str, value: f32) {
        let mut record = self.get_cell(coord);
        record.set_modifier(key, value);
        self.set_cell(coord, record);
    }

    /// Coordinates with a stored record, sorted.
    pub fn stored_cells(&self) -> Vec<CellCoord> {
        let mut coords: Vec<CellCoord> = self.cells.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// In-bounds coordinates whose record holds at least one object reference.
    pub fn occupied_cells(&self) -> Vec<CellCoord> {
        let mut coords: Vec<CellCoord> = self
            .cells
            .iter()
            .filter(|(coord, record)| self.in_bounds(**coord) && !record.is_unoccupied())
            .map(|(coord, _)| *coord)
            .collect();
        coords.sort_unstable();
        coords
    }
}

/// All layers of the building surface. Layers share width, length and cell size.
/// Always holds at least one layer.
#[derive(Debug, Clone)]
pub struct GridLayers {
    layers: Vec<GridSpace>,
    layer_height: f32,
    origin: Vec3,
}

impl GridLayers {
    pub fn new(params: &PlacementParams) -> Self {
        let params = params.clone().sanitized();
        let origin = params.origin();
        let layers = (0..params.layer_count as usize)
            .map(|layer| {
                GridSpace::new(
                    layer,
                    params.width,
                    params.length,
                    params.cell_size,
                    origin,
                    params.layer_height,
                )
            })
            .collect();
        Self {
            layers,
            layer_height: params.layer_height,
            origin,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, layer: usize) -> Option<&GridSpace> {
        self.layers.get(layer)
    }

    pub fn layer_mut(&mut self, layer: usize) -> Option<&mut GridSpace> {
        self.layers.get_mut(layer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridSpace> {
        self.layers.iter()
    }

    pub fn in_bounds(&self, layer: usize, coord: CellCoord) -> bool {
        self.layer(layer).is_some_and(|g| g.in_bounds(coord))
    }

    /// A copy of the record; the default record for unknown layers.
    pub fn get_cell(&self, layer: usize, coord: CellCoord) -> CellRecord {
        self.layer(layer)
            .map(|g| g.get_cell(coord))
            .unwrap_or_default()
    }

    /// Returns `false` when the layer does not exist.
    pub fn set_cell(&mut self, layer: usize, coord: CellCoord, record: CellRecord) -> bool {
        match self.layer_mut(layer) {
            Some(grid) => {
                grid.set_cell(coord, record);
                true
            }
            None => false,
        }
    }

    pub fn set_size(&mut self, width: u32, length: u32) {
        for grid in &mut self.layers {
            grid.set_size(width, length);
        }
    }

    /// Layer whose surface is the highest one at or below `height`,
    /// clamped to the first and last layers.
    pub fn layer_for_height(&self, height: f32) -> usize {
        let relative = (height - self.origin.y) / self.layer_height;
        let index = floor_to_cell(relative).max(0) as usize;
        index.min(self.layers.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Slot;
    use crate::objects::{Category, ObjectId};

    fn grid() -> GridSpace {
        GridSpace::new(0, 8, 6, 2.0, Vec3::new(10.0, 0.0, -4.0), 3.0)
    }

    #[test]
    fn coord_roundtrip() {
        let grid = grid();
        for x in [-3, 0, 1, 7, 12] {
            for z in [-2, 0, 5, 9] {
                let coord = CellCoord::new(x, z);
                assert_eq!(grid.world_to_cell(grid.cell_to_world(coord)), coord);
                assert_eq!(grid.world_to_cell(grid.cell_center(coord)), coord);
            }
        }
    }

    #[test]
    fn world_to_cell_floors_toward_negative_infinity() {
        let grid = GridSpace::new(0, 4, 4, 1.0, Vec3::ZERO, 1.0);
        assert_eq!(grid.world_to_cell(Vec3::new(-0.5, 0.0, 0.5)), CellCoord::new(-1, 0));
        assert_eq!(grid.world_to_cell(Vec3::new(0.999, 0.0, 1.0)), CellCoord::new(0, 1));
        assert_eq!(grid.world_to_cell(Vec3::new(-1.0, 0.0, -1.001)), CellCoord::new(-1, -2));
        // Just short of a boundary is still the lower cell.
        assert_eq!(grid.world_to_cell(Vec3::new(0.99995, 0.0, 2.99995)), CellCoord::new(0, 2));
        assert_eq!(grid.world_to_cell(Vec3::new(-0.00005, 0.0, 0.0)), CellCoord::new(-1, 0));
    }

    #[test]
    fn bounds_are_half_open() {
        let grid = grid();
        assert!(grid.in_bounds(CellCoord::new(0, 0)));
        assert!(grid.in_bounds(CellCoord::new(7, 5)));
        assert!(!grid.in_bounds(CellCoord::new(8, 0)));
        assert!(!grid.in_bounds(CellCoord::new(0, 6)));
        assert!(!grid.in_bounds(CellCoord::new(-1, 0)));
    }

    #[test]
    fn get_cell_returns_copies() {
        let mut grid = grid();
        let coord = CellCoord::new(1, 1);
        let mut copy = grid.get_cell(coord);
        copy.attach(Slot::Base, &Category::new("wall"), ObjectId(1));
        assert!(grid.get_cell(coord).is_unoccupied());
        grid.set_cell(coord, copy.clone());
        assert_eq!(grid.get_cell(coord), copy);
    }

    #[test]
    fn shrinking_retains_records_outside_bounds() {
        let mut grid = grid();
        let coord = CellCoord::new(7, 5);
        let mut record = grid.get_cell(coord);
        record.attach(Slot::Base, &Category::new("wall"), ObjectId(9));
        grid.set_cell(coord, record);
        grid.set_size(4, 4);
        assert!(!grid.in_bounds(coord));
        assert!(grid.occupied_cells().is_empty());
        grid.set_size(8, 6);
        assert_eq!(grid.occupied_cells(), vec![coord]);
    }

    #[test]
    fn modifiers_default_to_zero() {
        let mut grid = grid();
        let coord = CellCoord::new(2, 3);
        assert_eq!(grid.modifier(coord, "fertility"), 0.0);
        grid.set_modifier(coord, "fertility", 0.75);
        assert_eq!(grid.modifier(coord, "fertility"), 0.75);
        assert!(grid.get_cell(coord).is_unoccupied());
    }

    #[test]
    fn layers_stack_vertically() {
        let params = PlacementParams {
            layer_count: 3,
            layer_height: 4.0,
            ..Default::default()
        };
        let layers = GridLayers::new(&params);
        assert_eq!(layers.layer_count(), 3);
        assert_eq!(layers.layer_for_height(-2.0), 0);
        assert_eq!(layers.layer_for_height(0.0), 0);
        assert_eq!(layers.layer_for_height(4.0), 1);
        assert_eq!(layers.layer_for_height(7.9), 1);
        assert_eq!(layers.layer_for_height(3.9999), 0);
        assert_eq!(layers.layer_for_height(100.0), 2);
        let top = layers.layer(2).unwrap();
        assert_eq!(top.cell_to_world(CellCoord::new(0, 0)).y, 8.0);
    }

    #[test]
    fn unknown_layer_reads_default_and_rejects_writes() {
        let mut layers = GridLayers::new(&PlacementParams::default());
        let coord = CellCoord::new(0, 0);
        assert!(!layers.in_bounds(9, coord));
        assert!(layers.get_cell(9, coord).is_unoccupied());
        assert!(!layers.set_cell(9, coord, CellRecord::default()));
    }
}
