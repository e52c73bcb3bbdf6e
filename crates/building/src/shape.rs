//! Shape expansion: turn a drag gesture into an ordered list of targets.
//!
//! Everything here is a pure function of the pattern, the origin and end
//! cells, the endpoints-only flag and an optional clip rectangle. Pacing the
//! resulting list lives in [`crate::sequence`].
//!
//! Ordering:
//! - Box sweeps columns (x ascending) and rows within a column (z ascending).
//! - WireBox lists the top row, the bottom row, then the left and right
//!   columns without their corners.
//! - FourDirectionWire runs from min to max along the dominant axis.
//! - LShaped runs from the origin to the bend, then from the bend to the end.

use serde::{Deserialize, Serialize};

use crate::coords::{Axis, CellCoord, CellRect, Corner, Direction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementPattern {
    #[default]
    Single,
    Paint,
    Box,
    WireBox,
    FourDirectionWire,
    LShaped,
}

impl PlacementPattern {
    /// Patterns driven by an origin and an end cell.
    pub fn is_drag(self) -> bool {
        matches!(
            self,
            PlacementPattern::Box
                | PlacementPattern::WireBox
                | PlacementPattern::FourDirectionWire
                | PlacementPattern::LShaped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeTarget {
    pub cell: CellCoord,
    pub direction: Direction,
    /// The object faces against the canonical facing of its edge.
    pub flipped: bool,
}

impl EdgeTarget {
    pub const fn new(cell: CellCoord, direction: Direction, flipped: bool) -> Self {
        Self {
            cell,
            direction,
            flipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CornerTarget {
    pub cell: CellCoord,
    pub corner: Corner,
}

/// Axis with the larger absolute delta; ties go to X.
pub fn dominant_axis(origin: CellCoord, end: CellCoord) -> Axis {
    let dx = (i64::from(end.x) - i64::from(origin.x)).abs();
    let dz = (i64::from(end.z) - i64::from(origin.z)).abs();
    if dz > dx {
        Axis::Z
    } else {
        Axis::X
    }
}

/// Push `cell` unless it is already present.
fn push_unique(cells: &mut Vec<CellCoord>, cell: CellCoord) {
    if !cells.contains(&cell) {
        cells.push(cell);
    }
}

/// Values from `from` to `to` inclusive, in that direction, kept to `lo..=hi`.
fn run(from: i32, to: i32, lo: i32, hi: i32) -> Vec<i32> {
    let range = from.min(to).max(lo)..=from.max(to).min(hi);
    if from <= to {
        range.collect()
    } else {
        range.rev().collect()
    }
}

/// Cells from `from` to `to` inclusive, stepping one cell at a time.
/// The two coordinates must share an axis.
fn segment(from: CellCoord, to: CellCoord, clip: &CellRect) -> Vec<CellCoord> {
    if from.x == to.x {
        if !clip.contains_x(from.x) {
            return Vec::new();
        }
        run(from.z, to.z, clip.min_z, clip.max_z)
            .into_iter()
            .map(|z| CellCoord::new(from.x, z))
            .collect()
    } else {
        if !clip.contains_z(from.z) {
            return Vec::new();
        }
        run(from.x, to.x, clip.min_x, clip.max_x)
            .into_iter()
            .map(|x| CellCoord::new(x, from.z))
            .collect()
    }
}

fn box_cells(origin: CellCoord, end: CellCoord, clip: &CellRect) -> Vec<CellCoord> {
    let rect = CellRect::spanning(origin, end);
    let xs = run(rect.min_x, rect.max_x, clip.min_x, clip.max_x);
    let zs = run(rect.min_z, rect.max_z, clip.min_z, clip.max_z);
    let mut cells = Vec::with_capacity(xs.len() * zs.len());
    for &x in &xs {
        for &z in &zs {
            cells.push(CellCoord::new(x, z));
        }
    }
    cells
}

fn wire_box_cells(
    origin: CellCoord,
    end: CellCoord,
    endpoints_only: bool,
    clip: &CellRect,
) -> Vec<CellCoord> {
    let rect = CellRect::spanning(origin, end);
    let mut cells = Vec::new();
    if endpoints_only {
        for (cell, _) in rect.corners() {
            push_unique(&mut cells, cell);
        }
        return cells;
    }
    let row = |z: i32| {
        run(rect.min_x, rect.max_x, clip.min_x, clip.max_x)
            .into_iter()
            .map(move |x| CellCoord::new(x, z))
    };
    // Columns without the corner cells.
    let column = |x: i32| {
        run(
            rect.min_z.saturating_add(1),
            rect.max_z.saturating_sub(1),
            clip.min_z,
            clip.max_z,
        )
        .into_iter()
        .map(move |z| CellCoord::new(x, z))
    };
    if clip.contains_z(rect.max_z) {
        cells.extend(row(rect.max_z));
    }
    if rect.min_z != rect.max_z && clip.contains_z(rect.min_z) {
        cells.extend(row(rect.min_z));
    }
    if rect.min_z < rect.max_z {
        if clip.contains_x(rect.min_x) {
            cells.extend(column(rect.min_x));
        }
        if rect.min_x != rect.max_x && clip.contains_x(rect.max_x) {
            cells.extend(column(rect.max_x));
        }
    }
    cells
}

fn wire_cells(
    origin: CellCoord,
    end: CellCoord,
    endpoints_only: bool,
    clip: &CellRect,
) -> Vec<CellCoord> {
    let axis = dominant_axis(origin, end);
    let projected = match axis {
        Axis::X => CellCoord::new(end.x, origin.z),
        Axis::Z => CellCoord::new(origin.x, end.z),
    };
    if endpoints_only {
        let mut cells = vec![origin];
        push_unique(&mut cells, projected);
        return cells;
    }
    let lo = CellCoord::new(origin.x.min(projected.x), origin.z.min(projected.z));
    let hi = CellCoord::new(origin.x.max(projected.x), origin.z.max(projected.z));
    segment(lo, hi, clip)
}

/// Two perpendicular segments meeting at `bend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LShape {
    axis: Axis,
    origin: CellCoord,
    bend: CellCoord,
    end: CellCoord,
}

impl LShape {
    fn new(origin: CellCoord, end: CellCoord) -> Self {
        let axis = dominant_axis(origin, end);
        let bend = match axis {
            Axis::X => CellCoord::new(end.x, origin.z),
            Axis::Z => CellCoord::new(origin.x, end.z),
        };
        Self {
            axis,
            origin,
            bend,
            end,
        }
    }

    fn has_second_segment(&self) -> bool {
        self.bend != self.end
    }

    fn cells(&self, endpoints_only: bool, clip: &CellRect) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        if endpoints_only {
            for cell in [self.origin, self.bend, self.end] {
                push_unique(&mut cells, cell);
            }
            return cells;
        }
        cells.extend(segment(self.origin, self.bend, clip));
        cells.extend(
            segment(self.bend, self.end, clip)
                .into_iter()
                .filter(|cell| *cell != self.bend),
        );
        cells
    }

    /// Edge and flip flag of each segment, chosen so both segments run along
    /// the outer side of the L and meet at the bend's outer corner.
    ///
    /// Indexed by dominant axis and the sweep sign on each axis. The flip
    /// flag of a segment is set when that segment sweeps toward negative
    /// coordinates.
    fn edge_orientation(&self) -> ((Direction, bool), (Direction, bool)) {
        let east = self.end.x >= self.origin.x;
        let north = self.end.z >= self.origin.z;
        match (self.axis, east, north) {
            (Axis::X, true, true) => ((Direction::South, false), (Direction::East, false)),
            (Axis::X, true, false) => ((Direction::North, false), (Direction::East, true)),
            (Axis::X, false, true) => ((Direction::South, true), (Direction::West, false)),
            (Axis::X, false, false) => ((Direction::North, true), (Direction::West, true)),
            (Axis::Z, true, true) => ((Direction::West, false), (Direction::North, false)),
            (Axis::Z, true, false) => ((Direction::West, true), (Direction::South, false)),
            (Axis::Z, false, true) => ((Direction::East, false), (Direction::North, true)),
            (Axis::Z, false, false) => ((Direction::East, true), (Direction::South, true)),
        }
    }

    fn edges(&self, endpoints_only: bool, clip: &CellRect) -> Vec<EdgeTarget> {
        let ((first, first_flip), (second, second_flip)) = self.edge_orientation();
        let mut targets = Vec::new();
        if endpoints_only {
            if self.origin != self.bend {
                targets.push(EdgeTarget::new(self.origin, first, first_flip));
            }
            targets.push(EdgeTarget::new(self.bend, first, first_flip));
            if self.has_second_segment() {
                targets.push(EdgeTarget::new(self.bend, second, second_flip));
                targets.push(EdgeTarget::new(self.end, second, second_flip));
            }
            return targets;
        }
        for cell in segment(self.origin, self.bend, clip) {
            targets.push(EdgeTarget::new(cell, first, first_flip));
        }
        if self.has_second_segment() {
            for cell in segment(self.bend, self.end, clip) {
                targets.push(EdgeTarget::new(cell, second, second_flip));
            }
        }
        targets
    }
}

/// Edge used by straight runs: the right-hand side of the sweep.
/// A run sweeping east sits on South edges, west on North, north on East,
/// south on West.
fn wire_edge(origin: CellCoord, end: CellCoord) -> (Direction, bool) {
    match dominant_axis(origin, end) {
        Axis::X if end.x >= origin.x => (Direction::South, false),
        Axis::X => (Direction::North, true),
        Axis::Z if end.z >= origin.z => (Direction::East, false),
        Axis::Z => (Direction::West, true),
    }
}

/// Cells covered by `pattern`. `end` defaults to `origin`.
pub fn expand_cells(
    pattern: PlacementPattern,
    origin: CellCoord,
    end: Option<CellCoord>,
    endpoints_only: bool,
) -> Vec<CellCoord> {
    expand_cells_within(pattern, origin, end, endpoints_only, &CellRect::UNBOUNDED)
}

/// [`expand_cells`] limited to the cells inside `clip`. Endpoints-only
/// patterns list their few defining cells unclipped.
pub fn expand_cells_within(
    pattern: PlacementPattern,
    origin: CellCoord,
    end: Option<CellCoord>,
    endpoints_only: bool,
    clip: &CellRect,
) -> Vec<CellCoord> {
    let end = end.unwrap_or(origin);
    match pattern {
        PlacementPattern::Single | PlacementPattern::Paint => vec![origin],
        PlacementPattern::Box => box_cells(origin, end, clip),
        PlacementPattern::WireBox => wire_box_cells(origin, end, endpoints_only, clip),
        PlacementPattern::FourDirectionWire => wire_cells(origin, end, endpoints_only, clip),
        PlacementPattern::LShaped => LShape::new(origin, end).cells(endpoints_only, clip),
    }
}

/// Edge targets for edge-aligned objects.
///
/// `direction` is used as-is by Single and Paint and by zero-length drags;
/// longer drags derive the edge from the sweep.
pub fn expand_edges(
    pattern: PlacementPattern,
    origin: CellCoord,
    end: Option<CellCoord>,
    endpoints_only: bool,
    direction: Direction,
) -> Vec<EdgeTarget> {
    expand_edges_within(
        pattern,
        origin,
        end,
        endpoints_only,
        direction,
        &CellRect::UNBOUNDED,
    )
}

pub fn expand_edges_within(
    pattern: PlacementPattern,
    origin: CellCoord,
    end: Option<CellCoord>,
    endpoints_only: bool,
    direction: Direction,
    clip: &CellRect,
) -> Vec<EdgeTarget> {
    let end = end.unwrap_or(origin);
    if !pattern.is_drag() || end == origin {
        return vec![EdgeTarget::new(origin, direction, false)];
    }
    match pattern {
        PlacementPattern::Box | PlacementPattern::FourDirectionWire => {
            let (edge, flipped) = wire_edge(origin, end);
            expand_cells_within(pattern, origin, Some(end), endpoints_only, clip)
                .into_iter()
                .map(|cell| EdgeTarget::new(cell, edge, flipped))
                .collect()
        }
        PlacementPattern::WireBox => {
            let rect = CellRect::spanning(origin, end);
            let flip_x = end.x < origin.x;
            let flip_z = end.z < origin.z;
            let mut targets = Vec::new();
            for cell in wire_box_cells(origin, end, endpoints_only, clip) {
                for side in Direction::ALL {
                    if rect.on_side(cell, side) {
                        let flipped = if side.is_north_south() { flip_x } else { flip_z };
                        targets.push(EdgeTarget::new(cell, side, flipped));
                    }
                }
            }
            targets
        }
        PlacementPattern::LShaped => LShape::new(origin, end).edges(endpoints_only, clip),
        PlacementPattern::Single | PlacementPattern::Paint => {
            vec![EdgeTarget::new(origin, direction, false)]
        }
    }
}

/// Corner targets for corner-aligned objects.
///
/// Every cell is paired with `corner`, except endpoints-only WireBox over a
/// rectangle of at least 2x2 cells, which puts one object on each outer
/// corner of the rectangle.
pub fn expand_corners(
    pattern: PlacementPattern,
    origin: CellCoord,
    end: Option<CellCoord>,
    endpoints_only: bool,
    corner: Corner,
) -> Vec<CornerTarget> {
    expand_corners_within(
        pattern,
        origin,
        end,
        endpoints_only,
        corner,
        &CellRect::UNBOUNDED,
    )
}

pub fn expand_corners_within(
    pattern: PlacementPattern,
    origin: CellCoord,
    end: Option<CellCoord>,
    endpoints_only: bool,
    corner: Corner,
    clip: &CellRect,
) -> Vec<CornerTarget> {
    if pattern == PlacementPattern::WireBox && endpoints_only {
        let rect = CellRect::spanning(origin, end.unwrap_or(origin));
        if rect.is_proper() {
            return rect
                .corners()
                .into_iter()
                .map(|(cell, corner)| CornerTarget { cell, corner })
                .collect();
        }
    }
    expand_cells_within(pattern, origin, end, endpoints_only, clip)
        .into_iter()
        .map(|cell| CornerTarget { cell, corner })
        .collect()
}
