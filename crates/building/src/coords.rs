use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Integer cell coordinate on a grid layer. `x` grows east, `z` grows north.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[inline]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }
}

impl From<(i32, i32)> for CellCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

/// One of the four edges of a cell.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position of this direction in [`Direction::ALL`]; used to index edge slots.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Cell offset `(dx, dz)` of the neighbor across this edge.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub const fn rotate_cw(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// `true` when the object's long side runs along X (no footprint swap).
    pub const fn is_north_south(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

/// One of the four corners of a cell, enumerated in tie-break order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub enum Corner {
    #[default]
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::SouthWest,
        Corner::SouthEast,
        Corner::NorthWest,
        Corner::NorthEast,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Corner::SouthWest => 0,
            Corner::SouthEast => 1,
            Corner::NorthWest => 2,
            Corner::NorthEast => 3,
        }
    }

    /// Offset of this corner from the cell anchor, in cells.
    pub const fn unit_offset(self) -> (f32, f32) {
        match self {
            Corner::SouthWest => (0.0, 0.0),
            Corner::SouthEast => (1.0, 0.0),
            Corner::NorthWest => (0.0, 1.0),
            Corner::NorthEast => (1.0, 1.0),
        }
    }
}

/// Inclusive rectangle of cell coordinates.
///
/// Also used as the clip window of an expansion: cells outside it are never
/// enumerated, which bounds the work of a drag whose end lies far off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl CellRect {
    pub const UNBOUNDED: CellRect = CellRect {
        min_x: i32::MIN,
        max_x: i32::MAX,
        min_z: i32::MIN,
        max_z: i32::MAX,
    };

    pub fn spanning(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_z: a.z.min(b.z),
            max_z: a.z.max(b.z),
        }
    }

    /// A `width` x `length` grid plus a one-cell ring around it. Drag targets
    /// in the ring still come back as out-of-bounds failures.
    pub fn around_grid(width: u32, length: u32) -> Self {
        let max = |n: u32| i32::try_from(n).unwrap_or(i32::MAX);
        Self {
            min_x: -1,
            max_x: max(width),
            min_z: -1,
            max_z: max(length),
        }
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        self.contains_x(cell.x) && self.contains_z(cell.z)
    }

    pub(crate) fn contains_x(&self, x: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x)
    }

    pub(crate) fn contains_z(&self, z: i32) -> bool {
        (self.min_z..=self.max_z).contains(&z)
    }

    /// At least two cells along both axes.
    pub(crate) fn is_proper(&self) -> bool {
        self.min_x != self.max_x && self.min_z != self.max_z
    }

    /// Corners in `SW, SE, NW, NE` order, paired with their outer corner label.
    pub(crate) fn corners(&self) -> [(CellCoord, Corner); 4] {
        [
            (CellCoord::new(self.min_x, self.min_z), Corner::SouthWest),
            (CellCoord::new(self.max_x, self.min_z), Corner::SouthEast),
            (CellCoord::new(self.min_x, self.max_z), Corner::NorthWest),
            (CellCoord::new(self.max_x, self.max_z), Corner::NorthEast),
        ]
    }

    pub(crate) fn on_side(&self, cell: CellCoord, side: Direction) -> bool {
        match side {
            Direction::North => cell.z == self.max_z,
            Direction::East => cell.x == self.max_x,
            Direction::South => cell.z == self.min_z,
            Direction::West => cell.x == self.min_x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Z,
}
