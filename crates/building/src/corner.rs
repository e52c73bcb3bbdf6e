//! Corner and edge adjacency resolution.
//!
//! Maps a continuous world point to the nearest corner (or edge) of a cell and
//! lists the neighboring cells that share that corner (or edge).

use bevy::math::{Vec2, Vec3};

use crate::coords::{CellCoord, Corner, Direction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerResolver {
    cell_size: f32,
}

impl CornerResolver {
    pub fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    /// World positions of the four corners of the cell anchored at `anchor`
    /// (its south-west corner), in tie-break order `SW, SE, NW, NE`.
    pub fn corner_positions(&self, anchor: Vec3) -> [(Corner, Vec2); 4] {
        let base = Vec2::new(anchor.x, anchor.z);
        Corner::ALL.map(|corner| {
            let (ux, uz) = corner.unit_offset();
            (corner, base + Vec2::new(ux, uz) * self.cell_size)
        })
    }

    /// Corner of the anchored cell nearest to `point` in the grid plane.
    /// Ties resolve to the earlier corner in `SW, SE, NW, NE`.
    pub fn resolve_corner(&self, point: Vec3, anchor: Vec3) -> Corner {
        let p = Vec2::new(point.x, point.z);
        let mut best = Corner::SouthWest;
        let mut best_dist = f32::INFINITY;
        for (corner, pos) in self.corner_positions(anchor) {
            let dist = p.distance_squared(pos);
            if dist < best_dist {
                best = corner;
                best_dist = dist;
            }
        }
        best
    }

    /// Edge of the anchored cell whose midpoint is nearest to `point`.
    /// Ties resolve to the earlier edge in `N, E, S, W`.
    pub fn resolve_edge(&self, point: Vec3, anchor: Vec3) -> Direction {
        let p = Vec2::new(point.x, point.z);
        let half = self.cell_size * 0.5;
        let base = Vec2::new(anchor.x, anchor.z);
        let mut best = Direction::North;
        let mut best_dist = f32::INFINITY;
        for dir in Direction::ALL {
            let midpoint = match dir {
                Direction::North => base + Vec2::new(half, self.cell_size),
                Direction::East => base + Vec2::new(self.cell_size, half),
                Direction::South => base + Vec2::new(half, 0.0),
                Direction::West => base + Vec2::new(0.0, half),
            };
            let dist = p.distance_squared(midpoint);
            if dist < best_dist {
                best = dir;
                best_dist = dist;
            }
        }
        best
    }
}

/// The three other cells touching `corner` of `origin`, with the corner label
/// each of them sees at that point.
pub fn shared_corner_cells(origin: CellCoord, corner: Corner) -> [(CellCoord, Corner); 3] {
    match corner {
        Corner::NorthEast => [
            (origin.offset(1, 0), Corner::NorthWest),
            (origin.offset(0, 1), Corner::SouthEast),
            (origin.offset(1, 1), Corner::SouthWest),
        ],
        Corner::NorthWest => [
            (origin.offset(-1, 0), Corner::NorthEast),
            (origin.offset(0, 1), Corner::SouthWest),
            (origin.offset(-1, 1), Corner::SouthEast),
        ],
        Corner::SouthEast => [
            (origin.offset(1, 0), Corner::SouthWest),
            (origin.offset(0, -1), Corner::NorthEast),
            (origin.offset(1, -1), Corner::NorthWest),
        ],
        Corner::SouthWest => [
            (origin.offset(-1, 0), Corner::SouthEast),
            (origin.offset(0, -1), Corner::NorthWest),
            (origin.offset(-1, -1), Corner::NorthEast),
        ],
    }
}

/// The cell on the other side of `direction` and the edge it sees there.
pub fn edge_neighbor(cell: CellCoord, direction: Direction) -> (CellCoord, Direction) {
    let (dx, dz) = direction.offset();
    (cell.offset(dx, dz), direction.opposite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_corner_in_unit_cell() {
        let resolver = CornerResolver::new(1.0);
        let anchor = Vec3::ZERO;
        assert_eq!(
            resolver.resolve_corner(Vec3::new(0.9, 0.0, 0.9), anchor),
            Corner::NorthEast
        );
        assert_eq!(
            resolver.resolve_corner(Vec3::new(0.1, 0.0, 0.1), anchor),
            Corner::SouthWest
        );
        assert_eq!(
            resolver.resolve_corner(Vec3::new(0.8, 5.0, 0.2), anchor),
            Corner::SouthEast
        );
        assert_eq!(
            resolver.resolve_corner(Vec3::new(0.2, 0.0, 0.7), anchor),
            Corner::NorthWest
        );
    }

    #[test]
    fn center_ties_resolve_to_south_west() {
        let resolver = CornerResolver::new(2.0);
        let anchor = Vec3::new(4.0, 0.0, 6.0);
        assert_eq!(
            resolver.resolve_corner(Vec3::new(5.0, 0.0, 7.0), anchor),
            Corner::SouthWest
        );
        // Equidistant from SE and NE: SE comes first.
        assert_eq!(
            resolver.resolve_corner(Vec3::new(6.0, 0.0, 7.0), anchor),
            Corner::SouthEast
        );
    }

    #[test]
    fn shared_corners_point_back_at_origin() {
        let origin = CellCoord::new(5, 5);
        for corner in Corner::ALL {
            let (ox, oz) = corner.unit_offset();
            let shared_point = (origin.x as f32 + ox, origin.z as f32 + oz);
            for (cell, seen) in shared_corner_cells(origin, corner) {
                assert_ne!(cell, origin);
                let (sx, sz) = seen.unit_offset();
                assert_eq!((cell.x as f32 + sx, cell.z as f32 + sz), shared_point);
            }
        }
    }

    #[test]
    fn north_east_is_south_west_of_diagonal() {
        let shared = shared_corner_cells(CellCoord::new(0, 0), Corner::NorthEast);
        assert!(shared.contains(&(CellCoord::new(1, 1), Corner::SouthWest)));
    }

    #[test]
    fn nearest_edge_and_neighbor() {
        let resolver = CornerResolver::new(1.0);
        assert_eq!(
            resolver.resolve_edge(Vec3::new(0.5, 0.0, 0.95), Vec3::ZERO),
            Direction::North
        );
        assert_eq!(
            resolver.resolve_edge(Vec3::new(0.05, 0.0, 0.5), Vec3::ZERO),
            Direction::West
        );
        assert_eq!(
            edge_neighbor(CellCoord::new(2, 2), Direction::East),
            (CellCoord::new(3, 2), Direction::West)
        );
    }
}
