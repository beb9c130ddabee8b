//! Axial hex addressing (pointy-top).

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axial coordinate of a hex cell. The implied third cube component is
/// `-x - y`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

/// The six neighbor directions. The discriminant order is the order used by
/// every "all neighbors" enumeration and by the ring walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> HexDirection {
        Self::ALL[index % 6]
    }

    /// Axial `(dx, dy)` step for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            HexDirection::East => (1, 0),
            HexDirection::NorthEast => (1, -1),
            HexDirection::NorthWest => (0, -1),
            HexDirection::West => (-1, 0),
            HexDirection::SouthWest => (-1, 1),
            HexDirection::SouthEast => (0, 1),
        }
    }

    pub fn opposite(self) -> HexDirection {
        Self::from_index(self.index() + 3)
    }
}

impl Coords {
    pub const ORIGIN: Coords = Coords { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_cube(self) -> (i32, i32, i32) {
        (self.x, self.y, -self.x - self.y)
    }

    pub fn neighbor(self, direction: HexDirection) -> Coords {
        let (dx, dy) = direction.offset();
        Coords::new(self.x + dx, self.y + dy)
    }

    /// All six neighbors in [`HexDirection::ALL`] order.
    pub fn neighbors(self) -> [Coords; 6] {
        HexDirection::ALL.map(|direction| self.neighbor(direction))
    }

    pub fn distance(self, other: Coords) -> u32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx.unsigned_abs() + (dx + dy).unsigned_abs() + dy.unsigned_abs()) / 2
    }

    /// Cells exactly `radius` steps away, starting `radius` steps east of
    /// `self` and walking each side of the ring in turn.
    pub fn ring(self, radius: u32) -> Vec<Coords> {
        if radius == 0 {
            return vec![self];
        }
        let steps = radius as i32;
        let (dx, dy) = HexDirection::East.offset();
        let mut current = Coords::new(self.x + dx * steps, self.y + dy * steps);
        let mut cells = Vec::with_capacity(6 * radius as usize);
        for side in 0..6 {
            let direction = HexDirection::from_index(side + 2);
            for _ in 0..radius {
                cells.push(current);
                current = current.neighbor(direction);
            }
        }
        cells
    }

    /// Center followed by rings `1..=radius`.
    pub fn spiral(self, radius: u32) -> Vec<Coords> {
        let mut cells = Vec::with_capacity(cell_count(radius));
        for ring in 0..=radius {
            cells.extend(self.ring(ring));
        }
        cells
    }

    /// Nearest cell to a fractional axial position, using cube rounding so
    /// the result is the true nearest cell rather than a component-wise
    /// rounding.
    pub fn round_to_nearest(x: f64, y: f64) -> Coords {
        let z = -x - y;
        let mut rx = x.round();
        let mut ry = y.round();
        let rz = z.round();

        let dx = (rx - x).abs();
        let dy = (ry - y).abs();
        let dz = (rz - z).abs();

        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy > dz {
            ry = -rx - rz;
        }
        Coords::new(rx as i32, ry as i32)
    }

    /// Center of this cell in world space for hexes of circumradius `size`.
    pub fn to_point(self, size: f64) -> (f64, f64) {
        let x = f64::from(self.x);
        let y = f64::from(self.y);
        (size * SQRT_3 * (x + y / 2.0), size * 1.5 * y)
    }

    pub fn from_point(px: f64, py: f64, size: f64) -> Coords {
        let x = (SQRT_3 / 3.0 * px - py / 3.0) / size;
        let y = (2.0 / 3.0 * py) / size;
        Coords::round_to_nearest(x, y)
    }
}

/// Number of cells in a hexagon of the given radius.
pub fn cell_count(radius: u32) -> usize {
    let r = radius as usize;
    1 + 3 * r * (r + 1)
}

impl Add for Coords {
    type Output = Coords;

    fn add(self, rhs: Coords) -> Coords {
        Coords::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coords {
    type Output = Coords;

    fn sub(self, rhs: Coords) -> Coords {
        Coords::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn neighbors_are_at_distance_one() {
        let center = Coords::new(3, -2);
        for neighbor in center.neighbors() {
            assert_eq!(center.distance(neighbor), 1);
        }
    }

    #[test]
    fn opposite_directions_cancel() {
        for direction in HexDirection::ALL {
            let there = Coords::ORIGIN.neighbor(direction);
            assert_eq!(there.neighbor(direction.opposite()), Coords::ORIGIN);
        }
    }

    #[test]
    fn distance_matches_cube_metric() {
        let a = Coords::new(0, 0);
        let b = Coords::new(3, -1);
        assert_eq!(a.distance(b), 3);
        assert_eq!(Coords::new(-2, 4).distance(Coords::new(1, -1)), 5);
    }

    #[test]
    fn ring_has_six_r_distinct_cells() {
        for radius in 1..5 {
            let ring = Coords::ORIGIN.ring(radius);
            assert_eq!(ring.len(), 6 * radius as usize);
            let unique: HashSet<_> = ring.iter().copied().collect();
            assert_eq!(unique.len(), ring.len());
            assert!(ring.iter().all(|c| c.distance(Coords::ORIGIN) == radius));
            assert_eq!(ring[0], Coords::new(radius as i32, 0));
        }
    }

    #[test]
    fn spiral_sizes() {
        assert_eq!(Coords::ORIGIN.spiral(0), vec![Coords::ORIGIN]);
        assert_eq!(Coords::ORIGIN.spiral(2).len(), 19);
        assert_eq!(cell_count(2), 19);
    }

    #[test]
    fn rounding_fixes_the_largest_error() {
        assert_eq!(Coords::round_to_nearest(0.2, 0.1), Coords::new(0, 0));
        assert_eq!(Coords::round_to_nearest(0.4, 0.4), Coords::new(0, 1));
        assert_eq!(Coords::round_to_nearest(0.6, 0.3), Coords::new(1, 0));
        assert_eq!(Coords::round_to_nearest(2.1, -0.9), Coords::new(2, -1));
    }

    #[test]
    fn point_round_trip() {
        for cell in Coords::ORIGIN.spiral(3) {
            let (px, py) = cell.to_point(10.0);
            assert_eq!(Coords::from_point(px, py, 10.0), cell);
            assert_eq!(Coords::from_point(px + 2.0, py - 3.0, 10.0), cell);
        }
    }
}
