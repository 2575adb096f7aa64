//! Types and utilities for moving on 8-connected grids.

use std::f64::consts::SQRT_2;

use clearpath_core::LatticePoint;
use enumset::{EnumSet, EnumSetType};

/// Compass direction between a cell and one of its 8 neighbours. North is towards negative y.
#[derive(EnumSetType, Debug, Hash)]
pub enum Direction {
    North,
    West,
    South,
    East,
    NorthWest,
    SouthWest,
    SouthEast,
    NorthEast,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (1, 1),
            Direction::NorthEast => (1, -1),
        }
    }

    pub fn step(self, from: LatticePoint) -> LatticePoint {
        let (dx, dy) = self.offset();
        from.offset(dx, dy)
    }

    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.offset();
        dx != 0 && dy != 0
    }

    /// Cost of one move in this direction.
    pub fn cost(self) -> f64 {
        if self.is_diagonal() {
            SQRT_2
        } else {
            1.0
        }
    }

    pub fn backwards(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthWest => Direction::NorthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::NorthEast => Direction::SouthWest,
        }
    }
}

/// Directions in which a move from `cell` lands on a passable cell.
///
/// `passable` is responsible for rejecting out-of-bounds cells. Diagonal moves are only allowed
/// when both orthogonal cells they pass between are passable, so paths never cut corners.
pub fn neighbourhood(
    cell: LatticePoint,
    mut passable: impl FnMut(LatticePoint) -> bool,
) -> EnumSet<Direction> {
    use Direction::*;

    let mut nb = EnumSet::empty();

    let north_traversable = passable(North.step(cell));
    if north_traversable {
        nb |= North;
    }

    let south_traversable = passable(South.step(cell));
    if south_traversable {
        nb |= South;
    }

    if passable(West.step(cell)) {
        nb |= West;
        if north_traversable && passable(NorthWest.step(cell)) {
            nb |= NorthWest;
        }
        if south_traversable && passable(SouthWest.step(cell)) {
            nb |= SouthWest;
        }
    }

    if passable(East.step(cell)) {
        nb |= East;
        if north_traversable && passable(NorthEast.step(cell)) {
            nb |= NorthEast;
        }
        if south_traversable && passable(SouthEast.step(cell)) {
            nb |= SouthEast;
        }
    }

    nb
}

pub fn octile_distance(from: LatticePoint, to: LatticePoint) -> f64 {
    let dx = (from.x - to.x).abs();
    let dy = (from.y - to.y).abs();
    let diagonals = dx.min(dy);
    let orthos = dx.max(dy) - diagonals;
    orthos as f64 + diagonals as f64 * SQRT_2
}

pub fn euclidean_distance(from: LatticePoint, to: LatticePoint) -> f64 {
    ((from.x - to.x) as f64).hypot((from.y - to.y) as f64)
}
