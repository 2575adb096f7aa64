//! Grid-based path finding with an agent clearance constraint.
//!
//! A [`RegularGrid`] covers a rectangular world with square-ish cells, each holding the distance
//! from its centre to the nearest rasterised wall. [`AStarSearcher`] finds cell paths that stay
//! at least a clearance radius away from every wall, and [`smooth`] reduces them to waypoints.

mod distance_transform;
mod grid;
mod regular_grid;
mod search;
mod smoothing;

pub mod eight_connected;

pub use self::eight_connected::{euclidean_distance, octile_distance, Direction};
pub use self::grid::*;
pub use self::regular_grid::*;
pub use self::search::*;
pub use self::smoothing::*;
