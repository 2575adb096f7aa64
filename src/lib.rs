//! Clearance-aware path finding over 2D worlds described by wall segments.
//!
//! A map file describes the world's size, grid resolution and walls; [`Terrain`] builds a
//! [`PathFinder`] from it and answers queries for agents of a given radius.

mod map;
mod terrain;

pub use clearpath_core::*;
pub use clearpath_grid as grid;
pub use clearpath_raster as raster;

pub use self::map::*;
pub use self::terrain::*;
