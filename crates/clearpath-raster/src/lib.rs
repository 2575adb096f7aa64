//! Digital line traversal between lattice points.

mod ray;

pub use self::ray::*;
