#![warn(missing_docs)]
//! Core types and utilities for `clearpath`.
//!
//! This crate provides the lattice and continuous point types shared by the other crates, and
//! the indexed priority queue that drives grid searches.

mod lattice;
mod pqueue;

pub use crate::lattice::*;
pub use crate::pqueue::*;
