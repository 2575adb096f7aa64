use std::path::Path;

use clearpath_core::{Point2, Segment};
use clearpath_grid::{GridError, PathFailure, PathResult, RegularGrid, SearchConfig};
use log::{debug, info};
use thiserror::Error;

use crate::{FinderKind, MapDescription, MapError};

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A prepared path finding structure.
#[derive(Clone, Debug)]
pub enum PathFinder {
    RegularGrid(RegularGrid),
}

impl PathFinder {
    pub fn kind(&self) -> FinderKind {
        match self {
            PathFinder::RegularGrid(_) => FinderKind::RegularGrid,
        }
    }

    pub fn as_regular_grid(&self) -> Option<&RegularGrid> {
        match self {
            PathFinder::RegularGrid(grid) => Some(grid),
        }
    }

    pub fn find_path(
        &self,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        match self {
            PathFinder::RegularGrid(grid) => grid.find_path(source, sink, clearance),
        }
    }

    pub fn find_path_with(
        &self,
        config: &SearchConfig,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        match self {
            PathFinder::RegularGrid(grid) => grid.find_path_with(config, source, sink, clearance),
        }
    }

    fn add_wall(&mut self, wall: &Segment) {
        match self {
            PathFinder::RegularGrid(grid) => grid.add_segment(wall),
        }
    }

    /// Rebuilds the structure from scratch over `walls` plus the world boundary.
    fn rebuild(&mut self, walls: &[Segment]) {
        match self {
            PathFinder::RegularGrid(grid) => {
                grid.reset();
                fill_regular_grid(grid, walls);
            }
        }
    }
}

/// The walls of a world together with the path finder built over them.
#[derive(Clone, Debug)]
pub struct Terrain {
    walls: Vec<Segment>,
    finder: PathFinder,
}

impl Terrain {
    pub fn build(map: &MapDescription) -> Result<Self, GridError> {
        let finder = match map.kind {
            FinderKind::RegularGrid => {
                let mut grid = RegularGrid::new(map.res_x, map.res_y, map.dim_x, map.dim_y)?;
                fill_regular_grid(&mut grid, &map.walls);
                PathFinder::RegularGrid(grid)
            }
        };
        info!(
            "built {} terrain {}x{} over {}x{} with {} walls",
            map.kind,
            map.res_x,
            map.res_y,
            map.dim_x,
            map.dim_y,
            map.walls.len()
        );
        Ok(Terrain {
            walls: map.walls.clone(),
            finder,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        debug!("loading map {}", path.display());
        let map = MapDescription::read(path)?;
        Ok(Terrain::build(&map)?)
    }

    /// Interior walls, in insertion order. The world boundary is not included.
    pub fn walls(&self) -> &[Segment] {
        &self.walls
    }

    pub fn path_finder(&self) -> &PathFinder {
        &self.finder
    }

    pub fn add_wall(&mut self, wall: Segment) {
        self.finder.add_wall(&wall);
        self.walls.push(wall);
    }

    /// Removes the wall at `index` and rebuilds the path finder from the remaining walls.
    pub fn remove_wall(&mut self, index: usize) -> Option<Segment> {
        if index >= self.walls.len() {
            return None;
        }
        let wall = self.walls.remove(index);
        debug!("removed wall {index}, rebuilding from {} walls", self.walls.len());
        self.finder.rebuild(&self.walls);
        Some(wall)
    }

    pub fn find_path(
        &self,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        self.finder.find_path(source, sink, clearance)
    }

    pub fn find_path_with(
        &self,
        config: &SearchConfig,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        self.finder.find_path_with(config, source, sink, clearance)
    }
}

fn fill_regular_grid(grid: &mut RegularGrid, walls: &[Segment]) {
    let boundary = grid.boundary_segments();
    for wall in walls.iter().chain(&boundary) {
        grid.rasterise_segment(wall);
        grid.expand_function_distance(wall);
    }
    grid.make_final_state();
}
