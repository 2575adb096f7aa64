use ahash::AHashMap;
use clearpath_core::{IndexedMinHeap, LatticePoint, Point2};
use log::{debug, trace};
use thiserror::Error;

use crate::eight_connected::{euclidean_distance, neighbourhood, octile_distance};
use crate::{smooth, RegularGrid, Shortcut};

/// Admissible distance estimate used to order the open list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Heuristic {
    /// Exact cost of an unobstructed 8-connected path.
    #[default]
    Octile,
    Euclidean,
}

impl Heuristic {
    pub fn estimate(self, from: LatticePoint, to: LatticePoint) -> f64 {
        match self {
            Heuristic::Octile => octile_distance(from, to),
            Heuristic::Euclidean => euclidean_distance(from, to),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchConfig {
    pub heuristic: Heuristic,
    pub shortcut: Shortcut,
    /// Give up after expanding this many cells.
    pub max_expansions: Option<usize>,
}

impl SearchConfig {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = shortcut;
        self
    }

    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }
}

/// Why a query produced no path.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PathFailure {
    #[error("{0} lies outside the grid")]
    OutOfBounds(Point2),
    #[error("source cell {0} is closer to a wall than the clearance radius")]
    SourceBlocked(LatticePoint),
    #[error("sink cell {0} is closer to a wall than the clearance radius")]
    SinkBlocked(LatticePoint),
    #[error("sink unreachable with the requested clearance after expanding {expanded} cells")]
    NoPath { expanded: usize },
    #[error("gave up after expanding {limit} cells")]
    ExpansionLimit { limit: usize },
}

/// A path found by [`AStarSearcher`].
#[derive(Clone, Debug)]
pub struct PathResult {
    /// Every cell from source to sink, inclusive.
    pub cells: Vec<LatticePoint>,
    /// Centres of `cells`.
    pub raw_path: Vec<Point2>,
    /// Waypoint cells after smoothing.
    pub smoothed_cells: Vec<LatticePoint>,
    /// Centres of `smoothed_cells`.
    pub smoothed_path: Vec<Point2>,
    /// Length of `cells` in cell steps.
    pub cost: f64,
    pub expanded: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
struct OpenEntry {
    f: f64,
    h: f64,
    cell: LatticePoint,
}

struct CellRecord {
    g: f64,
    parent: Option<LatticePoint>,
    open_index: Option<usize>,
}

/// A* over the cells of a [`RegularGrid`] that an agent of a given radius fits in.
pub struct AStarSearcher<'a> {
    grid: &'a RegularGrid,
    config: SearchConfig,
}

impl<'a> AStarSearcher<'a> {
    pub fn new(grid: &'a RegularGrid, config: SearchConfig) -> Self {
        AStarSearcher { grid, config }
    }

    pub fn with_defaults(grid: &'a RegularGrid) -> Self {
        Self::new(grid, SearchConfig::default())
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Finds a path from `source` to `sink` on which every cell is at least `clearance` away
    /// from every wall, then smooths it.
    pub fn search(
        &self,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        let grid = self.grid;
        let start = grid.cell_of(source).ok_or(PathFailure::OutOfBounds(source))?;
        let goal = grid.cell_of(sink).ok_or(PathFailure::OutOfBounds(sink))?;
        trace!("searching {start} -> {goal} with clearance {clearance}");

        if !grid.is_passable(start, clearance) {
            debug!("source cell {start} blocked for clearance {clearance}");
            return Err(PathFailure::SourceBlocked(start));
        }
        if !grid.is_passable(goal, clearance) {
            debug!("sink cell {goal} blocked for clearance {clearance}");
            return Err(PathFailure::SinkBlocked(goal));
        }

        let heuristic = self.config.heuristic;
        let mut open_list = IndexedMinHeap::new();
        let mut records: AHashMap<LatticePoint, CellRecord> = AHashMap::new();

        let h = heuristic.estimate(start, goal);
        let index = open_list.push(OpenEntry { f: h, h, cell: start });
        records.insert(
            start,
            CellRecord {
                g: 0.0,
                parent: None,
                open_index: Some(index),
            },
        );

        let mut expanded = 0;
        while let Some(OpenEntry { cell: node, .. }) = open_list.pop() {
            if node == goal {
                let result = self.finish(&records, goal, clearance, expanded);
                debug!(
                    "found path {start} -> {goal}: {} cells, {} waypoints, cost {:.3}, \
                     {expanded} expanded",
                    result.cells.len(),
                    result.smoothed_cells.len(),
                    result.cost
                );
                return Ok(result);
            }

            if self.config.max_expansions.is_some_and(|limit| expanded >= limit) {
                debug!("expansion budget of {expanded} cells exhausted");
                return Err(PathFailure::ExpansionLimit { limit: expanded });
            }
            expanded += 1;

            let node_g = records.get(&node).map_or(f64::INFINITY, |r| r.g);

            for dir in neighbourhood(node, |c| grid.is_passable(c, clearance)) {
                let successor = dir.step(node);
                let new_g = node_g + dir.cost();
                let record = records.entry(successor).or_insert(CellRecord {
                    g: f64::INFINITY,
                    parent: None,
                    open_index: None,
                });
                if new_g < record.g {
                    record.g = new_g;
                    record.parent = Some(node);
                    let h = heuristic.estimate(successor, goal);
                    let entry = OpenEntry {
                        f: new_g + h,
                        h,
                        cell: successor,
                    };
                    match record.open_index {
                        Some(index) if open_list.contains(index) => open_list.modify(index, entry),
                        _ => record.open_index = Some(open_list.push(entry)),
                    }
                }
            }
        }

        debug!("no path {start} -> {goal} with clearance {clearance}, {expanded} expanded");
        Err(PathFailure::NoPath { expanded })
    }

    fn finish(
        &self,
        records: &AHashMap<LatticePoint, CellRecord>,
        goal: LatticePoint,
        clearance: f32,
        expanded: usize,
    ) -> PathResult {
        let mut cells = vec![goal];
        while let Some(parent) = records
            .get(&cells[cells.len() - 1])
            .and_then(|record| record.parent)
        {
            cells.push(parent);
        }
        cells.reverse();

        let smoothed_cells = smooth(self.grid, &cells, clearance, self.config.shortcut);
        PathResult {
            raw_path: cells.iter().map(|&c| self.grid.cell_centre(c)).collect(),
            smoothed_path: smoothed_cells
                .iter()
                .map(|&c| self.grid.cell_centre(c))
                .collect(),
            cost: records.get(&goal).map_or(0.0, |r| r.g),
            cells,
            smoothed_cells,
            expanded,
        }
    }
}

impl RegularGrid {
    /// [`AStarSearcher::search`] with the default configuration.
    pub fn find_path(
        &self,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        AStarSearcher::with_defaults(self).search(source, sink, clearance)
    }

    pub fn find_path_with(
        &self,
        config: &SearchConfig,
        source: Point2,
        sink: Point2,
        clearance: f32,
    ) -> Result<PathResult, PathFailure> {
        AStarSearcher::new(self, config.clone()).search(source, sink, clearance)
    }
}
