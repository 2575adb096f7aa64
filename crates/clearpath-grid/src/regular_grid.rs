use clearpath_core::{LatticePoint, Point2, Segment};
use clearpath_raster::segment_cells;
use log::{debug, trace};
use thiserror::Error;

use crate::distance_transform::squared_distance_transform;
use crate::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GridError {
    #[error("grid resolution must be positive, got {res_x}x{res_y}")]
    InvalidResolution { res_x: i32, res_y: i32 },
    #[error("grid dimensions must be positive and finite, got {dim_x}x{dim_y}")]
    InvalidDimensions { dim_x: f32, dim_y: f32 },
}

/// Distance field over a rectangular world of `dim_x` by `dim_y` units, split into
/// `res_x` by `res_y` cells.
///
/// Every cell stores the world-space distance from its centre to the centre of the nearest cell
/// covered by a rasterised wall; those cells store `0`. Cells that no wall has reached yet store
/// `+inf`.
///
/// Walls can be added at any time with [`add_segment`](Self::add_segment), but the field never
/// retracts: there is no way to remove a wall other than building the grid again from the
/// remaining walls.
#[derive(Clone, Debug)]
pub struct RegularGrid {
    cells: Grid<f32>,
    dim_x: f32,
    dim_y: f32,
    len_x: f32,
    len_y: f32,
    max_dist: f32,
}

impl Default for RegularGrid {
    fn default() -> Self {
        RegularGrid {
            cells: Grid::new(0, 0, |_, _| f32::INFINITY),
            dim_x: 0.0,
            dim_y: 0.0,
            len_x: 0.0,
            len_y: 0.0,
            max_dist: 0.0,
        }
    }
}

impl RegularGrid {
    pub fn new(res_x: i32, res_y: i32, dim_x: f32, dim_y: f32) -> Result<Self, GridError> {
        if res_x <= 0 || res_y <= 0 {
            return Err(GridError::InvalidResolution { res_x, res_y });
        }
        if !(dim_x > 0.0 && dim_y > 0.0 && dim_x.is_finite() && dim_y.is_finite()) {
            return Err(GridError::InvalidDimensions { dim_x, dim_y });
        }
        Ok(RegularGrid {
            cells: Grid::filled(res_x, res_y, f32::INFINITY),
            dim_x,
            dim_y,
            len_x: dim_x / res_x as f32,
            len_y: dim_y / res_y as f32,
            max_dist: 0.0,
        })
    }

    /// Reallocates the grid with every cell unvisited. On error the grid is left empty.
    pub fn init(
        &mut self,
        res_x: i32,
        res_y: i32,
        dim_x: f32,
        dim_y: f32,
    ) -> Result<(), GridError> {
        match RegularGrid::new(res_x, res_y, dim_x, dim_y) {
            Ok(grid) => {
                *self = grid;
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    /// Releases the cells. The grid becomes `0x0`.
    pub fn clear(&mut self) {
        *self = RegularGrid::default();
    }

    /// Marks every cell unvisited again, keeping the resolution and dimensions.
    pub fn reset(&mut self) {
        self.cells.storage_mut().fill(f32::INFINITY);
        self.max_dist = 0.0;
    }

    pub fn is_empty(&self) -> bool {
        self.cells.storage().is_empty()
    }

    pub fn cells(&self) -> &Grid<f32> {
        &self.cells
    }

    pub fn res_x(&self) -> i32 {
        self.cells.width()
    }

    pub fn res_y(&self) -> i32 {
        self.cells.height()
    }

    pub fn dim_x(&self) -> f32 {
        self.dim_x
    }

    pub fn dim_y(&self) -> f32 {
        self.dim_y
    }

    pub fn len_x(&self) -> f32 {
        self.len_x
    }

    pub fn len_y(&self) -> f32 {
        self.len_y
    }

    /// Largest finite distance, as of the last [`make_final_state`](Self::make_final_state).
    pub fn max_dist(&self) -> f32 {
        self.max_dist
    }

    pub fn distance(&self, cell: LatticePoint) -> Option<f32> {
        self.cells.get(cell).copied()
    }

    /// Whether an agent of radius `clearance` fits in `cell`. Out-of-bounds cells never fit.
    #[inline]
    pub fn is_passable(&self, cell: LatticePoint, clearance: f32) -> bool {
        self.cells.get(cell).is_some_and(|&d| d >= clearance)
    }

    /// Lattice coordinates of a world point, which may lie outside the grid.
    pub fn lattice_of(&self, p: Point2) -> LatticePoint {
        LatticePoint::new(
            (p.x / self.len_x).floor() as i32,
            (p.y / self.len_y).floor() as i32,
        )
    }

    /// The cell containing a world point, if it is inside the grid.
    pub fn cell_of(&self, p: Point2) -> Option<LatticePoint> {
        if self.is_empty() {
            return None;
        }
        let cell = self.lattice_of(p);
        self.cells.contains(cell).then_some(cell)
    }

    pub fn cell_centre(&self, cell: LatticePoint) -> Point2 {
        Point2::new(
            (cell.x as f32 + 0.5) * self.len_x,
            (cell.y as f32 + 0.5) * self.len_y,
        )
    }

    /// The four walls along the outermost rows and columns of cells.
    pub fn boundary_segments(&self) -> [Segment; 4] {
        let right = self.dim_x - self.len_x;
        let top = self.dim_y - self.len_y;
        [
            Segment::from_coords(0.0, 0.0, right, 0.0),
            Segment::from_coords(0.0, 0.0, 0.0, top),
            Segment::from_coords(right, 0.0, right, top),
            Segment::from_coords(0.0, top, right, top),
        ]
    }

    /// Cells covered by the part of `segment` inside the grid, in traversal order.
    pub fn footprint(&self, segment: &Segment) -> Vec<LatticePoint> {
        if self.is_empty() {
            return vec![];
        }
        let Some(inside) = self.clip(segment) else {
            return vec![];
        };
        segment_cells(self.clamped_lattice_of(inside.a), self.clamped_lattice_of(inside.b))
            .collect()
    }

    /// The part of `segment` inside `[0, dim_x] x [0, dim_y]` (Liang-Barsky).
    fn clip(&self, segment: &Segment) -> Option<Segment> {
        let (a, b) = (segment.a, segment.b);
        if ![a.x, a.y, b.x, b.y].iter().all(|c| c.is_finite()) {
            debug!("ignoring non-finite segment {a:?} -> {b:?}");
            return None;
        }
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);
        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        for (p, q) in [
            (-dx, ax),
            (dx, self.dim_x as f64 - ax),
            (-dy, ay),
            (dy, self.dim_y as f64 - ay),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else if p < 0.0 {
                t0 = t0.max(q / p);
            } else {
                t1 = t1.min(q / p);
            }
        }
        // Unclipped ends are kept bit-exact so they floor to the same cell.
        let at = |t: f64| match t {
            t if t == 0.0 => a,
            t if t == 1.0 => b,
            t => Point2::new((ax + t * dx) as f32, (ay + t * dy) as f32),
        };
        (t0 <= t1).then(|| Segment::new(at(t0), at(t1)))
    }

    /// [`lattice_of`](Self::lattice_of), pulled onto the nearest cell of a non-empty grid.
    fn clamped_lattice_of(&self, p: Point2) -> LatticePoint {
        let cell = self.lattice_of(p);
        LatticePoint::new(
            cell.x.clamp(0, self.res_x() - 1),
            cell.y.clamp(0, self.res_y() - 1),
        )
    }

    /// Marks every cell covered by `segment` as an obstacle and returns those cells.
    ///
    /// Parts of the segment outside the grid are ignored.
    pub fn rasterise_segment(&mut self, segment: &Segment) -> Vec<LatticePoint> {
        let footprint = self.footprint(segment);
        for &cell in &footprint {
            self.cells[cell] = 0.0;
        }
        trace!(
            "rasterised {:?} -> {:?} into {} cells",
            segment.a,
            segment.b,
            footprint.len()
        );
        footprint
    }

    /// Lowers every cell to its distance from `segment`'s footprint, where that is closer than
    /// its current value.
    pub fn expand_function_distance(&mut self, segment: &Segment) {
        let footprint = self.footprint(segment);
        self.expand_from(&footprint);
    }

    /// Rasterises `segment`, expands its distances and refreshes `max_dist`.
    pub fn add_segment(&mut self, segment: &Segment) {
        let footprint = self.rasterise_segment(segment);
        self.expand_from(&footprint);
        self.make_final_state();
    }

    /// Records the largest finite distance in the grid.
    pub fn make_final_state(&mut self) {
        self.max_dist = self
            .cells
            .storage()
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(0.0, f32::max);
        debug!(
            "finalised {}x{} grid, max distance {:.3}",
            self.res_x(),
            self.res_y(),
            self.max_dist
        );
    }

    fn expand_from(&mut self, footprint: &[LatticePoint]) {
        if footprint.is_empty() {
            return;
        }
        let mut field = Grid::filled(self.res_x(), self.res_y(), f64::INFINITY);
        for &cell in footprint {
            field[cell] = 0.0;
        }
        squared_distance_transform(&mut field, self.len_x as f64, self.len_y as f64);

        let mut lowered = 0usize;
        for (stored, &squared) in self.cells.storage_mut().iter_mut().zip(field.storage()) {
            let distance = squared.sqrt() as f32;
            if distance < *stored {
                *stored = distance;
                lowered += 1;
            }
        }
        trace!("expanded {} footprint cells, lowered {lowered} cells", footprint.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_distance(dx: i32, dy: i32, len_x: f32, len_y: f32) -> f32 {
        (dx as f32 * len_x).hypot(dy as f32 * len_y)
    }

    fn brute_force(footprint: &[LatticePoint], cell: LatticePoint, len_x: f32, len_y: f32) -> f32 {
        footprint
            .iter()
            .map(|c| cell_distance(cell.x - c.x, cell.y - c.y, len_x, len_y))
            .fold(f32::INFINITY, f32::min)
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            RegularGrid::new(0, 4, 1.0, 1.0).unwrap_err(),
            GridError::InvalidResolution { res_x: 0, res_y: 4 }
        );
        assert!(matches!(
            RegularGrid::new(4, 4, -1.0, 1.0),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(RegularGrid::new(4, 4, f32::NAN, 1.0).is_err());
    }

    #[test]
    fn starts_unvisited() {
        let grid = RegularGrid::new(4, 3, 8.0, 3.0).unwrap();
        assert_eq!(grid.len_x(), 2.0);
        assert_eq!(grid.len_y(), 1.0);
        assert!(grid.cells().storage().iter().all(|d| *d == f32::INFINITY));
        assert_eq!(grid.cell_of(Point2::new(7.9, 2.5)), Some(LatticePoint::new(3, 2)));
        assert_eq!(grid.cell_of(Point2::new(8.0, 0.0)), None);
        assert_eq!(grid.cell_of(Point2::new(-0.1, 0.0)), None);
        assert_eq!(grid.cell_centre(LatticePoint::new(1, 1)), Point2::new(3.0, 1.5));
    }

    #[test]
    fn single_segment_field_is_exact() {
        let mut grid = RegularGrid::new(16, 12, 16.0, 12.0).unwrap();
        let wall = Segment::from_coords(3.0, 2.0, 11.0, 7.0);
        let footprint = grid.rasterise_segment(&wall);
        grid.expand_function_distance(&wall);
        grid.make_final_state();

        assert_eq!(footprint.len(), 9);
        for &cell in &footprint {
            assert_eq!(grid.distance(cell), Some(0.0));
        }

        let mut by_distance: Vec<_> = grid
            .cells()
            .coords()
            .map(|cell| (brute_force(&footprint, cell, 1.0, 1.0), grid.cells()[cell]))
            .collect();
        for &(expected, stored) in &by_distance {
            assert!((expected - stored).abs() < 1e-5);
        }

        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in by_distance.windows(2) {
            assert!(pair[0].1 <= pair[1].1, "field not monotone in distance");
        }

        let max = by_distance.iter().map(|p| p.1).fold(0.0, f32::max);
        assert_eq!(grid.max_dist(), max);
    }

    #[test]
    fn segments_only_lower_values() {
        let mut grid = RegularGrid::new(10, 10, 20.0, 10.0).unwrap();
        let walls = [
            Segment::from_coords(2.0, 1.0, 2.0, 8.0),
            Segment::from_coords(4.0, 5.0, 18.0, 5.0),
        ];
        let mut footprints = vec![];
        let mut previous = grid.cells().clone();
        for wall in &walls {
            footprints.extend(grid.rasterise_segment(wall));
            grid.expand_function_distance(wall);
            for cell in grid.cells().coords() {
                assert!(grid.cells()[cell] <= previous[cell]);
            }
            previous = grid.cells().clone();
        }

        for cell in grid.cells().coords() {
            let expected = brute_force(&footprints, cell, 2.0, 1.0);
            assert!((expected - grid.cells()[cell]).abs() < 1e-5);
        }
    }

    #[test]
    fn segments_outside_grid_are_clipped() {
        let mut grid = RegularGrid::new(5, 5, 5.0, 5.0).unwrap();
        let footprint = grid.rasterise_segment(&Segment::from_coords(-3.0, 2.0, 8.0, 2.0));
        assert_eq!(footprint, (0..5).map(|x| LatticePoint::new(x, 2)).collect::<Vec<_>>());
    }

    #[test]
    fn huge_segments_are_clipped_before_rasterising() {
        let mut grid = RegularGrid::new(10, 10, 10.0, 10.0).unwrap();
        let row = |y| (0..10).map(|x| LatticePoint::new(x, y)).collect::<Vec<_>>();
        assert_eq!(
            grid.rasterise_segment(&Segment::from_coords(-3.0e9, 5.0, 3.0e9, 5.0)),
            row(5)
        );
        assert_eq!(grid.footprint(&Segment::from_coords(0.0, 0.0, 1.0e9, 0.0)), row(0));

        let diagonal = grid.footprint(&Segment::from_coords(-1.0e9, -1.0e9, 1.0e9, 1.0e9));
        assert_eq!(diagonal.first(), Some(&LatticePoint::new(0, 0)));
        assert_eq!(diagonal.last(), Some(&LatticePoint::new(9, 9)));
        assert_eq!(diagonal.len(), 10);
    }

    #[test]
    fn segments_missing_the_grid_leave_it_untouched() {
        let mut grid = RegularGrid::new(6, 6, 3.0, 3.0).unwrap();
        assert!(grid.rasterise_segment(&Segment::from_coords(4.0, 0.0, 9.0, 2.0)).is_empty());
        grid.add_segment(&Segment::from_coords(-5.0, -1.0, 8.0, -1.0));
        grid.add_segment(&Segment::from_coords(f32::NAN, 0.0, 1.0, 1.0));
        grid.add_segment(&Segment::from_coords(f32::NEG_INFINITY, 1.0, 1.0, 1.0));
        assert!(grid.cells().storage().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn failed_init_leaves_grid_empty() {
        let mut grid = RegularGrid::new(4, 4, 4.0, 4.0).unwrap();
        grid.add_segment(&Segment::from_coords(0.0, 0.0, 3.0, 0.0));
        assert!(grid.init(4, 4, 0.0, 4.0).is_err());
        assert!(grid.is_empty());
        assert_eq!(grid.max_dist(), 0.0);
        assert!(grid.find_path(Point2::new(1.5, 1.5), Point2::new(2.5, 2.5), 0.1).is_err());

        grid.init(2, 3, 2.0, 3.0).unwrap();
        assert_eq!((grid.res_x(), grid.res_y()), (2, 3));
    }

    #[test]
    fn boundary_covers_rim() {
        let mut grid = RegularGrid::new(8, 4, 4.0, 2.0).unwrap();
        for wall in grid.boundary_segments() {
            grid.add_segment(&wall);
        }
        for cell in grid.cells().coords() {
            let rim = cell.x == 0 || cell.y == 0 || cell.x == 7 || cell.y == 3;
            assert_eq!(grid.cells()[cell] == 0.0, rim, "{cell}");
        }
        assert_eq!(grid.max_dist(), 0.5);
    }

    #[test]
    fn reset_keeps_shape() {
        let mut grid = RegularGrid::new(6, 4, 3.0, 2.0).unwrap();
        grid.add_segment(&Segment::from_coords(0.0, 0.0, 2.5, 0.0));
        assert!(grid.max_dist() > 0.0);
        grid.reset();
        assert_eq!((grid.res_x(), grid.res_y(), grid.len_x()), (6, 4, 0.5));
        assert!(grid.cells().storage().iter().all(|d| d.is_infinite()));
        assert_eq!(grid.max_dist(), 0.0);
    }

    #[test]
    fn clear_releases_cells() {
        let mut grid = RegularGrid::new(3, 3, 3.0, 3.0).unwrap();
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!((grid.res_x(), grid.res_y()), (0, 0));
        assert_eq!(grid.cell_of(Point2::new(0.5, 0.5)), None);
    }
}
