use clearpath_core::LatticePoint;
use clearpath_raster::segment_cells;

use crate::RegularGrid;

/// How far [`smooth`] looks ahead when pulling the path straight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Shortcut {
    /// From each waypoint, jump to the furthest later cell with a clear line to it.
    #[default]
    Furthest,
    /// From each waypoint, extend the line one cell at a time and stop at the first blocked one.
    FirstBlocked,
}

/// Whether every cell on the rasterised line from `from` to `to` fits an agent of radius
/// `clearance`.
///
/// A diagonal step along the line also needs both cells it passes between to fit, the same rule
/// [`neighbourhood`](crate::eight_connected::neighbourhood) applies, so the line cannot slip
/// through the diagonal gaps of a rasterised wall.
pub fn line_is_clear(
    grid: &RegularGrid,
    from: LatticePoint,
    to: LatticePoint,
    clearance: f32,
) -> bool {
    let passable = |cell| grid.is_passable(cell, clearance);
    let mut previous: Option<LatticePoint> = None;
    segment_cells(from, to).all(|cell| {
        let corners_clear = previous.map_or(true, |prev| {
            let (dx, dy) = (cell.x - prev.x, cell.y - prev.y);
            dx == 0 || dy == 0 || (passable(prev.offset(dx, 0)) && passable(prev.offset(0, dy)))
        });
        previous = Some(cell);
        corners_clear && passable(cell)
    })
}

/// Reduces a cell path to the waypoints needed to follow it with straight clear lines.
///
/// The first and last cells are always kept. Consecutive cells of an 8-connected path over
/// passable cells always have a clear line between them, so every leg of the result is clear.
pub fn smooth(
    grid: &RegularGrid,
    path: &[LatticePoint],
    clearance: f32,
    shortcut: Shortcut,
) -> Vec<LatticePoint> {
    let Some(&start) = path.first() else {
        return vec![];
    };
    let last = path.len() - 1;

    let mut smoothed = vec![start];
    let mut i = 0;
    while i < last {
        let anchor = path[i];
        let next = match shortcut {
            Shortcut::Furthest => (i + 2..=last)
                .rev()
                .find(|&j| line_is_clear(grid, anchor, path[j], clearance))
                .unwrap_or(i + 1),
            Shortcut::FirstBlocked => {
                let mut j = i + 1;
                while j < last && line_is_clear(grid, anchor, path[j + 1], clearance) {
                    j += 1;
                }
                j
            }
        };
        smoothed.push(path[next]);
        i = next;
    }
    smoothed
}
