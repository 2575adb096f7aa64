use clearpath_core::LatticePoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shape {
    /// `ini == fin`.
    Point,
    Horizontal,
    Vertical,
    /// `|dy| < |dx|`, x drives.
    Shallow,
    /// `|dy| >= |dx|`, y drives.
    Steep,
}

/// Cursor over the cells of the digital line through two lattice points.
///
/// The line is traversed one cell per unit step along its driving axis (x when `|slope| < 1`,
/// y otherwise). The other coordinate follows the continuous line and is rounded half away from
/// zero, so a diagonal from `(0, 0)` to `(5, 5)` visits exactly the six diagonal cells.
///
/// The cursor lives on the infinite line through `ini` and `fin`: it may be stepped past either
/// end, in which case [`is_first`](Self::is_first) and [`is_last`](Self::is_last) are both false.
#[derive(Copy, Clone, Debug)]
pub struct RayRasterizer4Way {
    ini: LatticePoint,
    fin: LatticePoint,
    dx: i64,
    dy: i64,
    ix: i64,
    iy: i64,
    slope: f64,
    inv_slope: f64,
    shape: Shape,
    steps: i64,
    k: i64,
    first: bool,
    last: bool,
}

impl RayRasterizer4Way {
    pub fn new(ini: LatticePoint, fin: LatticePoint) -> Self {
        let dx = fin.x as i64 - ini.x as i64;
        let dy = fin.y as i64 - ini.y as i64;
        let shape = match (dx, dy) {
            (0, 0) => Shape::Point,
            (_, 0) => Shape::Horizontal,
            (0, _) => Shape::Vertical,
            _ if dy.abs() < dx.abs() => Shape::Shallow,
            _ => Shape::Steep,
        };
        // Vertical rays never read the slope, horizontal rays never read its inverse.
        let slope = if dx != 0 {
            dy as f64 / dx as f64
        } else {
            f64::INFINITY
        };
        let inv_slope = if dy != 0 {
            dx as f64 / dy as f64
        } else {
            f64::INFINITY
        };
        RayRasterizer4Way {
            ini,
            fin,
            dx,
            dy,
            ix: if dx < 0 { -1 } else { 1 },
            iy: if dy < 0 { -1 } else { 1 },
            slope,
            inv_slope,
            shape,
            steps: dx.abs().max(dy.abs()),
            k: 0,
            first: true,
            last: shape == Shape::Point,
        }
    }

    /// Reconfigures the cursor for the line from `ini` to `fin` and moves it to `ini`.
    pub fn init(&mut self, ini: LatticePoint, fin: LatticePoint) {
        *self = Self::new(ini, fin);
    }

    pub fn ini(&self) -> LatticePoint {
        self.ini
    }

    pub fn fin(&self) -> LatticePoint {
        self.fin
    }

    /// `dy / dx`, or `None` for vertical and degenerate rays.
    pub fn slope(&self) -> Option<f64> {
        (self.dx != 0).then_some(self.slope)
    }

    /// `dx / dy`, or `None` for horizontal and degenerate rays.
    pub fn inv_slope(&self) -> Option<f64> {
        (self.dy != 0).then_some(self.inv_slope)
    }

    /// Number of cells between `ini` and `fin`, both included.
    pub fn cell_count(&self) -> usize {
        self.steps as usize + 1
    }

    /// Continuous position of the cursor on the line.
    pub fn position(&self) -> (f64, f64) {
        let k = self.k as f64;
        let (x, y) = (self.ini.x as f64, self.ini.y as f64);
        match self.shape {
            Shape::Point => (x, y),
            Shape::Horizontal => (x + k * self.ix as f64, y),
            Shape::Vertical => (x, y + k * self.iy as f64),
            Shape::Shallow => (x + k * self.ix as f64, y + k * self.ix as f64 * self.slope),
            Shape::Steep => (x + k * self.iy as f64 * self.inv_slope, y + k * self.iy as f64),
        }
    }

    /// The cell under the cursor.
    pub fn current_cell(&self) -> LatticePoint {
        self.cell_at(self.k)
    }

    pub fn is_first(&self) -> bool {
        self.first
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    /// Steps the cursor one cell towards `fin`.
    pub fn advance(&mut self) {
        if self.shape != Shape::Point {
            self.k += 1;
        }
        self.update_flags();
    }

    /// Steps the cursor one cell towards `ini`.
    pub fn retreat(&mut self) {
        if self.shape != Shape::Point {
            self.k -= 1;
        }
        self.update_flags();
    }

    /// Returns the current cell, then advances.
    pub fn get_advance(&mut self) -> LatticePoint {
        let cell = self.current_cell();
        self.advance();
        cell
    }

    /// Returns the current cell, then retreats.
    pub fn get_retreat(&mut self) -> LatticePoint {
        let cell = self.current_cell();
        self.retreat();
        cell
    }

    /// Moves the cursor onto `p`.
    ///
    /// `p` must lie on the ray, see [`on_ray`](Self::on_ray). Only the driving coordinate of `p`
    /// is read, so passing a point off the ray places the cursor on the ray cell that shares it.
    #[cfg_attr(debug_assertions, track_caller)]
    pub fn place_at(&mut self, p: LatticePoint) {
        debug_assert!(self.on_ray(p), "{p} is not on the ray");
        self.k = self.step_of(p);
        self.update_flags();
    }

    /// Whether `p` is one of the cells of the infinite digital line through `ini` and `fin`.
    pub fn on_ray(&self, p: LatticePoint) -> bool {
        match self.shape {
            Shape::Point => p == self.ini,
            Shape::Horizontal => p.y == self.ini.y,
            Shape::Vertical => p.x == self.ini.x,
            Shape::Shallow | Shape::Steep => self.cell_at(self.step_of(p)) == p,
        }
    }

    /// Iterator over the cells from the cursor up to and including `fin`.
    ///
    /// Starting from a fresh cursor this yields the whole segment `ini..=fin`.
    pub fn cells(self) -> RayCells {
        RayCells {
            done: self.k > self.steps,
            ray: self,
        }
    }

    fn step_of(&self, p: LatticePoint) -> i64 {
        match self.shape {
            Shape::Point => 0,
            Shape::Horizontal | Shape::Shallow => (p.x as i64 - self.ini.x as i64) * self.ix,
            Shape::Vertical | Shape::Steep => (p.y as i64 - self.ini.y as i64) * self.iy,
        }
    }

    fn cell_at(&self, k: i64) -> LatticePoint {
        let (ox, oy) = match self.shape {
            Shape::Point => (0, 0),
            Shape::Horizontal => (k * self.ix, 0),
            Shape::Vertical => (0, k * self.iy),
            Shape::Shallow => (k * self.ix, div_round_half_away(k, self.dy, self.dx.abs())),
            Shape::Steep => (div_round_half_away(k, self.dx, self.dy.abs()), k * self.iy),
        };
        LatticePoint::new(
            (self.ini.x as i64 + ox) as i32,
            (self.ini.y as i64 + oy) as i32,
        )
    }

    fn update_flags(&mut self) {
        self.first = self.k == 0;
        self.last = self.k == self.steps;
    }
}

/// Rounds `k * d / den` half away from zero, exactly. `den` must be positive.
fn div_round_half_away(k: i64, d: i64, den: i64) -> i64 {
    let (num, den) = (k as i128 * d as i128, den as i128);
    let q = (2 * num.abs() + den) / (2 * den);
    (q * num.signum()) as i64
}

/// Iterator returned by [`RayRasterizer4Way::cells`].
pub struct RayCells {
    ray: RayRasterizer4Way,
    done: bool,
}

impl Iterator for RayCells {
    type Item = LatticePoint;

    fn next(&mut self) -> Option<LatticePoint> {
        if self.done {
            return None;
        }
        self.done = self.ray.is_last();
        Some(self.ray.get_advance())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.done {
            0
        } else {
            (self.ray.steps - self.ray.k + 1).max(0) as usize
        };
        (remaining, Some(remaining))
    }
}

/// Cells of the segment from `ini` to `fin`, both included, in traversal order.
pub fn segment_cells(ini: LatticePoint, fin: LatticePoint) -> RayCells {
    RayRasterizer4Way::new(ini, fin).cells()
}
