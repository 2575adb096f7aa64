use std::fmt;

/// Integer 2D coordinate, used to address grid cells.
///
/// Points are ordered lexicographically: first by `x`, then by `y`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LatticePoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl LatticePoint {
    /// Creates a lattice point.
    pub const fn new(x: i32, y: i32) -> Self {
        LatticePoint { x, y }
    }

    /// Returns the point translated by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        LatticePoint {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for LatticePoint {
    fn from((x, y): (i32, i32)) -> Self {
        LatticePoint { x, y }
    }
}

impl From<LatticePoint> for (i32, i32) {
    fn from(p: LatticePoint) -> Self {
        (p.x, p.y)
    }
}

impl fmt::Display for LatticePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous 2D point in world units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2 {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point2 {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Point2 { x, y }
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A wall between two continuous points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub a: Point2,
    /// Second endpoint.
    pub b: Point2,
}

impl Segment {
    /// Creates a segment from its endpoints.
    pub const fn new(a: Point2, b: Point2) -> Self {
        Segment { a, b }
    }

    /// Creates a segment from raw coordinates.
    pub const fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Segment {
            a: Point2::new(x1, y1),
            b: Point2::new(x2, y2),
        }
    }

    /// Length of the segment.
    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }
}
