use clearpath_core::LatticePoint;

/// Dense row-major 2D array.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Box<[T]>,
}

impl<T> Grid<T> {
    #[track_caller]
    pub fn new(width: i32, height: i32, mut f: impl FnMut(i32, i32) -> T) -> Self {
        assert!(width >= 0, "width must be non-negative");
        assert!(height >= 0, "height must be non-negative");
        let cells = (0..height)
            .flat_map(move |y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Grid {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn storage(&self) -> &[T] {
        &self.cells
    }

    pub fn storage_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    #[inline(always)]
    pub fn contains(&self, cell: LatticePoint) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    #[inline(always)]
    pub fn get(&self, cell: LatticePoint) -> Option<&T> {
        self.contains(cell).then(|| &self.cells[self.index(cell)])
    }

    #[inline(always)]
    pub fn get_mut(&mut self, cell: LatticePoint) -> Option<&mut T> {
        if self.contains(cell) {
            let index = self.index(cell);
            Some(&mut self.cells[index])
        } else {
            None
        }
    }

    /// Coordinates of every cell in storage order.
    pub fn coords(&self) -> impl Iterator<Item = LatticePoint> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| LatticePoint::new(x, y)))
    }

    #[inline(always)]
    fn index(&self, cell: LatticePoint) -> usize {
        self.width as usize * cell.y as usize + cell.x as usize
    }

    #[track_caller]
    #[inline(always)]
    fn bounds_check(&self, cell: LatticePoint) {
        assert!(cell.x >= 0, "x out of bounds");
        assert!(cell.y >= 0, "y out of bounds");
        assert!(cell.x < self.width, "x out of bounds");
        assert!(cell.y < self.height, "y out of bounds");
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: i32, height: i32, value: T) -> Self {
        Grid::new(width, height, |_, _| value.clone())
    }
}

impl<T> std::ops::Index<LatticePoint> for Grid<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, cell: LatticePoint) -> &T {
        self.bounds_check(cell);
        &self.cells[self.index(cell)]
    }
}

impl<T> std::ops::IndexMut<LatticePoint> for Grid<T> {
    #[track_caller]
    fn index_mut(&mut self, cell: LatticePoint) -> &mut T {
        self.bounds_check(cell);
        let index = self.index(cell);
        &mut self.cells[index]
    }
}

impl<T> std::ops::Index<(i32, i32)> for Grid<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, cell: (i32, i32)) -> &T {
        &self[LatticePoint::from(cell)]
    }
}

impl<T> std::ops::IndexMut<(i32, i32)> for Grid<T> {
    #[track_caller]
    fn index_mut(&mut self, cell: (i32, i32)) -> &mut T {
        &mut self[LatticePoint::from(cell)]
    }
}
