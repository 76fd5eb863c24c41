use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridCoord {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Handle stored in an occupied cell: the slot of the component in the
/// simulation's component list plus its stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub slot: usize,
    pub component_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {0} is outside the reactor grid")]
    OutOfBounds(GridCoord),
}

const CARDINAL_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactorGrid {
    pub width: usize,
    pub height: usize,
    pub layers: usize,
    cells: Vec<Option<GridCell>>,
}

impl ReactorGrid {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let layers = layers.max(1);
        Self {
            width,
            height,
            layers,
            cells: vec![None; width * height * layers],
        }
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x < self.width && coord.y < self.height && coord.z < self.layers
    }

    pub fn get(&self, coord: GridCoord) -> Option<GridCell> {
        let index = self.index(coord)?;
        self.cells[index]
    }

    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some()
    }

    pub fn set(&mut self, coord: GridCoord, cell: Option<GridCell>) -> Result<(), GridError> {
        let index = self.index(coord).ok_or(GridError::OutOfBounds(coord))?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn place(&mut self, coord: GridCoord, cell: GridCell) -> Result<(), GridError> {
        self.set(coord, Some(cell))
    }

    pub fn clear(&mut self, coord: GridCoord) -> Result<(), GridError> {
        self.set(coord, None)
    }

    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Occupied cells in row-major (z, y, x) order.
    pub fn occupied(&self) -> impl Iterator<Item = (GridCoord, GridCell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.map(|cell| (self.coord_of(index), cell)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Up to four in-bounds neighbors on the same layer, ordered -x, +x, -y, +y.
    pub fn cardinal_neighbors(&self, coord: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        CARDINAL_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(coord, dx, dy))
    }

    /// Cells within Manhattan distance `radius` (a diamond), excluding `coord`.
    pub fn manhattan_neighbors(
        &self,
        coord: GridCoord,
        radius: usize,
    ) -> impl Iterator<Item = GridCoord> + '_ {
        let r = radius as isize;
        (-r..=r)
            .flat_map(move |dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(move |&(dx, dy)| (dx, dy) != (0, 0) && dx.abs() + dy.abs() <= r)
            .filter_map(move |(dx, dy)| self.offset(coord, dx, dy))
    }

    /// Every other cell in the same row and column of `coord`'s layer.
    pub fn row_and_column(&self, coord: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        let row = (0..self.width)
            .filter(move |&x| x != coord.x)
            .map(move |x| GridCoord::new(x, coord.y, coord.z));
        let column = (0..self.height)
            .filter(move |&y| y != coord.y)
            .map(move |y| GridCoord::new(coord.x, y, coord.z));
        row.chain(column)
    }

    /// Number of occupied cells in the square of half-width `radius` centred on
    /// `coord` (the centre included).
    pub fn occupied_within_square(&self, coord: GridCoord, radius: usize) -> usize {
        let r = radius as isize;
        let centre = usize::from(self.is_occupied(coord));
        let around = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .filter_map(|(dx, dy)| self.offset(coord, dx, dy))
            .filter(|&neighbor| self.is_occupied(neighbor))
            .count();
        centre + around
    }

    /// Resizes every layer to `new_width` x `new_height`, keeping cells in the
    /// overlapping region at their (x, y). Cells that fall outside the new
    /// bounds are returned.
    pub fn resize(&mut self, new_width: usize, new_height: usize) -> Vec<(GridCoord, GridCell)> {
        let new_width = new_width.max(1);
        let new_height = new_height.max(1);
        if new_width == self.width && new_height == self.height {
            return Vec::new();
        }

        let mut cells = vec![None; new_width * new_height * self.layers];
        let mut evicted = Vec::new();
        for (coord, cell) in self.occupied() {
            if coord.x < new_width && coord.y < new_height {
                cells[(coord.z * new_height + coord.y) * new_width + coord.x] = Some(cell);
            } else {
                evicted.push((coord, cell));
            }
        }

        self.width = new_width;
        self.height = new_height;
        self.cells = cells;
        evicted
    }

    fn offset(&self, coord: GridCoord, dx: isize, dy: isize) -> Option<GridCoord> {
        let x = coord.x.checked_add_signed(dx)?;
        let y = coord.y.checked_add_signed(dy)?;
        let next = GridCoord::new(x, y, coord.z);
        self.in_bounds(next).then_some(next)
    }

    fn coord_of(&self, index: usize) -> GridCoord {
        let x = index % self.width;
        let y = (index / self.width) % self.height;
        let z = index / (self.width * self.height);
        GridCoord::new(x, y, z)
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some((coord.z * self.height + coord.y) * self.width + coord.x)
    }
}
