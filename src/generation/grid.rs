//! # Coarse Room Grid
//!
//! The 15x9 room-graph grid the random walk operates on. Each cell is empty, part of a
//! corridor, or a room carrying its payload.

use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Classification of a coarse grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Room,
    Corridor,
}

/// One cell of the coarse grid.
///
/// The room payload only exists on `Room` cells, so a payload can never be attached to an
/// empty or corridor cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridCell<R> {
    Empty,
    Corridor,
    Room(R),
}

impl<R> GridCell<R> {
    /// Returns the kind of this cell.
    pub fn kind(&self) -> CellKind {
        match self {
            GridCell::Empty => CellKind::Empty,
            GridCell::Corridor => CellKind::Corridor,
            GridCell::Room(_) => CellKind::Room,
        }
    }

    /// Returns the room payload, if this is a room cell.
    pub fn payload(&self) -> Option<&R> {
        match self {
            GridCell::Room(payload) => Some(payload),
            _ => None,
        }
    }

    /// Checks whether the cell is a room or corridor.
    pub fn is_occupied(&self) -> bool {
        !matches!(self, GridCell::Empty)
    }

    /// Checks whether the cell holds a room.
    pub fn is_room(&self) -> bool {
        matches!(self, GridCell::Room(_))
    }
}

impl<R> Default for GridCell<R> {
    fn default() -> Self {
        GridCell::Empty
    }
}

/// Cardinal directions on the coarse grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in the order used by connectivity flags.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Converts a direction to a `(dx, dy)` delta. Up is towards y = 0.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Coordinates of a coarse grid cell.
///
/// Ordering is x-major, which gives the column-by-column iteration order used when the
/// world is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    /// Creates a new grid position.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring cell in `direction`, or `None` if it is off the grid.
    pub fn neighbor(self, direction: Direction) -> Option<GridPos> {
        let (dx, dy) = direction.delta();
        let x = self.x as i32 + dx;
        let y = self.y as i32 + dy;
        if GridMap::<()>::in_bounds(x, y) {
            Some(GridPos::new(x as usize, y as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The fixed-size coarse grid.
///
/// Access is bounds-checked and panics outside `[0, WIDTH) x [0, HEIGHT)`; callers are
/// expected to keep their coordinates in range. Deserializing rejects a cell list of
/// any other length than `WIDTH * HEIGHT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridMap<R> {
    cells: Vec<GridCell<R>>,
}

impl<'de, R: Deserialize<'de>> Deserialize<'de> for GridMap<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Cells<T> {
            cells: Vec<GridCell<T>>,
        }

        let Cells { cells } = Cells::deserialize(deserializer)?;
        if cells.len() != Self::capacity() {
            return Err(D::Error::invalid_length(
                cells.len(),
                &"a 15x9 grid of cells",
            ));
        }
        Ok(Self { cells })
    }
}

impl<R> GridMap<R> {
    pub const WIDTH: usize = GRID_WIDTH;
    pub const HEIGHT: usize = GRID_HEIGHT;

    /// Creates a grid with every cell empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{CellKind, GridMap};
    ///
    /// let grid: GridMap<u32> = GridMap::new();
    /// assert_eq!(grid.get(0, 0).kind(), CellKind::Empty);
    /// assert_eq!(grid.occupied_cells().count(), 0);
    /// ```
    pub fn new() -> Self {
        let mut cells = Vec::with_capacity(Self::WIDTH * Self::HEIGHT);
        cells.resize_with(Self::WIDTH * Self::HEIGHT, GridCell::default);
        Self { cells }
    }

    /// Total number of cells in the grid.
    pub fn capacity() -> usize {
        Self::WIDTH * Self::HEIGHT
    }

    /// Checks whether signed coordinates fall inside the grid.
    pub fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < Self::WIDTH && (y as usize) < Self::HEIGHT
    }

    fn index(x: usize, y: usize) -> usize {
        assert!(
            x < Self::WIDTH && y < Self::HEIGHT,
            "grid access out of bounds: ({}, {}) outside {}x{}",
            x,
            y,
            Self::WIDTH,
            Self::HEIGHT
        );
        y * Self::WIDTH + x
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn get(&self, x: usize, y: usize) -> &GridCell<R> {
        &self.cells[Self::index(x, y)]
    }

    /// Replaces the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn set(&mut self, x: usize, y: usize, cell: GridCell<R>) {
        let index = Self::index(x, y);
        self.cells[index] = cell;
    }

    /// Returns the cell at a grid position.
    pub fn at(&self, pos: GridPos) -> &GridCell<R> {
        self.get(pos.x, pos.y)
    }

    /// Places a room at `(x, y)`, replacing an empty or corridor cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell already holds a room; room payloads are assigned once.
    pub fn place_room(&mut self, x: usize, y: usize, payload: R) {
        let index = Self::index(x, y);
        assert!(
            !self.cells[index].is_room(),
            "cell ({}, {}) already holds a room",
            x,
            y
        );
        self.cells[index] = GridCell::Room(payload);
    }

    /// Marks an empty cell as corridor. Returns true if the cell changed.
    pub fn mark_corridor(&mut self, x: usize, y: usize) -> bool {
        let index = Self::index(x, y);
        if self.cells[index].is_occupied() {
            return false;
        }
        self.cells[index] = GridCell::Corridor;
        true
    }

    /// Iterates over occupied cells, x outer and y inner, low to high.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (GridPos, &GridCell<R>)> + '_ {
        (0..Self::WIDTH).flat_map(move |x| {
            (0..Self::HEIGHT).filter_map(move |y| {
                let cell = self.get(x, y);
                cell.is_occupied().then_some((GridPos::new(x, y), cell))
            })
        })
    }

    /// Iterates over room cells and their payloads in the same order as `occupied_cells`.
    pub fn rooms(&self) -> impl Iterator<Item = (GridPos, &R)> + '_ {
        self.occupied_cells()
            .filter_map(|(pos, cell)| cell.payload().map(|payload| (pos, payload)))
    }

    /// Number of room cells.
    pub fn room_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_room()).count()
    }

    /// Number of corridor cells.
    pub fn corridor_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.kind() == CellKind::Corridor)
            .count()
    }
}

impl<R> Default for GridMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// ASCII rendering: `#` room, `+` corridor, `.` empty; one line per row.
impl<R> fmt::Display for GridMap<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..Self::HEIGHT {
            let row: String = (0..Self::WIDTH)
                .map(|x| match self.get(x, y).kind() {
                    CellKind::Room => '#',
                    CellKind::Corridor => '+',
                    CellKind::Empty => '.',
                })
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
