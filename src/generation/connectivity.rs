//! # Connectivity Flags
//!
//! After the walk, every occupied cell records which of its four sides border another
//! occupied cell. Those flags pick the room and hallway templates.

use crate::generation::grid::{Direction, GridMap, GridPos};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

bitflags! {
    /// Sides of a cell that connect to an occupied neighbour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ConnectivityFlags: u8 {
        const UP    = 0b0001;
        const DOWN  = 0b0010;
        const LEFT  = 0b0100;
        const RIGHT = 0b1000;
    }
}

impl ConnectivityFlags {
    /// Builds flags from four booleans.
    pub fn from_sides(up: bool, down: bool, left: bool, right: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::UP, up);
        flags.set(Self::DOWN, down);
        flags.set(Self::LEFT, left);
        flags.set(Self::RIGHT, right);
        flags
    }

    /// Returns the flag for a single side.
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::UP,
            Direction::Down => Self::DOWN,
            Direction::Left => Self::LEFT,
            Direction::Right => Self::RIGHT,
        }
    }

    /// Checks whether the cell connects towards `direction`.
    pub fn connects(self, direction: Direction) -> bool {
        self.contains(Self::for_direction(direction))
    }

    pub fn connects_up(self) -> bool {
        self.contains(Self::UP)
    }

    pub fn connects_down(self) -> bool {
        self.contains(Self::DOWN)
    }

    pub fn connects_left(self) -> bool {
        self.contains(Self::LEFT)
    }

    pub fn connects_right(self) -> bool {
        self.contains(Self::RIGHT)
    }

    /// Number of connected sides.
    pub fn degree(self) -> u32 {
        self.bits().count_ones()
    }
}

/// Computes connectivity flags for every occupied cell of a finished grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectivityResolver;

impl ConnectivityResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Returns flags for every occupied cell, keyed and ordered by position.
    ///
    /// A side off the edge of the grid never connects.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{ConnectivityResolver, GridMap, GridPos};
    ///
    /// let mut grid = GridMap::new();
    /// grid.place_room(1, 1, "a");
    /// grid.place_room(1, 2, "b");
    ///
    /// let flags = ConnectivityResolver::new().resolve(&grid);
    /// assert!(flags[&GridPos::new(1, 1)].connects_down());
    /// assert!(flags[&GridPos::new(1, 2)].connects_up());
    /// ```
    pub fn resolve<R>(&self, grid: &GridMap<R>) -> BTreeMap<GridPos, ConnectivityFlags> {
        grid.occupied_cells()
            .map(|(pos, _)| (pos, Self::flags_at(grid, pos)))
            .collect()
    }

    /// Computes the flags of one cell from its neighbours.
    pub fn flags_at<R>(grid: &GridMap<R>, pos: GridPos) -> ConnectivityFlags {
        Direction::ALL
            .into_iter()
            .filter(|&direction| {
                pos.neighbor(direction)
                    .map(|neighbor| grid.at(neighbor).is_occupied())
                    .unwrap_or(false)
            })
            .fold(ConnectivityFlags::empty(), |flags, direction| {
                flags | ConnectivityFlags::for_direction(direction)
            })
    }
}
