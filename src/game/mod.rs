//! # Game Module
//!
//! World-space coordinates, entities and the game state that drives player movement.
//!
//! This module sits on top of the generation core:
//! - World-space positions shared by placed tiles and entities
//! - Entities tagged with an explicit kind and a capability set
//! - Game state owning the generated level, the player and the viewport

pub mod entities;
pub mod state;

pub use entities::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate in world tiles.
///
/// # Examples
///
/// ```
/// use smolgame::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Checks whether the position lies inside the generated level.
    pub fn is_within_level(self) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < crate::config::LEVEL_WIDTH
            && self.y < crate::config::LEVEL_HEIGHT
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}
