//! # Smolgame
//!
//! A small tile-based exploration game core built around a random-walk dungeon generator.
//!
//! ## Architecture Overview
//!
//! The crate is split into a generation core and a thin game layer:
//!
//! - **Generation System**: a random walk places rooms on a coarse 15x9 grid, connectivity
//!   flags are derived for every occupied cell, and each cell is expanded into a 15x15 block
//!   of world tiles chosen from a template library
//! - **Game State**: player movement with collision checks, cooldown and viewport panning
//! - **Collaborators**: input, audio and rendering are traits implemented by the embedding
//!   engine, so the core never touches a window, a sound device or a keyboard directly

pub mod audio;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;

// Core module re-exports
pub use audio::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;

/// Core error type for the smolgame engine.
#[derive(thiserror::Error, Debug)]
pub enum SmolError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The room pool handed to the generator was empty
    #[error("Room pool is empty; at least one room is required")]
    EmptyRoomPool,

    /// The room pool cannot fit in the coarse grid
    #[error("Room pool of {rooms} rooms does not fit in a {width}x{height} grid")]
    RoomPoolTooLarge {
        rooms: usize,
        width: usize,
        height: usize,
    },

    /// A template resource could not be parsed
    #[error("Malformed template '{resource}' at line {line}: {message}")]
    MalformedTemplate {
        resource: String,
        line: usize,
        message: String,
    },

    /// Generation parameters are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl SmolError {
    /// Returns true for errors caused by bad input rather than by the generator itself.
    ///
    /// Configuration errors are always reported before any world state is produced.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SmolError::EmptyRoomPool
                | SmolError::RoomPoolTooLarge { .. }
                | SmolError::MalformedTemplate { .. }
                | SmolError::InvalidConfig(_)
        )
    }
}

/// Result type used throughout the smolgame codebase.
pub type SmolResult<T> = Result<T, SmolError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Width of the coarse room grid in cells
    pub const GRID_WIDTH: usize = 15;

    /// Height of the coarse room grid in cells
    pub const GRID_HEIGHT: usize = 9;

    /// Width and height of one room or hallway block in world tiles
    pub const CELL_TILES: usize = 15;

    /// Width of the level in world tiles
    pub const LEVEL_WIDTH: i32 = (GRID_WIDTH * CELL_TILES) as i32;

    /// Height of the level in world tiles
    pub const LEVEL_HEIGHT: i32 = (GRID_HEIGHT * CELL_TILES) as i32;

    /// Width of the visible screen in tiles
    pub const SCREEN_WIDTH: i32 = 16;

    /// Height of the visible screen in tiles
    pub const SCREEN_HEIGHT: i32 = 12;

    /// Ticks the player waits between two moves
    pub const PLAYER_COOLDOWN_TICKS: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_classification() {
        assert!(SmolError::EmptyRoomPool.is_configuration_error());
        assert!(SmolError::RoomPoolTooLarge {
            rooms: 200,
            width: 15,
            height: 9
        }
        .is_configuration_error());
        assert!(!SmolError::GenerationFailed("stuck".to_string()).is_configuration_error());
    }

    #[test]
    fn test_level_dimensions() {
        assert_eq!(config::LEVEL_WIDTH, 225);
        assert_eq!(config::LEVEL_HEIGHT, 135);
    }
}
