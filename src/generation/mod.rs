//! # Generation Module
//!
//! Procedural level generation: a random walk over a coarse room grid, connectivity
//! flags for every occupied cell, and template-driven expansion into world tiles.
//!
//! The pipeline is `WalkGenerator` -> `ConnectivityResolver` -> `WorldBuilder`, tied
//! together by `LevelGenerator`, which produces an owned `Level`.

pub mod connectivity;
pub mod dungeon;
pub mod grid;
pub mod templates;
pub mod walk;
pub mod world;

pub use connectivity::*;
pub use dungeon::*;
pub use grid::*;
pub use templates::*;
pub use walk::*;
pub use world::*;

use crate::{SmolError, SmolResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the walk cursor starts on the coarse grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StartCell {
    /// A seeded random cell
    Random,
    /// A fixed cell
    Fixed { x: usize, y: usize },
}

/// Configuration for level generation.
///
/// Controls the room pool, where the walk starts, and how long the corridor runs
/// between consecutive rooms are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Rooms to place, in placement order
    pub room_pool: Vec<String>,
    /// Where the first room goes
    pub start: StartCell,
    /// Minimum corridor steps between two rooms
    pub min_steps: u32,
    /// Maximum corridor steps between two rooms
    pub max_steps: u32,
    /// Hard cap on walk moves before generation gives up
    pub max_walk_steps: u64,
}

impl GenerationConfig {
    pub const DEFAULT_MAX_WALK_STEPS: u64 = 1_000_000;

    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.room_pool.len(), 5);
    /// assert!(config.min_steps <= config.max_steps);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            room_pool: Self::numbered_rooms(5),
            start: StartCell::Random,
            min_steps: 1,
            max_steps: 4,
            max_walk_steps: Self::DEFAULT_MAX_WALK_STEPS,
        }
    }

    /// Creates a configuration for testing with a small pool and a fixed start.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            room_pool: Self::numbered_rooms(3),
            start: StartCell::Fixed { x: 1, y: 1 },
            min_steps: 1,
            max_steps: 4,
            max_walk_steps: 10_000,
        }
    }

    /// Builds a pool of `count` rooms named `room-1`, `room-2`, ...
    pub fn numbered_rooms(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("room-{}", i)).collect()
    }

    /// Reads a configuration from a JSON file and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> SmolResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can produce a level.
    pub fn validate(&self) -> SmolResult<()> {
        utils::check_room_pool(self.room_pool.len())?;
        if self.min_steps == 0 {
            return Err(SmolError::InvalidConfig(
                "min_steps must be at least 1".to_string(),
            ));
        }
        if self.min_steps > self.max_steps {
            return Err(SmolError::InvalidConfig(format!(
                "min_steps ({}) exceeds max_steps ({})",
                self.min_steps, self.max_steps
            )));
        }
        if self.max_walk_steps == 0 {
            return Err(SmolError::InvalidConfig(
                "max_walk_steps must be positive".to_string(),
            ));
        }
        if let StartCell::Fixed { x, y } = self.start {
            if x >= GridMap::<()>::WIDTH || y >= GridMap::<()>::HEIGHT {
                return Err(SmolError::InvalidConfig(format!(
                    "start cell ({}, {}) is outside the {}x{} grid",
                    x,
                    y,
                    GridMap::<()>::WIDTH,
                    GridMap::<()>::HEIGHT
                )));
            }
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Every stage that can run from a `GenerationConfig` implements this trait, which keeps
/// logging and validation uniform across the pipeline.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> SmolResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> SmolResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::generation::connectivity::ConnectivityFlags;
    use pathfinding::prelude::bfs_reach;
    use std::collections::{BTreeMap, HashSet};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Rejects room pools that are empty or larger than the grid.
    pub fn check_room_pool(rooms: usize) -> SmolResult<()> {
        if rooms == 0 {
            return Err(SmolError::EmptyRoomPool);
        }
        if rooms > GridMap::<()>::capacity() {
            return Err(SmolError::RoomPoolTooLarge {
                rooms,
                width: GridMap::<()>::WIDTH,
                height: GridMap::<()>::HEIGHT,
            });
        }
        Ok(())
    }

    /// Cells reachable from `start` by crossing connected sides.
    pub fn reachable_cells(
        connectivity: &BTreeMap<GridPos, ConnectivityFlags>,
        start: GridPos,
    ) -> HashSet<GridPos> {
        bfs_reach(start, |&pos| {
            let flags = connectivity
                .get(&pos)
                .copied()
                .unwrap_or(ConnectivityFlags::empty());
            Direction::ALL
                .into_iter()
                .filter(move |&direction| flags.connects(direction))
                .filter_map(move |direction| pos.neighbor(direction))
                .collect::<Vec<_>>()
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.start, StartCell::Random);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config_is_valid() {
        let config = GenerationConfig::for_testing(1);
        assert_eq!(config.room_pool, vec!["room-1", "room-2", "room-3"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let mut config = GenerationConfig::new(1);
        config.room_pool.clear();
        assert!(matches!(config.validate(), Err(SmolError::EmptyRoomPool)));

        let mut config = GenerationConfig::new(1);
        config.room_pool = GenerationConfig::numbered_rooms(136);
        assert!(matches!(
            config.validate(),
            Err(SmolError::RoomPoolTooLarge { rooms: 136, .. })
        ));

        let mut config = GenerationConfig::new(1);
        config.min_steps = 5;
        assert!(matches!(config.validate(), Err(SmolError::InvalidConfig(_))));

        let mut config = GenerationConfig::new(1);
        config.min_steps = 0;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::new(1);
        config.start = StartCell::Fixed { x: 0, y: 9 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"seed": 9, "room_pool": ["hall", "vault"], "start": {{"mode": "fixed", "x": 3, "y": 4}}}}"#
        )
        .unwrap();

        let config = GenerationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.room_pool, vec!["hall", "vault"]);
        assert_eq!(config.start, StartCell::Fixed { x: 3, y: 4 });
        // Unspecified fields keep their defaults.
        assert_eq!(config.max_steps, 4);
    }

    #[test]
    fn test_config_from_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = GenerationConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, SmolError::Serde(_)));
    }

    #[test]
    fn test_config_missing_file() {
        let err = GenerationConfig::from_json_file("/nonexistent/smolgame.json").unwrap_err();
        assert!(matches!(err, SmolError::Io(_)));
    }

    #[test]
    fn test_utils_rng_is_seeded() {
        use rand::Rng;
        let config = GenerationConfig::new(12345);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reachable_cells_follow_flags() {
        let mut grid = GridMap::new();
        grid.place_room(1, 1, 'a');
        grid.mark_corridor(2, 1);
        grid.place_room(2, 2, 'b');
        grid.place_room(10, 5, 'c');

        let connectivity = ConnectivityResolver::new().resolve(&grid);
        let reached = utils::reachable_cells(&connectivity, GridPos::new(1, 1));
        assert_eq!(reached.len(), 3);
        assert!(reached.contains(&GridPos::new(2, 2)));
        assert!(!reached.contains(&GridPos::new(10, 5)));
    }
}
