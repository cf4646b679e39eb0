//! # Level Generation
//!
//! Ties the generation stages together into a finished, owned level.
//!
//! A level is produced by:
//! 1. Validating the configuration (nothing is built if the room pool cannot fit)
//! 2. Walking the coarse grid to place rooms and carve corridors
//! 3. Resolving connectivity flags for every occupied cell
//! 4. Expanding each cell into world tiles from the template library
//! 5. Checking that every occupied cell is reachable from the first room

use crate::config::CELL_TILES;
use crate::game::Position;
use crate::generation::connectivity::{ConnectivityFlags, ConnectivityResolver};
use crate::generation::grid::{GridMap, GridPos};
use crate::generation::templates::TemplateLibrary;
use crate::generation::walk::WalkGenerator;
use crate::generation::world::{BuildStats, PlacedTile, WorldBuilder};
use crate::generation::{utils, GenerationConfig, Generator};
use crate::{SmolError, SmolResult};
use log::{debug, info, warn};
use pathfinding::prelude::bfs_reach;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Room payload stored on the coarse grid of a generated level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomSlot {
    /// Position of the room in the room pool, 0 for the first room placed
    pub order: usize,
    /// Name taken from the room pool
    pub name: String,
}

/// A fully generated level.
///
/// Owns the coarse grid and the placed tiles; handed to the game layer by value.
#[derive(Debug, Clone, Serialize)]
pub struct Level {
    /// Seed the level was generated from
    pub seed: u64,
    /// Coarse room grid
    pub grid: GridMap<RoomSlot>,
    /// Connectivity flags of every occupied cell
    #[serde(skip)]
    pub connectivity: BTreeMap<GridPos, ConnectivityFlags>,
    /// World tiles, in build order
    pub tiles: Vec<PlacedTile>,
    /// Counters from the world build
    pub stats: BuildStats,
    /// Where the player starts: the centre of the first room when it is floor
    pub player_spawn: Position,
    #[serde(skip)]
    tile_index: HashMap<Position, usize>,
}

impl Level {
    /// Assembles a level from its generated parts.
    pub fn new(
        seed: u64,
        grid: GridMap<RoomSlot>,
        connectivity: BTreeMap<GridPos, ConnectivityFlags>,
        tiles: Vec<PlacedTile>,
        stats: BuildStats,
    ) -> Self {
        let tile_index = tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (tile.position, index))
            .collect();

        let mut level = Self {
            seed,
            grid,
            connectivity,
            tiles,
            stats,
            player_spawn: Position::origin(),
            tile_index,
        };
        level.player_spawn = level.choose_spawn();
        level
    }

    /// Picks the spawn: the centre of the first room, else the first floor tile of that
    /// room's block, else the first floor tile anywhere.
    ///
    /// A first room built from the enclosed fallback has no floor, so the spawn moves out
    /// of it instead of failing the level.
    fn choose_spawn(&self) -> Position {
        let Some(cell) = self.first_room() else {
            return Position::origin();
        };
        let center = Self::cell_center(cell);
        if self.is_passable(center) {
            return center;
        }

        let block_origin = WorldBuilder::world_position(cell, 0, 0);
        let size = CELL_TILES as i32;
        let in_block = |pos: &Position| {
            (block_origin.x..block_origin.x + size).contains(&pos.x)
                && (block_origin.y..block_origin.y + size).contains(&pos.y)
        };
        let spawn = self
            .tiles
            .iter()
            .filter(|tile| tile.passable)
            .find(|tile| in_block(&tile.position))
            .or_else(|| self.tiles.iter().find(|tile| tile.passable))
            .map(|tile| tile.position);

        match spawn {
            Some(pos) => {
                debug!("First room centre {:?} is blocked; spawning at {:?}", center, pos);
                pos
            }
            None => {
                warn!("Level has no floor tiles; spawn stays at {:?}", center);
                center
            }
        }
    }

    fn first_room_cell(grid: &GridMap<RoomSlot>) -> Option<GridPos> {
        grid.rooms()
            .min_by_key(|(_, slot)| slot.order)
            .map(|(pos, _)| pos)
    }

    /// World position of the centre tile of a coarse cell.
    pub fn cell_center(cell: GridPos) -> Position {
        let half = CELL_TILES / 2;
        WorldBuilder::world_position(cell, half, half)
    }

    /// Coarse cell holding the first room placed.
    pub fn first_room(&self) -> Option<GridPos> {
        Self::first_room_cell(&self.grid)
    }

    /// Returns the tile at a world position, if one was placed there.
    pub fn tile_at(&self, pos: Position) -> Option<&PlacedTile> {
        self.tile_index.get(&pos).map(|&index| &self.tiles[index])
    }

    /// Checks whether a world position holds a passable tile.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.tile_at(pos).map(|tile| tile.passable).unwrap_or(false)
    }

    /// Passable tiles reachable from `start` through cardinal steps.
    pub fn reachable_tiles(&self, start: Position) -> HashSet<Position> {
        if !self.is_passable(start) {
            return HashSet::new();
        }
        bfs_reach(start, |&pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| self.is_passable(next))
                .collect::<Vec<_>>()
        })
        .collect()
    }
}

/// Level generator running the full walk, resolve and build pipeline.
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    /// Templates used to expand rooms and hallways
    pub templates: TemplateLibrary,
    /// Whether to reject levels with unreachable cells
    pub ensure_connectivity: bool,
}

impl LevelGenerator {
    /// Creates a level generator around a template library.
    pub fn new(templates: TemplateLibrary) -> Self {
        Self {
            templates,
            ensure_connectivity: true,
        }
    }

    /// Creates a level generator using the built-in templates.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{GenerationConfig, Generator, LevelGenerator};
    /// use smolgame::generation::utils;
    ///
    /// let generator = LevelGenerator::builtin().unwrap();
    /// let config = GenerationConfig::for_testing(7);
    /// let level = generator.generate(&config, &mut utils::create_rng(&config)).unwrap();
    /// assert_eq!(level.grid.room_count(), 3);
    /// ```
    pub fn builtin() -> SmolResult<Self> {
        Ok(Self::new(TemplateLibrary::builtin()?))
    }

    /// Checks that every occupied cell can be reached from the first room.
    fn validate_connectivity(&self, level: &Level) -> SmolResult<()> {
        if !self.ensure_connectivity {
            return Ok(());
        }

        let start = level.first_room().ok_or_else(|| {
            SmolError::GenerationFailed("Level has no rooms".to_string())
        })?;
        let reached = utils::reachable_cells(&level.connectivity, start);

        for (pos, _) in level.grid.occupied_cells() {
            if !reached.contains(&pos) {
                return Err(SmolError::GenerationFailed(format!(
                    "Cell {} is not connected to the first room",
                    pos
                )));
            }
        }

        Ok(())
    }
}

impl Generator<Level> for LevelGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> SmolResult<Level> {
        config.validate()?;

        let slots = config
            .room_pool
            .iter()
            .enumerate()
            .map(|(order, name)| RoomSlot {
                order,
                name: name.clone(),
            });
        let grid = WalkGenerator::from_config(config).walk(slots, rng)?;

        let connectivity = ConnectivityResolver::new().resolve(&grid);

        let mut tiles = Vec::with_capacity(grid.occupied_cells().count() * CELL_TILES * CELL_TILES);
        let stats = WorldBuilder::new(&self.templates).build(&grid, &connectivity, &mut tiles);

        let level = Level::new(config.seed, grid, connectivity, tiles, stats);
        self.validate(&level, config)?;

        info!(
            "Generated level with seed {}: {} rooms, {} corridor cells, {} tiles",
            config.seed,
            level.grid.room_count(),
            level.grid.corridor_count(),
            level.tiles.len()
        );
        Ok(level)
    }

    fn validate(&self, level: &Level, config: &GenerationConfig) -> SmolResult<()> {
        if level.grid.room_count() != config.room_pool.len() {
            return Err(SmolError::GenerationFailed(format!(
                "Expected {} rooms, found {}",
                config.room_pool.len(),
                level.grid.room_count()
            )));
        }

        self.validate_connectivity(level)?;

        if !level.is_passable(level.player_spawn) {
            warn!(
                "Player spawn {:?} is not on a floor tile ({} fallback templates)",
                level.player_spawn, level.stats.unmapped_templates
            );
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LevelGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::grid::CellKind;
    use crate::generation::templates::{TemplateName, TileKind};
    use crate::generation::StartCell;

    fn generate(config: &GenerationConfig) -> SmolResult<Level> {
        let generator = LevelGenerator::builtin()?;
        let mut rng = utils::create_rng(config);
        generator.generate(config, &mut rng)
    }

    #[test]
    fn test_level_generator_creation() {
        let generator = LevelGenerator::builtin().unwrap();
        assert!(generator.ensure_connectivity);
        assert_eq!(generator.generator_type(), "LevelGenerator");
    }

    #[test]
    fn test_generation_with_testing_config() {
        let config = GenerationConfig::for_testing(12345);
        let level = generate(&config).unwrap();

        assert_eq!(level.seed, 12345);
        assert_eq!(level.grid.room_count(), 3);
        assert_eq!(level.stats.unmapped_templates, 0);
        assert_eq!(
            level.stats.cells_built,
            level.grid.occupied_cells().count()
        );
        assert!(level.tiles.iter().any(|t| t.kind == TileKind::Floor));
    }

    #[test]
    fn test_single_room_level() {
        let mut config = GenerationConfig::for_testing(1);
        config.room_pool = vec!["A".to_string()];
        config.start = StartCell::Fixed { x: 4, y: 2 };

        let level = generate(&config).unwrap();
        assert_eq!(level.grid.room_count(), 1);
        assert_eq!(level.grid.corridor_count(), 0);
        assert_eq!(level.tiles.len(), 225);
        assert_eq!(level.player_spawn, Position::new(67, 37));
        assert!(level
            .tiles
            .iter()
            .all(|t| (60..75).contains(&t.position.x) && (30..45).contains(&t.position.y)));
    }

    #[test]
    fn test_spawn_is_in_first_room() {
        let config = GenerationConfig::for_testing(77);
        let level = generate(&config).unwrap();

        assert_eq!(level.first_room(), Some(GridPos::new(1, 1)));
        assert_eq!(level.player_spawn, Position::new(22, 22));
        assert!(level.is_passable(level.player_spawn));
    }

    #[test]
    fn test_oversized_pool_fails_before_building() {
        let mut config = GenerationConfig::for_testing(1);
        config.room_pool = GenerationConfig::numbered_rooms(200);
        let err = generate(&config).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_every_room_reachable_by_tiles() {
        let config = GenerationConfig::new(2024);
        let level = generate(&config).unwrap();
        let reachable = level.reachable_tiles(level.player_spawn);

        for (pos, _) in level.grid.rooms() {
            assert!(
                reachable.contains(&Level::cell_center(pos)),
                "room at {} unreachable",
                pos
            );
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let config = GenerationConfig::new(555);
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn test_disconnected_level_is_rejected() {
        let mut grid = GridMap::new();
        grid.place_room(
            0,
            0,
            RoomSlot {
                order: 0,
                name: "a".to_string(),
            },
        );
        grid.place_room(
            5,
            5,
            RoomSlot {
                order: 1,
                name: "b".to_string(),
            },
        );
        let library = TemplateLibrary::builtin().unwrap();
        let connectivity = ConnectivityResolver::new().resolve(&grid);
        let mut tiles = Vec::new();
        let stats = WorldBuilder::new(&library).build(&grid, &connectivity, &mut tiles);
        let level = Level::new(0, grid, connectivity, tiles, stats);

        let mut config = GenerationConfig::for_testing(0);
        config.room_pool = vec!["a".to_string(), "b".to_string()];

        let generator = LevelGenerator::new(library);
        let err = generator.validate(&level, &config).unwrap_err();
        assert!(matches!(err, SmolError::GenerationFailed(_)));
        assert_eq!(level.grid.at(GridPos::new(5, 5)).kind(), CellKind::Room);
    }

    #[test]
    fn test_tile_lookup() {
        let config = GenerationConfig::for_testing(3);
        let level = generate(&config).unwrap();

        let wall = level.tile_at(Position::new(15, 15)).unwrap();
        assert_eq!(wall.kind, TileKind::Wall);
        assert!(!level.is_passable(Position::new(15, 15)));
        assert!(level.tile_at(Position::new(-5, -5)).is_none());
    }

    fn block(center: &str) -> String {
        let mut rows = vec![vec!["F"; CELL_TILES]; CELL_TILES];
        rows[CELL_TILES / 2][CELL_TILES / 2] = center;
        rows.iter()
            .map(|row| row.join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn slot(order: usize) -> RoomSlot {
        RoomSlot {
            order,
            name: format!("room-{}", order),
        }
    }

    fn build_level(library: &TemplateLibrary, grid: GridMap<RoomSlot>) -> Level {
        let connectivity = ConnectivityResolver::new().resolve(&grid);
        let mut tiles = Vec::new();
        let stats = WorldBuilder::new(library).build(&grid, &connectivity, &mut tiles);
        Level::new(0, grid, connectivity, tiles, stats)
    }

    #[test]
    fn test_spawn_moves_off_a_blocked_centre() {
        let mut library = TemplateLibrary::new();
        let source = format!("variant,pillar,****\n{}", block("W"));
        library.insert_source(TemplateName::Room, "room", &source).unwrap();

        let mut grid = GridMap::new();
        grid.place_room(1, 1, slot(0));
        let level = build_level(&library, grid);

        assert!(!level.is_passable(Position::new(22, 22)));
        assert_eq!(level.player_spawn, Position::new(15, 15));
    }

    #[test]
    fn test_spawn_leaves_a_walled_in_first_room() {
        let mut library = TemplateLibrary::new();
        let closed = format!("variant,closed,0000\n{}", block("F"));
        let paved = format!("variant,paved,****\n{}", block("F"));
        library.insert_source(TemplateName::Room, "room", &closed).unwrap();
        library.insert_source(TemplateName::Hallway, "hallway", &paved).unwrap();

        let mut grid = GridMap::new();
        grid.place_room(1, 1, slot(0));
        grid.mark_corridor(2, 1);
        let level = build_level(&library, grid);

        assert_eq!(level.stats.unmapped_templates, 1);
        assert_eq!(level.player_spawn, Position::new(30, 15));
        assert!(level.is_passable(level.player_spawn));
    }

    #[test]
    fn test_fallback_first_room_still_generates() {
        let mut library = TemplateLibrary::builtin().unwrap();
        let closed = format!("variant,closed,0000\n{}", block("F"));
        library.insert_source(TemplateName::Room, "room", &closed).unwrap();

        let mut config = GenerationConfig::for_testing(2);
        config.room_pool = vec!["a".to_string(), "b".to_string()];
        let level = LevelGenerator::new(library)
            .generate(&config, &mut utils::create_rng(&config))
            .unwrap();

        assert_eq!(level.grid.room_count(), 2);
        assert!(level.stats.unmapped_templates > 0);
    }
}
