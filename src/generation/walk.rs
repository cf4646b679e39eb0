//! # Random Walk Room Placement
//!
//! Places rooms on the coarse grid by walking a cursor around it. Every room after the
//! first is reached through a short run of corridor steps, so consecutive rooms are
//! always joined by a chain of adjacent occupied cells.

use crate::generation::grid::{Direction, GridMap, GridPos};
use crate::generation::{utils, GenerationConfig, Generator, StartCell};
use crate::{SmolError, SmolResult};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

/// Random-walk generator for the coarse room grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkGenerator {
    /// Where the cursor starts
    pub start: StartCell,
    /// Smallest corridor step budget between two rooms
    pub min_steps: u32,
    /// Largest corridor step budget between two rooms
    pub max_steps: u32,
    /// Hard cap on cursor moves for a whole walk
    pub max_walk_steps: u64,
}

impl WalkGenerator {
    /// Creates a walk generator with the given step budget range.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{StartCell, WalkGenerator};
    ///
    /// let walker = WalkGenerator::new(StartCell::Fixed { x: 1, y: 1 }, 1, 4);
    /// assert_eq!(walker.max_steps, 4);
    /// ```
    pub fn new(start: StartCell, min_steps: u32, max_steps: u32) -> Self {
        Self {
            start,
            min_steps,
            max_steps,
            max_walk_steps: GenerationConfig::DEFAULT_MAX_WALK_STEPS,
        }
    }

    /// Creates a walk generator from generation settings.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            start: config.start,
            min_steps: config.min_steps,
            max_steps: config.max_steps,
            max_walk_steps: config.max_walk_steps,
        }
    }

    /// Runs the walk, consuming the room pool in order.
    ///
    /// The pool is checked before the grid is touched: an empty pool or one with more
    /// rooms than the grid has cells is rejected with a configuration error.
    pub fn walk<R, I>(&self, pool: I, rng: &mut StdRng) -> SmolResult<GridMap<R>>
    where
        I: IntoIterator<Item = R>,
    {
        let mut pool: VecDeque<R> = pool.into_iter().collect();
        utils::check_room_pool(pool.len())?;
        if self.min_steps == 0 || self.min_steps > self.max_steps {
            return Err(SmolError::InvalidConfig(format!(
                "step budget range {}..={} is empty or allows zero steps",
                self.min_steps, self.max_steps
            )));
        }

        let mut grid = GridMap::new();
        let mut cursor = self.start_position(rng)?;
        let mut last_move: Option<Direction> = None;
        let mut total_moves: u64 = 0;

        while let Some(room) = pool.pop_front() {
            grid.place_room(cursor.x, cursor.y, room);
            debug!("Placed room at {} ({} left in pool)", cursor, pool.len());

            if pool.is_empty() {
                break;
            }

            let mut budget = rng.gen_range(self.min_steps..=self.max_steps);
            while budget > 0 {
                total_moves += 1;
                if total_moves > self.max_walk_steps {
                    return Err(SmolError::GenerationFailed(format!(
                        "walk exceeded {} moves with {} rooms still unplaced",
                        self.max_walk_steps,
                        pool.len()
                    )));
                }

                let direction = Self::choose_direction(last_move, rng);
                let (next, moved) = Self::step(cursor, direction);
                cursor = next;
                last_move = Some(moved);
                grid.mark_corridor(cursor.x, cursor.y);

                // The last step has to land somewhere a room can still go.
                if budget > 1 || !grid.at(cursor).is_room() {
                    budget -= 1;
                }
            }
        }

        debug!(
            "Walk finished after {} moves: {} rooms, {} corridor cells",
            total_moves,
            grid.room_count(),
            grid.corridor_count()
        );
        Ok(grid)
    }

    fn start_position(&self, rng: &mut StdRng) -> SmolResult<GridPos> {
        match self.start {
            StartCell::Fixed { x, y } => {
                if x >= GridMap::<()>::WIDTH || y >= GridMap::<()>::HEIGHT {
                    return Err(SmolError::InvalidConfig(format!(
                        "start cell ({}, {}) is outside the grid",
                        x, y
                    )));
                }
                Ok(GridPos::new(x, y))
            }
            StartCell::Random => Ok(GridPos::new(
                rng.gen_range(0..GridMap::<()>::WIDTH),
                rng.gen_range(0..GridMap::<()>::HEIGHT),
            )),
        }
    }

    /// Picks a direction uniformly, never undoing the previous move.
    fn choose_direction(last_move: Option<Direction>, rng: &mut StdRng) -> Direction {
        let forbidden = last_move.map(Direction::opposite);
        let candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| Some(*direction) != forbidden)
            .collect();
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Moves one cell, bouncing off the grid edge. Returns the new cursor and the
    /// direction actually taken.
    fn step(cursor: GridPos, direction: Direction) -> (GridPos, Direction) {
        match cursor.neighbor(direction) {
            Some(next) => (next, direction),
            None => {
                let reflected = direction.opposite();
                (cursor.neighbor(reflected).unwrap_or(cursor), reflected)
            }
        }
    }
}

impl Default for WalkGenerator {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl Generator<GridMap<String>> for WalkGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> SmolResult<GridMap<String>> {
        self.walk(config.room_pool.iter().cloned(), rng)
    }

    fn validate(&self, grid: &GridMap<String>, config: &GenerationConfig) -> SmolResult<()> {
        if grid.room_count() != config.room_pool.len() {
            return Err(SmolError::GenerationFailed(format!(
                "expected {} rooms on the grid, found {}",
                config.room_pool.len(),
                grid.room_count()
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "WalkGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::grid::CellKind;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn walker() -> WalkGenerator {
        WalkGenerator::new(StartCell::Fixed { x: 1, y: 1 }, 1, 4)
    }

    #[test]
    fn test_single_room_has_no_corridors() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = walker().walk(vec!["a"], &mut rng).unwrap();

        assert_eq!(grid.room_count(), 1);
        assert_eq!(grid.corridor_count(), 0);
        assert_eq!(grid.get(1, 1).payload(), Some(&"a"));
    }

    #[test]
    fn test_every_room_is_placed_once() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pool: Vec<u32> = (0..20).collect();
            let grid = walker().walk(pool, &mut rng).unwrap();

            let placed: Vec<u32> = grid.rooms().map(|(_, id)| *id).collect();
            let unique: HashSet<u32> = placed.iter().copied().collect();
            assert_eq!(placed.len(), 20, "seed {}", seed);
            assert_eq!(unique.len(), 20, "seed {}", seed);
        }
    }

    #[test]
    fn test_first_room_goes_to_start_cell() {
        let mut rng = StdRng::seed_from_u64(99);
        let grid = WalkGenerator::new(StartCell::Fixed { x: 14, y: 8 }, 1, 4)
            .walk(vec!["first", "second"], &mut rng)
            .unwrap();
        assert_eq!(grid.get(14, 8).payload(), Some(&"first"));
    }

    #[test]
    fn test_full_grid_pool_terminates() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool: Vec<usize> = (0..GridMap::<usize>::capacity()).collect();
        let grid = walker().walk(pool, &mut rng).unwrap();
        assert_eq!(grid.room_count(), 135);
        assert_eq!(grid.corridor_count(), 0);
    }

    #[test]
    fn test_pool_too_large_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool: Vec<usize> = (0..136).collect();
        let err = walker().walk(pool, &mut rng).unwrap_err();
        assert!(matches!(err, SmolError::RoomPoolTooLarge { rooms: 136, .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = walker().walk(Vec::<u8>::new(), &mut rng).unwrap_err();
        assert!(matches!(err, SmolError::EmptyRoomPool));
    }

    #[test]
    fn test_bad_start_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = WalkGenerator::new(StartCell::Fixed { x: 15, y: 0 }, 1, 4)
            .walk(vec![1], &mut rng)
            .unwrap_err();
        assert!(matches!(err, SmolError::InvalidConfig(_)));
    }

    #[test]
    fn test_step_cap_reports_failure() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut generator = walker();
        generator.max_walk_steps = 1;
        let err = generator.walk(vec![1, 2, 3], &mut rng).unwrap_err();
        assert!(matches!(err, SmolError::GenerationFailed(_)));
    }

    #[test]
    fn test_step_reflects_at_edges() {
        let (next, moved) = WalkGenerator::step(GridPos::new(0, 0), Direction::Left);
        assert_eq!(next, GridPos::new(1, 0));
        assert_eq!(moved, Direction::Right);

        let (next, moved) = WalkGenerator::step(GridPos::new(3, 8), Direction::Down);
        assert_eq!(next, GridPos::new(3, 7));
        assert_eq!(moved, Direction::Up);

        let (next, moved) = WalkGenerator::step(GridPos::new(3, 3), Direction::Up);
        assert_eq!(next, GridPos::new(3, 2));
        assert_eq!(moved, Direction::Up);
    }

    #[test]
    fn test_direction_never_backtracks() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            for last in Direction::ALL {
                let next = WalkGenerator::choose_direction(Some(last), &mut rng);
                assert_ne!(next, last.opposite());
            }
        }
    }

    #[test]
    fn test_all_directions_reachable() {
        let mut rng = StdRng::seed_from_u64(12);
        let seen: HashSet<Direction> = (0..200)
            .map(|_| WalkGenerator::choose_direction(None, &mut rng))
            .collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_walk_is_deterministic_per_seed() {
        let pool: Vec<u32> = (0..8).collect();
        let a = walker()
            .walk(pool.clone(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = walker().walk(pool, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_consecutive_rooms_are_joined() {
        let mut rng = StdRng::seed_from_u64(21);
        let grid = walker().walk((0..6).collect::<Vec<u32>>(), &mut rng).unwrap();

        // Every occupied cell except a lone room must have an occupied neighbour.
        for (pos, _) in grid.occupied_cells() {
            let has_neighbor = Direction::ALL
                .into_iter()
                .filter_map(|direction| pos.neighbor(direction))
                .any(|n| grid.at(n).kind() != CellKind::Empty);
            assert!(has_neighbor, "isolated cell at {}", pos);
        }
    }

    #[test]
    fn test_generator_trait_uses_config_pool() {
        let config = GenerationConfig::for_testing(17);
        let generator = WalkGenerator::from_config(&config);
        let mut rng = utils::create_rng(&config);

        let grid = generator.generate(&config, &mut rng).unwrap();
        assert!(generator.validate(&grid, &config).is_ok());
        assert_eq!(generator.generator_type(), "WalkGenerator");
    }
}
