//! # Game State Module
//!
//! Owns a generated level, the player and the viewport, and advances them one tick at a
//! time from the current input state.
//!
//! Movement rules:
//! - the level edge and walls block movement and play the collide cue
//! - tiles with nothing placed on them are solid rock and block too
//! - a diagonal step may not squeeze between two blocking tiles

use crate::audio::{AudioSink, SoundCue};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::game::{Entity, Player, Position};
use crate::generation::Level;
use crate::input::{InputState, Key};
use log::{debug, trace};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing moved
    Idle,
    /// The player is cooling down from the last move
    CoolingDown,
    /// The player moved to the given position
    Moved(Position),
    /// The player tried to move and was stopped
    Blocked,
    /// Quit was requested
    Quit,
}

/// Central game state for a single level.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The generated level
    pub level: Level,
    /// The player character
    pub player: Player,
    /// Offset added to world positions to get screen positions
    pub viewport_offset: Position,
    /// Ticks processed so far
    pub turn_number: u64,
}

impl GameState {
    /// Creates a game state with the player at the level's spawn point, centred on screen.
    pub fn new_with_level(level: Level) -> Self {
        let spawn = level.player_spawn;
        let player = Player::new("Player".to_string(), spawn);
        let viewport_offset = Position::new(SCREEN_WIDTH / 2 - spawn.x, SCREEN_HEIGHT / 2 - spawn.y);

        Self {
            level,
            player,
            viewport_offset,
            turn_number: 0,
        }
    }

    /// Checks whether the tile at `pos` stops movement.
    fn blocks(&self, pos: Position) -> bool {
        match self.level.tile_at(pos) {
            Some(tile) => tile.blocks_movement(),
            None => true,
        }
    }

    /// Decides whether an entity at `from` may move by `delta`.
    ///
    /// Blocked moves play the collide cue on its channel.
    pub fn can_go(&self, from: Position, delta: Position, audio: &mut dyn AudioSink) -> bool {
        let target = from + delta;

        let allowed = if !target.is_within_level() || self.blocks(target) {
            false
        } else if delta.x != 0 && delta.y != 0 {
            let beside = Position::new(from.x + delta.x, from.y);
            let below = Position::new(from.x, from.y + delta.y);
            !(self.blocks(beside) && self.blocks(below))
        } else {
            true
        };

        if !allowed {
            trace!("Move from {:?} by {:?} blocked", from, delta);
            audio.play(SoundCue::Collide, SoundCue::Collide.channel());
        }
        allowed
    }

    /// Advances the game by one tick.
    pub fn tick(&mut self, input: &dyn InputState, audio: &mut dyn AudioSink) -> TickOutcome {
        self.turn_number += 1;

        if input.is_down(Key::Quit) {
            return TickOutcome::Quit;
        }
        if input.is_down(Key::Action) {
            audio.play(SoundCue::Level, SoundCue::Level.channel());
        }

        if !self.player.tick_cooldown() {
            return TickOutcome::CoolingDown;
        }

        let delta = input.movement();
        if delta == Position::origin() {
            return TickOutcome::Idle;
        }

        if !self.can_go(self.player.position, delta, audio) {
            return TickOutcome::Blocked;
        }

        self.player.step(delta);
        self.viewport_offset = self.viewport_offset - delta;
        debug!("Player moved to {:?}", self.player.position);
        TickOutcome::Moved(self.player.position)
    }

    /// Converts a world position to screen coordinates.
    pub fn to_screen(&self, world: Position) -> Position {
        world + self.viewport_offset
    }

    /// Converts screen coordinates to a world position.
    pub fn to_world(&self, screen: Position) -> Position {
        screen - self.viewport_offset
    }

    /// Checks whether a world position falls inside the visible screen.
    pub fn is_on_screen(&self, world: Position) -> bool {
        let screen = self.to_screen(world);
        screen.x >= 0 && screen.x < SCREEN_WIDTH && screen.y >= 0 && screen.y < SCREEN_HEIGHT
    }
}
