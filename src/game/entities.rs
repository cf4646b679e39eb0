//! # Entities
//!
//! Things that live in the world. Each carries an explicit kind tag and a capability set
//! instead of being told apart by type.

use crate::config::PLAYER_COOLDOWN_TICKS;
use crate::game::Position;
use crate::generation::{PlacedTile, TileKind};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// What the game loop may do with an entity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        /// Drawn every frame
        const RENDERABLE = 0b001;
        /// Advanced every tick
        const UPDATABLE  = 0b010;
        /// Blocks movement onto its tile
        const COLLIDABLE = 0b100;
    }
}

/// Kind tag for every entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Wall,
    Floor,
}

impl EntityKind {
    /// Capabilities shared by all entities of this kind.
    pub fn capabilities(self) -> Capabilities {
        match self {
            EntityKind::Player => Capabilities::RENDERABLE | Capabilities::UPDATABLE,
            EntityKind::Wall => Capabilities::RENDERABLE | Capabilities::COLLIDABLE,
            EntityKind::Floor => Capabilities::RENDERABLE,
        }
    }

    /// Entity kind of a placed tile; empty tiles are never placed.
    pub fn for_tile(kind: TileKind) -> Option<EntityKind> {
        match kind {
            TileKind::Wall => Some(EntityKind::Wall),
            TileKind::Floor => Some(EntityKind::Floor),
            TileKind::Empty => None,
        }
    }
}

/// Common interface for everything that occupies a world position.
pub trait Entity {
    /// The entity's kind tag.
    fn kind(&self) -> EntityKind;

    /// Current world position.
    fn position(&self) -> Position;

    /// Capability set, derived from the kind unless overridden.
    fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    /// Checks whether this entity stops movement onto its tile.
    fn blocks_movement(&self) -> bool {
        self.capabilities().contains(Capabilities::COLLIDABLE)
    }
}

impl Entity for PlacedTile {
    fn kind(&self) -> EntityKind {
        // World building never emits empty tiles.
        EntityKind::for_tile(self.kind).unwrap_or(EntityKind::Wall)
    }

    fn position(&self) -> Position {
        self.position
    }

    fn capabilities(&self) -> Capabilities {
        let mut capabilities = Entity::kind(self).capabilities();
        capabilities.set(Capabilities::COLLIDABLE, !self.passable);
        capabilities
    }
}

/// The player-controlled character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name
    pub name: String,
    /// World position
    pub position: Position,
    /// Ticks left before the player may move again
    pub cooldown: i32,
    /// Ticks to wait after each move
    pub cooldown_time: i32,
}

impl Player {
    /// Creates a player ready to move immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{Entity, EntityKind, Player, Position};
    ///
    /// let player = Player::new("Hero".to_string(), Position::new(5, 5));
    /// assert_eq!(player.kind(), EntityKind::Player);
    /// assert!(!player.blocks_movement());
    /// ```
    pub fn new(name: String, position: Position) -> Self {
        Self {
            name,
            position,
            cooldown: 0,
            cooldown_time: PLAYER_COOLDOWN_TICKS,
        }
    }

    /// Counts one tick off the cooldown; returns true if the player may act this tick.
    pub fn tick_cooldown(&mut self) -> bool {
        self.cooldown = (self.cooldown - 1).max(0);
        self.cooldown == 0
    }

    /// Moves by `delta` and restarts the cooldown.
    pub fn step(&mut self, delta: Position) {
        self.position = self.position + delta;
        self.cooldown = self.cooldown_time;
    }
}

impl Entity for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn position(&self) -> Position {
        self.position
    }
}
