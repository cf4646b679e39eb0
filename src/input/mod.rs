//! # Input Module
//!
//! Button state as seen by the game logic. Polling the keyboard is the engine's job; the
//! core only asks whether a named key is currently down.

use crate::game::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Play the level jingle
    Action,
    Quit,
}

/// Read-only view of the current button state.
pub trait InputState {
    /// Checks if `key` is held down this tick.
    fn is_down(&self, key: Key) -> bool;

    /// Movement requested by the arrow keys. Opposite keys cancel out and two
    /// perpendicular keys give a diagonal.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{ButtonState, InputState, Key, Position};
    ///
    /// let input = ButtonState::with_keys(&[Key::Up, Key::Right]);
    /// assert_eq!(input.movement(), Position::new(1, -1));
    /// ```
    fn movement(&self) -> Position {
        let mut delta = Position::origin();
        if self.is_down(Key::Up) {
            delta.y -= 1;
        }
        if self.is_down(Key::Down) {
            delta.y += 1;
        }
        if self.is_down(Key::Left) {
            delta.x -= 1;
        }
        if self.is_down(Key::Right) {
            delta.x += 1;
        }
        delta
    }
}

/// A simple set of held keys, filled in by a driver or a test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonState {
    held: HashSet<Key>,
}

impl ButtonState {
    /// Creates a state with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with the given keys held.
    pub fn with_keys(keys: &[Key]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

impl InputState for ButtonState {
    fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}
