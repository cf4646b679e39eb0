//! # Rendering Module
//!
//! Viewport culling for the game state. Drawing itself belongs to the embedding engine,
//! which receives one call per visible tile through a `TileRenderer`.

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::game::{GameState, Position};
use crate::generation::TileKind;
use std::fmt;

/// Receives draw calls in screen coordinates.
pub trait TileRenderer {
    /// Draws a tile of `kind` at a screen cell.
    fn draw_tile(&mut self, screen_x: i32, screen_y: i32, kind: TileKind);

    /// Draws the player at a screen cell, after all tiles.
    fn draw_player(&mut self, screen_x: i32, screen_y: i32);
}

/// Draws the visible part of the level and the player.
///
/// Returns the number of tiles drawn.
pub fn draw_frame(state: &GameState, renderer: &mut dyn TileRenderer) -> usize {
    let mut drawn = 0;

    for screen_y in 0..SCREEN_HEIGHT {
        for screen_x in 0..SCREEN_WIDTH {
            let world = state.to_world(Position::new(screen_x, screen_y));
            if let Some(tile) = state.level.tile_at(world) {
                renderer.draw_tile(screen_x, screen_y, tile.kind);
                drawn += 1;
            }
        }
    }

    if state.is_on_screen(state.player.position) {
        let screen = state.to_screen(state.player.position);
        renderer.draw_player(screen.x, screen.y);
    }

    drawn
}

/// Renders frames into a character buffer, for the CLI and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiRenderer {
    rows: Vec<Vec<char>>,
}

impl AsciiRenderer {
    /// Creates a blank screen-sized buffer.
    pub fn new() -> Self {
        Self {
            rows: vec![vec![' '; SCREEN_WIDTH as usize]; SCREEN_HEIGHT as usize],
        }
    }

    /// Blanks the buffer.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(' ');
        }
    }

    /// Character at a screen cell, if inside the screen.
    pub fn char_at(&self, screen_x: i32, screen_y: i32) -> Option<char> {
        let x = usize::try_from(screen_x).ok()?;
        let y = usize::try_from(screen_y).ok()?;
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    fn put(&mut self, screen_x: i32, screen_y: i32, symbol: char) {
        let (Ok(x), Ok(y)) = (usize::try_from(screen_x), usize::try_from(screen_y)) else {
            return;
        };
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = symbol;
        }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRenderer for AsciiRenderer {
    fn draw_tile(&mut self, screen_x: i32, screen_y: i32, kind: TileKind) {
        self.put(screen_x, screen_y, kind.symbol());
    }

    fn draw_player(&mut self, screen_x: i32, screen_y: i32) {
        self.put(screen_x, screen_y, '@');
    }
}

impl fmt::Display for AsciiRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{
        ConnectivityResolver, GridMap, Level, RoomSlot, TemplateLibrary, WorldBuilder,
    };

    fn room_at_origin() -> GameState {
        let mut grid = GridMap::new();
        grid.place_room(
            0,
            0,
            RoomSlot {
                order: 0,
                name: "only".to_string(),
            },
        );
        let library = TemplateLibrary::builtin().unwrap();
        let connectivity = ConnectivityResolver::new().resolve(&grid);
        let mut tiles = Vec::new();
        let stats = WorldBuilder::new(&library).build(&grid, &connectivity, &mut tiles);
        GameState::new_with_level(Level::new(0, grid, connectivity, tiles, stats))
    }

    #[test]
    fn test_frame_is_culled_to_screen() {
        let state = room_at_origin();
        let mut renderer = AsciiRenderer::new();
        let drawn = draw_frame(&state, &mut renderer);

        // Spawn (7, 7) sits at screen (8, 6), so world x -1 and y -1 are off the level.
        // The visible window covers world x -1..=14 and y 1..=12.
        assert_eq!(drawn, 15 * 12);
        assert_eq!(renderer.char_at(8, 6), Some('@'));
        assert_eq!(renderer.char_at(0, 6), Some(' '));
        assert_eq!(renderer.char_at(1, 6), Some('#'));
        assert_eq!(renderer.char_at(2, 6), Some('.'));
    }

    #[test]
    fn test_ascii_output_shape() {
        let state = room_at_origin();
        let mut renderer = AsciiRenderer::new();
        draw_frame(&state, &mut renderer);

        let text = renderer.to_string();
        assert_eq!(text.lines().count(), SCREEN_HEIGHT as usize);
        assert!(text.lines().all(|l| l.chars().count() == SCREEN_WIDTH as usize));

        renderer.clear();
        assert_eq!(renderer, AsciiRenderer::new());
        assert_eq!(renderer.char_at(-1, 0), None);
    }
}
