//! # World Building
//!
//! Expands every occupied coarse cell into a 15x15 block of world tiles.

use crate::config::CELL_TILES;
use crate::game::Position;
use crate::generation::connectivity::ConnectivityFlags;
use crate::generation::grid::{GridMap, GridPos};
use crate::generation::templates::{TemplateLibrary, TemplateName, TileKind, TileTemplate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single tile placed in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedTile {
    /// World tile coordinates
    pub position: Position,
    /// Wall or floor
    pub kind: TileKind,
    /// Whether entities can stand on this tile
    pub passable: bool,
}

impl PlacedTile {
    /// Creates a placed tile; passability follows the kind.
    pub fn new(position: Position, kind: TileKind) -> Self {
        Self {
            position,
            kind,
            passable: kind.is_passable(),
        }
    }
}

/// Counters collected while building a world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Occupied cells that were expanded
    pub cells_built: usize,
    /// Tiles appended to the output
    pub tiles_emitted: usize,
    /// Cells that used the enclosed fallback because no template variant matched
    pub unmapped_templates: usize,
}

/// Turns a finished grid into world tiles using a template library.
#[derive(Debug, Clone, Copy)]
pub struct WorldBuilder<'a> {
    library: &'a TemplateLibrary,
}

impl<'a> WorldBuilder<'a> {
    /// Creates a builder that reads templates from `library`.
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self { library }
    }

    /// World position of a tile inside a cell's block.
    pub fn world_position(cell: GridPos, local_x: usize, local_y: usize) -> Position {
        Position::new(
            (cell.x * CELL_TILES + local_x) as i32,
            (cell.y * CELL_TILES + local_y) as i32,
        )
    }

    /// Picks the template for one cell, counting fallbacks.
    fn template_for(
        &self,
        name: TemplateName,
        pos: GridPos,
        flags: ConnectivityFlags,
        stats: &mut BuildStats,
    ) -> TileTemplate {
        match self.library.lookup(name, flags) {
            Some(template) => template,
            None => {
                stats.unmapped_templates += 1;
                warn!(
                    "No {} template matches flags {:?} at cell {}; using enclosed fallback",
                    name, flags, pos
                );
                TileTemplate::enclosed(name)
            }
        }
    }

    /// Appends the tiles of every occupied cell to `tiles`.
    ///
    /// `connectivity` is the flag map produced by `ConnectivityResolver::resolve` for the
    /// same grid; a cell missing from it is treated as closed on every side. Cells are
    /// visited x outer, y inner; empty template positions produce no tile.
    pub fn build<R>(
        &self,
        grid: &GridMap<R>,
        connectivity: &BTreeMap<GridPos, ConnectivityFlags>,
        tiles: &mut Vec<PlacedTile>,
    ) -> BuildStats {
        let mut stats = BuildStats::default();

        for (pos, cell) in grid.occupied_cells() {
            let Some(name) = TemplateName::for_cell(cell.kind()) else {
                continue;
            };
            let cell_flags = connectivity
                .get(&pos)
                .copied()
                .unwrap_or(ConnectivityFlags::empty());
            let template = self.template_for(name, pos, cell_flags, &mut stats);

            let before = tiles.len();
            tiles.extend(
                template
                    .iter()
                    .filter(|&(_, _, kind)| kind != TileKind::Empty)
                    .map(|(lx, ly, kind)| PlacedTile::new(Self::world_position(pos, lx, ly), kind)),
            );
            stats.cells_built += 1;
            stats.tiles_emitted += tiles.len() - before;
        }

        debug!(
            "Built {} cells into {} tiles ({} fallbacks)",
            stats.cells_built, stats.tiles_emitted, stats.unmapped_templates
        );
        stats
    }
}
