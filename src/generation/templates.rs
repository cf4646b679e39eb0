//! # Tile Templates
//!
//! Room and hallway layouts are described by 15x15 tables of tile codes. A template
//! resource holds one or more variants, each guarded by a connectivity pattern; the first
//! variant whose pattern matches a cell's flags is expanded into concrete tile kinds.
//!
//! Resource format, one variant after another:
//!
//! ```text
//! # comment
//! variant,open,****
//! W,W,W,W,W,W,OU,OU,OU,W,W,W,W,W,W
//! ... fourteen more rows of fifteen codes ...
//! ```
//!
//! Codes: `W` wall, `F` floor, `.` empty, `OU`/`OD`/`OL`/`OR` an opening that is floor when
//! the cell connects on that side and wall otherwise, and `CU-W`, `CD-F`, ... which place
//! the given kind only when the cell connects on that side.

use crate::config::CELL_TILES;
use crate::generation::connectivity::ConnectivityFlags;
use crate::generation::grid::{CellKind, Direction};
use crate::{SmolError, SmolResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const BUILTIN_ROOM: &str = include_str!("../../assets/templates/room.csv");
const BUILTIN_HALLWAY: &str = include_str!("../../assets/templates/hallway.csv");

/// The kind of a single world tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    Empty,
}

impl TileKind {
    /// Checks if entities can walk onto this kind of tile.
    pub fn is_passable(self) -> bool {
        matches!(self, TileKind::Floor)
    }

    /// Character used for text rendering.
    pub fn symbol(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Empty => ' ',
        }
    }
}

/// Logical template names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateName {
    Room,
    Hallway,
}

impl TemplateName {
    pub const ALL: [TemplateName; 2] = [TemplateName::Room, TemplateName::Hallway];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateName::Room => "room",
            TemplateName::Hallway => "hallway",
        }
    }

    /// File name of the template resource inside a template directory.
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Template used to expand a grid cell of the given kind.
    pub fn for_cell(kind: CellKind) -> Option<TemplateName> {
        match kind {
            CellKind::Room => Some(TemplateName::Room),
            CellKind::Corridor => Some(TemplateName::Hallway),
            CellKind::Empty => None,
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = SmolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "room" => Ok(TemplateName::Room),
            "hallway" | "corridor" => Ok(TemplateName::Hallway),
            other => Err(SmolError::InvalidConfig(format!(
                "unknown template name '{}'",
                other
            ))),
        }
    }
}

/// A parsed tile code, evaluated against connectivity flags at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileCode {
    Fixed(TileKind),
    Opening(Direction),
    Conditional(Direction, TileKind),
}

impl TileCode {
    fn parse(code: &str) -> Option<TileCode> {
        match code {
            "W" => Some(TileCode::Fixed(TileKind::Wall)),
            "F" => Some(TileCode::Fixed(TileKind::Floor)),
            "." | "E" => Some(TileCode::Fixed(TileKind::Empty)),
            _ => {
                let mut chars = code.chars();
                let prefix = chars.next()?;
                let side = parse_side(chars.next()?)?;
                let rest = chars.as_str();
                match (prefix, rest) {
                    ('O', "") => Some(TileCode::Opening(side)),
                    ('C', "-W") => Some(TileCode::Conditional(side, TileKind::Wall)),
                    ('C', "-F") => Some(TileCode::Conditional(side, TileKind::Floor)),
                    _ => None,
                }
            }
        }
    }

    fn resolve(self, flags: ConnectivityFlags) -> TileKind {
        match self {
            TileCode::Fixed(kind) => kind,
            TileCode::Opening(side) if flags.connects(side) => TileKind::Floor,
            TileCode::Opening(_) => TileKind::Wall,
            TileCode::Conditional(side, kind) if flags.connects(side) => kind,
            TileCode::Conditional(..) => TileKind::Empty,
        }
    }
}

fn parse_side(c: char) -> Option<Direction> {
    match c {
        'U' => Some(Direction::Up),
        'D' => Some(Direction::Down),
        'L' => Some(Direction::Left),
        'R' => Some(Direction::Right),
        _ => None,
    }
}

/// Which flag combinations a variant applies to, per side in U D L R order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPattern([Option<bool>; 4]);

impl FlagPattern {
    /// A pattern matching every combination.
    pub fn any() -> Self {
        Self([None; 4])
    }

    /// Parses a four character pattern of `1`, `0` and `*`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut sides = [None; 4];
        let mut chars = text.chars();
        for side in sides.iter_mut() {
            *side = match chars.next()? {
                '1' => Some(true),
                '0' => Some(false),
                '*' => None,
                _ => return None,
            };
        }
        if chars.next().is_some() {
            return None;
        }
        Some(Self(sides))
    }

    /// Checks whether the flags satisfy the pattern.
    pub fn matches(&self, flags: ConnectivityFlags) -> bool {
        Direction::ALL
            .iter()
            .zip(self.0.iter())
            .all(|(&direction, expected)| match expected {
                Some(expected) => flags.connects(direction) == *expected,
                None => true,
            })
    }
}

/// One named layout inside a template resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariant {
    pub name: String,
    pub pattern: FlagPattern,
    codes: Vec<Vec<TileCode>>,
}

impl TemplateVariant {
    fn expand(&self, template: TemplateName, flags: ConnectivityFlags) -> TileTemplate {
        let mut tiles = [[TileKind::Empty; CELL_TILES]; CELL_TILES];
        for (ly, row) in self.codes.iter().enumerate() {
            for (lx, code) in row.iter().enumerate() {
                tiles[ly][lx] = code.resolve(flags);
            }
        }
        TileTemplate {
            template,
            variant: self.name.clone(),
            tiles,
        }
    }
}

/// A concrete 15x15 block of tile kinds, indexed `[local_y][local_x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTemplate {
    pub template: TemplateName,
    pub variant: String,
    pub tiles: [[TileKind; CELL_TILES]; CELL_TILES],
}

impl TileTemplate {
    /// Name of the variant used when no pattern matches.
    pub const ENCLOSED_VARIANT: &'static str = "enclosed";

    /// The fully walled fallback block.
    pub fn enclosed(template: TemplateName) -> Self {
        Self {
            template,
            variant: Self::ENCLOSED_VARIANT.to_string(),
            tiles: [[TileKind::Wall; CELL_TILES]; CELL_TILES],
        }
    }

    /// Kind at local coordinates.
    pub fn get(&self, local_x: usize, local_y: usize) -> TileKind {
        self.tiles[local_y][local_x]
    }

    /// Iterates `(local_x, local_y, kind)` over every position.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TileKind)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(ly, row)| {
            row.iter()
                .enumerate()
                .map(move |(lx, &kind)| (lx, ly, kind))
        })
    }

    /// Number of tiles of the given kind.
    pub fn count(&self, kind: TileKind) -> usize {
        self.iter().filter(|&(_, _, k)| k == kind).count()
    }

    /// Checks whether this is the fallback block.
    pub fn is_enclosed_fallback(&self) -> bool {
        self.variant == Self::ENCLOSED_VARIANT
    }
}

/// Parsed room and hallway templates, shared read-only by every generation call.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: HashMap<TemplateName, Vec<TemplateVariant>>,
}

impl TemplateLibrary {
    /// Creates an empty library; every lookup falls back to the enclosed block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the templates compiled into the crate.
    ///
    /// # Examples
    ///
    /// ```
    /// use smolgame::{ConnectivityFlags, TemplateLibrary, TemplateName};
    ///
    /// let library = TemplateLibrary::builtin().unwrap();
    /// let room = library.resolve(TemplateName::Room, ConnectivityFlags::empty());
    /// assert_eq!(room.variant, "all-closed");
    /// ```
    pub fn builtin() -> SmolResult<Self> {
        let mut library = Self::new();
        library.insert_source(TemplateName::Room, "builtin room.csv", BUILTIN_ROOM)?;
        library.insert_source(TemplateName::Hallway, "builtin hallway.csv", BUILTIN_HALLWAY)?;
        Ok(library)
    }

    /// Loads `room.csv` and `hallway.csv` from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> SmolResult<Self> {
        let mut library = Self::new();
        for name in TemplateName::ALL {
            let path = dir.as_ref().join(name.file_name());
            let text = std::fs::read_to_string(&path)?;
            library.insert_source(name, &path.display().to_string(), &text)?;
        }
        Ok(library)
    }

    /// Parses a template resource and registers it under `name`, replacing any previous
    /// variants for that name.
    pub fn insert_source(&mut self, name: TemplateName, resource: &str, text: &str) -> SmolResult<()> {
        let variants = parse_resource(resource, text)?;
        debug!(
            "Loaded {} {} template variant(s) from {}",
            variants.len(),
            name,
            resource
        );
        self.templates.insert(name, variants);
        Ok(())
    }

    /// Variants registered for a template name, in resolution order.
    pub fn variants(&self, name: TemplateName) -> &[TemplateVariant] {
        self.templates.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds the first variant matching `flags`, or `None` if the combination is unmapped.
    pub fn lookup(&self, name: TemplateName, flags: ConnectivityFlags) -> Option<TileTemplate> {
        self.variants(name)
            .iter()
            .find(|variant| variant.pattern.matches(flags))
            .map(|variant| variant.expand(name, flags))
    }

    /// Resolves a template, falling back to the enclosed block for unmapped combinations.
    pub fn resolve(&self, name: TemplateName, flags: ConnectivityFlags) -> TileTemplate {
        self.lookup(name, flags).unwrap_or_else(|| {
            warn!(
                "No {} template matches flags {:?}; using enclosed fallback",
                name, flags
            );
            TileTemplate::enclosed(name)
        })
    }
}

struct PendingVariant {
    name: String,
    pattern: FlagPattern,
    header_line: usize,
    rows: Vec<Vec<TileCode>>,
}

fn malformed(resource: &str, line: usize, message: impl Into<String>) -> SmolError {
    SmolError::MalformedTemplate {
        resource: resource.to_string(),
        line,
        message: message.into(),
    }
}

fn finish_variant(resource: &str, pending: PendingVariant) -> SmolResult<TemplateVariant> {
    if pending.rows.len() != CELL_TILES {
        return Err(malformed(
            resource,
            pending.header_line,
            format!(
                "variant '{}' has {} rows, expected {}",
                pending.name,
                pending.rows.len(),
                CELL_TILES
            ),
        ));
    }
    Ok(TemplateVariant {
        name: pending.name,
        pattern: pending.pattern,
        codes: pending.rows,
    })
}

fn parse_resource(resource: &str, text: &str) -> SmolResult<Vec<TemplateVariant>> {
    let mut variants = Vec::new();
    let mut pending: Option<PendingVariant> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields[0].eq_ignore_ascii_case("variant") {
            if let Some(done) = pending.take() {
                variants.push(finish_variant(resource, done)?);
            }
            if fields.len() != 3 || fields[1].is_empty() {
                return Err(malformed(
                    resource,
                    line_no,
                    "variant header must be 'variant,<name>,<pattern>'",
                ));
            }
            let pattern = FlagPattern::parse(fields[2]).ok_or_else(|| {
                malformed(
                    resource,
                    line_no,
                    format!("invalid connectivity pattern '{}'", fields[2]),
                )
            })?;
            pending = Some(PendingVariant {
                name: fields[1].to_string(),
                pattern,
                header_line: line_no,
                rows: Vec::with_capacity(CELL_TILES),
            });
            continue;
        }

        let current = pending
            .as_mut()
            .ok_or_else(|| malformed(resource, line_no, "tile row before any variant header"))?;
        if current.rows.len() == CELL_TILES {
            return Err(malformed(
                resource,
                line_no,
                format!("variant '{}' has more than {} rows", current.name, CELL_TILES),
            ));
        }
        if fields.len() != CELL_TILES {
            return Err(malformed(
                resource,
                line_no,
                format!("expected {} columns, found {}", CELL_TILES, fields.len()),
            ));
        }
        let row = fields
            .iter()
            .enumerate()
            .map(|(column, code)| {
                TileCode::parse(code).ok_or_else(|| {
                    malformed(
                        resource,
                        line_no,
                        format!("unknown tile code '{}' in column {}", code, column + 1),
                    )
                })
            })
            .collect::<SmolResult<Vec<TileCode>>>()?;
        current.rows.push(row);
    }

    if let Some(done) = pending.take() {
        variants.push(finish_variant(resource, done)?);
    }
    if variants.is_empty() {
        return Err(malformed(
            resource,
            text.lines().count(),
            "resource contains no variants",
        ));
    }
    Ok(variants)
}
