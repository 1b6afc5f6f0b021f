/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use bitflags::bitflags;

/// Map Units per ASCII Tile
pub const TILE_UNITS: f32 = 64.0;

bitflags! {
    /// Static Per-Line Flags (Doom Linedef Layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LineFlags: u32 {
        const BLOCKING       = 0x0001;
        const BLOCK_MONSTERS = 0x0002;
        const TWO_SIDED      = 0x0004;
        const SECRET         = 0x0020;
        const SOUND_BLOCK    = 0x0040;
        const DONT_DRAW      = 0x0080;
        const MAPPED         = 0x0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub floor_height: f32,
    pub ceiling_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub v1: Vec2,
    pub v2: Vec2,
    pub front: Option<usize>,
    pub back: Option<usize>,
    pub special: i32,
    pub flags: LineFlags,
}

impl Line {
    #[inline]
    pub fn has_front(&self) -> bool {
        self.front.is_some()
    }

    #[inline]
    pub fn has_back(&self) -> bool {
        self.back.is_some()
    }

    #[inline]
    pub fn is_two_sided(&self) -> bool {
        self.front.is_some() && self.back.is_some()
    }

    pub fn min(&self) -> Vec2 {
        self.v1.min(self.v2)
    }

    pub fn max(&self) -> Vec2 {
        self.v1.max(self.v2)
    }

    /// Closest Distance From 'p' to This Segment
    pub fn distance_to(&self, p: Vec2) -> f32 {
        let d = self.v2 - self.v1;
        let len_sq = d.length_squared();
        if len_sq <= f32::EPSILON {
            return p.distance(self.v1);
        }
        let t = ((p - self.v1).dot(d) / len_sq).clamp(0.0, 1.0);
        p.distance(self.v1 + d * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThingKind {
    Monster,
    Item,
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thing {
    pub origin: Vec2,
    pub angle_deg: f32,
    pub kind: ThingKind,
}

/// Axis Aligned Bounds of Every Vertex in the Level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self { min: Vec2::ZERO, max: Vec2::ZERO }
    }
}

impl MapBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    pub fn overlaps(&self, min: Vec2, max: Vec2) -> bool {
        !(max.x < self.min.x || min.x > self.max.x || max.y < self.min.y || min.y > self.max.y)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct LevelGeometry {
    pub sectors: Vec<Sector>,
    pub lines: Vec<Line>,
    pub things: Vec<Thing>,
    /// Map-space Origin + Facing (Degrees, 0 = East)
    pub player_start: Option<(Vec2, f32)>,
    pub bounds: MapBounds,
}

// ASCII tile meaning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Solid { special: i32, flags: LineFlags },
    Open { sector: usize, special: i32, flags: LineFlags },
}

const SECTOR_NORMAL: usize = 0;
const SECTOR_RAISED: usize = 1;
const SECTOR_LOW_CEILING: usize = 2;
const SECTOR_DOOR: usize = 3;

// Doom line specials used by the ASCII builder
pub const SPECIAL_DOOR: i32 = 1;
pub const SPECIAL_EXIT_SWITCH: i32 = 11;
pub const SPECIAL_BLUE_DOOR: i32 = 26;
pub const SPECIAL_YELLOW_DOOR: i32 = 27;
pub const SPECIAL_RED_DOOR: i32 = 28;

impl LevelGeometry {
    pub fn new(sectors: Vec<Sector>, lines: Vec<Line>) -> Self {
        let mut level = Self {
            sectors,
            lines,
            ..default()
        };
        level.update_bounds();
        level
    }

    pub fn update_bounds(&mut self) {
        let mut it = self.lines.iter().flat_map(|l| [l.v1, l.v2]);
        let Some(first) = it.next() else {
            self.bounds = MapBounds::default();
            return;
        };
        let (min, max) = it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        self.bounds = MapBounds { min, max };
    }

    pub fn sector(&self, idx: Option<usize>) -> Option<&Sector> {
        idx.and_then(|i| self.sectors.get(i))
    }

    /// Line Indices Whose Bounds Touch the Given Box
    pub fn lines_in_box(&self, min: Vec2, max: Vec2) -> impl Iterator<Item = (usize, &Line)> + '_ {
        let query = MapBounds { min, max };
        self.lines
            .iter()
            .enumerate()
            .filter(move |(_, l)| query.overlaps(l.min(), l.max()))
    }

    /// Legend:
    ///   '#' wall            '%' wall hidden from the map
    ///   'E' exit switch     'S' secret door (flagged SECRET)
    ///   'D' door            'B' / 'R' / 'Y' blue / red / yellow locked door
    ///   'h' raised floor    'c' low ceiling
    ///   'P' player start    'G' monster     'k' key     '.' or ' ' floor
    pub fn from_ascii(lines: &[&str]) -> Self {
        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut cells: Vec<Cell> = Vec::with_capacity(width * height);
        let mut things: Vec<Thing> = Vec::new();
        let mut player_start: Option<(Vec2, f32)> = None;

        let open = Cell::Open { sector: SECTOR_NORMAL, special: 0, flags: LineFlags::empty() };
        let door = |special: i32, flags: LineFlags| Cell::Open { sector: SECTOR_DOOR, special, flags };

        for (z, line) in lines.iter().enumerate() {
            let mut chars = line.chars().collect::<Vec<_>>();
            while chars.len() < width {
                chars.push(' ');
            }

            for (x, c) in chars.into_iter().enumerate() {
                let center = Self::cell_center(x, z, height);
                let cell = match c {
                    '#' => Cell::Solid { special: 0, flags: LineFlags::BLOCKING },
                    '%' => Cell::Solid { special: 0, flags: LineFlags::BLOCKING | LineFlags::DONT_DRAW },
                    'E' => Cell::Solid { special: SPECIAL_EXIT_SWITCH, flags: LineFlags::BLOCKING },
                    'D' => door(SPECIAL_DOOR, LineFlags::empty()),
                    'S' => door(SPECIAL_DOOR, LineFlags::SECRET),
                    'B' => door(SPECIAL_BLUE_DOOR, LineFlags::empty()),
                    'R' => door(SPECIAL_RED_DOOR, LineFlags::empty()),
                    'Y' => door(SPECIAL_YELLOW_DOOR, LineFlags::empty()),
                    'h' => Cell::Open { sector: SECTOR_RAISED, special: 0, flags: LineFlags::empty() },
                    'c' => Cell::Open { sector: SECTOR_LOW_CEILING, special: 0, flags: LineFlags::empty() },
                    'P' => {
                        if player_start.is_none() {
                            player_start = Some((center, 90.0));
                        }
                        open
                    }
                    'G' => {
                        things.push(Thing { origin: center, angle_deg: 270.0, kind: ThingKind::Monster });
                        open
                    }
                    'k' => {
                        things.push(Thing { origin: center, angle_deg: 0.0, kind: ThingKind::Key });
                        open
                    }
                    '.' | ' ' => open,
                    other => {
                        bevy::log::warn!("from_ascii: unknown tile '{other}' at ({x},{z}), treating as floor");
                        open
                    }
                };
                cells.push(cell);
            }
        }

        let solid = Cell::Solid { special: 0, flags: LineFlags::BLOCKING };
        let cell_at = |x: i64, z: i64| -> Cell {
            if x < 0 || z < 0 || x >= width as i64 || z >= height as i64 {
                return solid;
            }
            cells[z as usize * width + x as usize]
        };

        let mut out_lines: Vec<Line> = Vec::new();
        for z in 0..height as i64 {
            for x in 0..width as i64 {
                let here = cell_at(x, z);
                let (x0, x1) = (x as f32 * TILE_UNITS, (x + 1) as f32 * TILE_UNITS);
                let y_top = (height as i64 - z) as f32 * TILE_UNITS;
                let y_bot = y_top - TILE_UNITS;

                // East edge (and west edge on the first column)
                if let Some(l) = Self::edge_line(here, cell_at(x + 1, z), Vec2::new(x1, y_top), Vec2::new(x1, y_bot)) {
                    out_lines.push(l);
                }
                if x == 0 {
                    if let Some(l) = Self::edge_line(cell_at(x - 1, z), here, Vec2::new(x0, y_top), Vec2::new(x0, y_bot)) {
                        out_lines.push(l);
                    }
                }
                // South edge (and north edge on the first row)
                if let Some(l) = Self::edge_line(cell_at(x, z + 1), here, Vec2::new(x0, y_bot), Vec2::new(x1, y_bot)) {
                    out_lines.push(l);
                }
                if z == 0 {
                    if let Some(l) = Self::edge_line(here, cell_at(x, z - 1), Vec2::new(x0, y_top), Vec2::new(x1, y_top)) {
                        out_lines.push(l);
                    }
                }
            }
        }

        let sectors = vec![
            Sector { floor_height: 0.0, ceiling_height: 128.0 },
            Sector { floor_height: 24.0, ceiling_height: 128.0 },
            Sector { floor_height: 0.0, ceiling_height: 96.0 },
            Sector { floor_height: 0.0, ceiling_height: 0.0 },
        ];

        let mut level = Self::new(sectors, out_lines);
        level.things = things;
        level.player_start = player_start;
        level
    }

    fn cell_center(x: usize, z: usize, height: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * TILE_UNITS,
            (height as f32 - z as f32 - 0.5) * TILE_UNITS,
        )
    }

    // Line on the shared edge of two cells ('a' sits on the right of v1 -> v2)
    fn edge_line(a: Cell, b: Cell, v1: Vec2, v2: Vec2) -> Option<Line> {
        match (a, b) {
            (Cell::Solid { .. }, Cell::Solid { .. }) => None,
            (Cell::Open { sector, .. }, Cell::Solid { special, flags })
            | (Cell::Solid { special, flags }, Cell::Open { sector, .. }) => Some(Line {
                v1,
                v2,
                front: Some(sector),
                back: None,
                special,
                flags,
            }),
            (
                Cell::Open { sector: sa, special: pa, flags: fa },
                Cell::Open { sector: sb, special: pb, flags: fb },
            ) => {
                if sa == sb && pa == 0 && pb == 0 {
                    return None;
                }
                Some(Line {
                    v1,
                    v2,
                    front: Some(sa),
                    back: Some(sb),
                    special: if pa != 0 { pa } else { pb },
                    flags: fa | fb | LineFlags::TWO_SIDED,
                })
            }
        }
    }
}

/// Per-Player "Has Seen This Line" Bits, Owned by Gameplay
#[derive(Component, Debug, Clone, Default)]
pub struct MappedLines {
    bits: Vec<bool>,
}

impl MappedLines {
    pub fn new(line_count: usize) -> Self {
        Self { bits: vec![false; line_count] }
    }

    pub fn reset(&mut self, line_count: usize) {
        self.bits.clear();
        self.bits.resize(line_count, false);
    }

    pub fn is_mapped(&self, idx: usize) -> bool {
        self.bits.get(idx).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, idx: usize) {
        if let Some(b) = self.bits.get_mut(idx) {
            *b = true;
        }
    }

    /// Mark Everything Within 'radius' Map Units of 'origin'
    /// Returns How Many Lines Were Newly Mapped
    pub fn mark_within(&mut self, level: &LevelGeometry, origin: Vec2, radius: f32) -> usize {
        if self.bits.len() != level.lines.len() {
            self.reset(level.lines.len());
        }
        let r = Vec2::splat(radius);
        let mut newly = 0;
        for (i, line) in level.lines_in_box(origin - r, origin + r) {
            if !self.bits[i] && line.distance_to(origin) <= radius {
                self.bits[i] = true;
                newly += 1;
            }
        }
        newly
    }
}
