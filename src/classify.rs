/*
Davenstein - by David Petnick
*/

// Per-frame line styling for the automap.
//
// Checks run in this order:
// - Statically hidden lines stay hidden unless ALL_LINES is on.
// - Special lookup runs before any generic category, so a secret two-sided
//   line that still matches a special rule keeps the special's style.
// - Generic fallback treats secret two-sided lines as one-sided walls.
// - Revealed (cheat) mode shows unmapped lines in the "unseen" style.

use crate::automap::AutomapFlags;
use crate::map::{LevelGeometry, Line, LineFlags};
use crate::style::{DefaultCategory, LineStyle, StyleRuleTable};

/// Whether Generic Category Styles are Allowed This Pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifyPass {
    /// Only Lines With a Matching Special Rule
    SpecialsOnly,
    #[default]
    WithCategories,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyContext {
    pub flags: AutomapFlags,
    pub revealed: bool,
    pub pass: ClassifyPass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// Flagged DONT_DRAW
    Hidden,
    /// Nothing to Draw (Unmapped, or Mapped With no Applicable Style)
    Unclassified,
    Special(LineStyle),
    Category(DefaultCategory, LineStyle),
}

impl Classification {
    pub fn style(&self) -> Option<&LineStyle> {
        match self {
            Classification::Special(s) | Classification::Category(_, s) => Some(s),
            Classification::Hidden | Classification::Unclassified => None,
        }
    }

    pub fn should_draw(&self) -> bool {
        self.style().is_some()
    }
}

fn generic_category(level: &LevelGeometry, line: &Line, show_all: bool) -> Option<DefaultCategory> {
    let front = level.sector(line.front);
    let back = level.sector(line.back);
    match (front, back) {
        (Some(f), Some(b)) if !line.flags.contains(LineFlags::SECRET) => {
            if f.floor_height != b.floor_height {
                Some(DefaultCategory::FloorChangeLine)
            } else if f.ceiling_height != b.ceiling_height {
                Some(DefaultCategory::CeilingChangeLine)
            } else if show_all {
                Some(DefaultCategory::UnseenLine)
            } else {
                None
            }
        }
        // One-sided, or a secret two-sided line posing as a wall
        _ => Some(DefaultCategory::OneSidedLine),
    }
}

/// Style One Line for One Player
pub fn classify(
    table: &StyleRuleTable,
    level: &LevelGeometry,
    line: &Line,
    is_mapped: bool,
    ctx: ClassifyContext,
) -> Classification {
    let show_all = ctx.flags.contains(AutomapFlags::ALL_LINES);
    let dont_draw = line.flags.contains(LineFlags::DONT_DRAW);
    let categories = ctx.pass == ClassifyPass::WithCategories;

    if dont_draw && !show_all {
        return Classification::Hidden;
    }

    if show_all || is_mapped {
        if let Some(entry) = table.lookup_by_special(
            line.special,
            line.flags,
            line.has_front(),
            line.has_back(),
            ctx.flags,
        ) {
            return Classification::Special(entry.style);
        }
        if categories {
            if let Some(cat) = generic_category(level, line, show_all) {
                return Classification::Category(cat, *table.default_style(cat));
            }
        }
        return Classification::Unclassified;
    }

    if ctx.revealed && categories && !dont_draw {
        let cat = DefaultCategory::UnseenLine;
        return Classification::Category(cat, *table.default_style(cat));
    }

    Classification::Unclassified
}

/// Dedupes Classification Across Iteration Paths Within One Frame
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    stamps: Vec<u32>,
    generation: u32,
}

impl LineClassifier {
    /// Start a New Frame, Every Line Becomes Eligible Again
    pub fn begin_frame(&mut self, line_count: usize) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could collide with the new generation
            self.stamps.iter_mut().for_each(|s| *s = 0);
            self.generation = 1;
        }
        if self.stamps.len() != line_count {
            self.stamps.resize(line_count, 0);
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// None When 'index' Was Already Classified This Frame
    pub fn classify_once(
        &mut self,
        index: usize,
        table: &StyleRuleTable,
        level: &LevelGeometry,
        is_mapped: bool,
        ctx: ClassifyContext,
    ) -> Option<Classification> {
        let line = level.lines.get(index)?;
        let stamp = self.stamps.get_mut(index)?;
        if *stamp == self.generation {
            return None;
        }
        *stamp = self.generation;
        Some(classify(table, level, line, is_mapped, ctx))
    }
}
