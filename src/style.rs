/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

use crate::automap::AutomapFlags;
use crate::config::AutomapConfig;
use crate::error::AutomapError;
use crate::map::LineFlags;
use crate::palette::GameMode;

/// Rule Slots Available Beyond the 5 Fixed Default Styles
pub const MAX_STYLE_RULES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sidedness {
    #[default]
    Any,
    TwoSided,
    OneSided,
}

impl Sidedness {
    pub fn accepts(self, has_front: bool, has_back: bool) -> bool {
        match self {
            Sidedness::Any => true,
            Sidedness::TwoSided => has_front && has_back,
            Sidedness::OneSided => !(has_front && has_back),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlowKind {
    #[default]
    None,
    Both,
    Front,
    Back,
}

/// What a Rule Matches On
/// Two Registrations With Equal Keys Share One Slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleKey {
    pub special: i32,
    pub sidedness: Sidedness,
    pub excluded_line_flags: LineFlags,
    pub required_automap_flags: AutomapFlags,
}

impl StyleKey {
    pub const fn special(special: i32, sidedness: Sidedness) -> Self {
        Self {
            special,
            sidedness,
            excluded_line_flags: LineFlags::empty(),
            required_automap_flags: AutomapFlags::empty(),
        }
    }

    pub const fn excluding(mut self, flags: LineFlags) -> Self {
        self.excluded_line_flags = flags;
        self
    }

    pub const fn requiring(mut self, flags: AutomapFlags) -> Self {
        self.required_automap_flags = flags;
        self
    }
}

/// Resolved Visual Parameters Handed to the Renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Srgba,
    pub glow: GlowKind,
    /// Range: 0.0 ..= 1.0
    pub glow_strength: f32,
    pub glow_size: f32,
    pub glow_scales_with_view: bool,
}

impl LineStyle {
    pub fn plain(color: Srgba) -> Self {
        Self {
            color,
            glow: GlowKind::None,
            glow_strength: 0.0,
            glow_size: 0.0,
            glow_scales_with_view: false,
        }
    }

    pub fn glowing(color: Srgba, glow: GlowKind, strength: f32, size: f32, scales_with_view: bool) -> Self {
        Self {
            color,
            glow,
            glow_strength: strength.clamp(0.0, 1.0),
            glow_size: size,
            glow_scales_with_view: scales_with_view,
        }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::plain(Srgba::WHITE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleEntry {
    pub key: StyleKey,
    pub style: LineStyle,
}

impl StyleEntry {
    fn matches(&self, special: i32, line_flags: LineFlags, has_front: bool, has_back: bool, automap_flags: AutomapFlags) -> bool {
        let key = &self.key;
        key.special == special
            && key.sidedness.accepts(has_front, has_back)
            && !line_flags.intersects(key.excluded_line_flags)
            && (key.required_automap_flags.is_empty() || automap_flags.intersects(key.required_automap_flags))
    }
}

/// The 5 Fixed Line Categories Every Table Carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultCategory {
    UnseenLine,
    OneSidedLine,
    TwoSidedLine,
    FloorChangeLine,
    CeilingChangeLine,
}

impl DefaultCategory {
    pub const ALL: [DefaultCategory; 5] = [
        DefaultCategory::UnseenLine,
        DefaultCategory::OneSidedLine,
        DefaultCategory::TwoSidedLine,
        DefaultCategory::FloorChangeLine,
        DefaultCategory::CeilingChangeLine,
    ];

    const fn slot(self) -> usize {
        match self {
            DefaultCategory::UnseenLine => 0,
            DefaultCategory::OneSidedLine => 1,
            DefaultCategory::TwoSidedLine => 2,
            DefaultCategory::FloorChangeLine => 3,
            DefaultCategory::CeilingChangeLine => 4,
        }
    }
}

/// Every Named Automap Object, 'None' is the "Nothing" Sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    None,
    Thing,
    ThingPlayer,
    UnseenLine,
    OneSidedLine,
    TwoSidedLine,
    FloorChangeLine,
    CeilingChangeLine,
}

impl ObjectCategory {
    pub const fn as_line(self) -> Option<DefaultCategory> {
        match self {
            ObjectCategory::UnseenLine => Some(DefaultCategory::UnseenLine),
            ObjectCategory::OneSidedLine => Some(DefaultCategory::OneSidedLine),
            ObjectCategory::TwoSidedLine => Some(DefaultCategory::TwoSidedLine),
            ObjectCategory::FloorChangeLine => Some(DefaultCategory::FloorChangeLine),
            ObjectCategory::CeilingChangeLine => Some(DefaultCategory::CeilingChangeLine),
            ObjectCategory::None | ObjectCategory::Thing | ObjectCategory::ThingPlayer => None,
        }
    }
}

/// Shared Line Style Rules, Rebuilt Once per Map Load
/// Rule Order is Priority Order
#[derive(Resource, Debug, Clone)]
pub struct StyleRuleTable {
    rules: Vec<StyleEntry>,
    defaults: [LineStyle; 5],
    pub thing_color: Srgba,
    pub player_color: Srgba,
    pub background_color: Srgba,
    game: GameMode,
}

impl Default for StyleRuleTable {
    fn default() -> Self {
        Self {
            rules: Vec::with_capacity(MAX_STYLE_RULES),
            defaults: [LineStyle::default(); 5],
            thing_color: GREEN,
            player_color: Srgba::WHITE,
            background_color: Srgba::BLACK,
            game: GameMode::default(),
        }
    }
}

// Shared rule colors
const BLUE: Srgba = Srgba::new(0.0, 0.0, 0.776, 1.0);
const RED: Srgba = Srgba::new(0.682, 0.0, 0.0, 1.0);
const YELLOW: Srgba = Srgba::new(0.905, 0.9, 0.0, 1.0);
const GREEN: Srgba = Srgba::new(0.0, 0.9, 0.0, 1.0);
const EXIT_GREEN: Srgba = Srgba::new(0.0, 1.0, 0.0, 1.0);
const SECRET_EXIT: Srgba = Srgba::new(0.0, 1.0, 1.0, 1.0);

impl StyleRuleTable {
    /// Table Already Populated With 'game' Rules
    pub fn for_game(game: GameMode, cfg: &AutomapConfig) -> Result<Self, AutomapError> {
        let mut table = Self::default();
        table.apply_defaults(game, cfg)?;
        Ok(table)
    }

    pub fn game(&self) -> GameMode {
        self.game
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[StyleEntry] {
        &self.rules
    }

    pub fn default_style(&self, category: DefaultCategory) -> &LineStyle {
        &self.defaults[category.slot()]
    }

    pub fn set_default_color(&mut self, category: DefaultCategory, color: Srgba) {
        self.defaults[category.slot()].color = color;
    }

    pub fn set_default_glow(&mut self, category: DefaultCategory, glow: GlowKind, strength: f32, size: f32, scales_with_view: bool) {
        let style = &mut self.defaults[category.slot()];
        style.glow = glow;
        style.glow_strength = strength.clamp(0.0, 1.0);
        style.glow_size = size;
        style.glow_scales_with_view = scales_with_view;
    }

    /// Line Style for a Named Object
    /// 'None' -> Ok(None), Non-Line Objects -> UnknownCategory
    pub fn line_style(&self, category: ObjectCategory) -> Result<Option<&LineStyle>, AutomapError> {
        if category == ObjectCategory::None {
            return Ok(None);
        }
        category
            .as_line()
            .map(|c| Some(self.default_style(c)))
            .ok_or(AutomapError::UnknownCategory(category))
    }

    /// First Rule Matching the Line, in Registration Order
    pub fn lookup_by_special(
        &self,
        special: i32,
        line_flags: LineFlags,
        has_front: bool,
        has_back: bool,
        automap_flags: AutomapFlags,
    ) -> Option<&StyleEntry> {
        self.rules
            .iter()
            .find(|e| e.matches(special, line_flags, has_front, has_back, automap_flags))
    }

    /// Insert, or Overwrite the Slot With an Equal Key
    pub fn register_or_update(&mut self, key: StyleKey, style: LineStyle) -> Result<(), AutomapError> {
        if let Some(entry) = self.rules.iter_mut().find(|e| e.key == key) {
            entry.style = style;
            return Ok(());
        }
        if self.rules.len() >= MAX_STYLE_RULES {
            return Err(AutomapError::Capacity {
                capacity: MAX_STYLE_RULES,
                special: key.special,
            });
        }
        self.rules.push(StyleEntry { key, style });
        Ok(())
    }

    /// Drop Every Rule, Load the Game's Stock Set, Recompute Default Colors
    pub fn apply_defaults(&mut self, game: GameMode, cfg: &AutomapConfig) -> Result<(), AutomapError> {
        self.rules.clear();
        self.game = game;

        let door = |color: Srgba| LineStyle::glowing(color, GlowKind::Both, 0.75, 5.0, true);
        let mut rules: Vec<(StyleKey, LineStyle)> = Vec::new();

        match game {
            GameMode::Doom => {
                if cfg.show_doors {
                    for (specials, color) in [
                        ([26, 32, 99, 133], BLUE),
                        ([28, 33, 134, 135], RED),
                        ([27, 34, 136, 137], YELLOW),
                    ] {
                        // Walk-through door variants are two-sided, the switch
                        // variants may sit on either kind of wall
                        rules.push((StyleKey::special(specials[0], Sidedness::TwoSided).excluding(LineFlags::SECRET), door(color)));
                        rules.push((StyleKey::special(specials[1], Sidedness::TwoSided).excluding(LineFlags::SECRET), door(color)));
                        rules.push((StyleKey::special(specials[2], Sidedness::Any).excluding(LineFlags::SECRET), door(color)));
                        rules.push((StyleKey::special(specials[3], Sidedness::Any).excluding(LineFlags::SECRET), door(color)));
                    }
                }
                let exit = |color: Srgba| LineStyle::glowing(color, GlowKind::Both, 0.75, 5.0, true);
                rules.push((StyleKey::special(11, Sidedness::OneSided).requiring(AutomapFlags::SPECIAL_LINES), exit(EXIT_GREEN)));
                rules.push((StyleKey::special(52, Sidedness::TwoSided).requiring(AutomapFlags::SPECIAL_LINES), exit(EXIT_GREEN)));
                rules.push((StyleKey::special(51, Sidedness::OneSided).requiring(AutomapFlags::SPECIAL_LINES), exit(SECRET_EXIT)));
                rules.push((StyleKey::special(124, Sidedness::TwoSided).requiring(AutomapFlags::SPECIAL_LINES), exit(SECRET_EXIT)));
            }
            GameMode::Heretic => {
                if cfg.show_doors {
                    for (locked, switch, color) in [(26, 32, BLUE), (27, 34, YELLOW), (28, 33, GREEN)] {
                        rules.push((StyleKey::special(locked, Sidedness::TwoSided).excluding(LineFlags::SECRET), door(color)));
                        rules.push((StyleKey::special(switch, Sidedness::Any).excluding(LineFlags::SECRET), door(color)));
                    }
                }
                let exit = LineStyle::glowing(EXIT_GREEN, GlowKind::Both, 0.75, 5.0, true);
                rules.push((StyleKey::special(11, Sidedness::OneSided).requiring(AutomapFlags::SPECIAL_LINES), exit));
                rules.push((StyleKey::special(52, Sidedness::TwoSided).requiring(AutomapFlags::SPECIAL_LINES), exit));
                rules.push((
                    StyleKey::special(105, Sidedness::TwoSided).requiring(AutomapFlags::SPECIAL_LINES),
                    LineStyle::glowing(SECRET_EXIT, GlowKind::Both, 0.75, 5.0, true),
                ));
            }
            GameMode::Hexen => {
                if cfg.show_doors {
                    // Every locked door in Hexen is green
                    rules.push((StyleKey::special(13, Sidedness::Any), door(GREEN)));
                    rules.push((StyleKey::special(83, Sidedness::Any), door(GREEN)));
                }
                let teleport = |color: Srgba| LineStyle::glowing(color, GlowKind::Back, 0.6, 4.0, true);
                rules.push((StyleKey::special(70, Sidedness::TwoSided), teleport(BLUE)));
                rules.push((StyleKey::special(71, Sidedness::TwoSided), teleport(BLUE)));
                rules.push((StyleKey::special(74, Sidedness::TwoSided), teleport(RED)));
                rules.push((StyleKey::special(75, Sidedness::TwoSided), teleport(RED)));
            }
        }

        for (key, style) in rules {
            if let Err(err) = self.register_or_update(key, style) {
                error!("automap rules for {}: {err}", game.name());
                return Err(err);
            }
        }

        self.apply_colors(game, cfg);

        info!("automap styles rebuilt for {}: {} rules", game.name(), self.rules.len());
        Ok(())
    }

    fn apply_colors(&mut self, game: GameMode, cfg: &AutomapConfig) {
        let rgb = |c: [f32; 3]| Srgba::new(c[0], c[1], c[2], 1.0);
        let pal = game.palette_defaults();

        let (unseen, one, two, floor, ceiling, things, background) = if cfg.custom_colors {
            let c = &cfg.colors;
            (
                rgb(c.unseen_line),
                rgb(c.one_sided_line),
                rgb(c.two_sided_line),
                rgb(c.floor_change_line),
                rgb(c.ceiling_change_line),
                rgb(c.things),
                rgb(c.background),
            )
        } else {
            (
                game.palette_color(pal.unseen_line),
                game.palette_color(pal.one_sided_line),
                game.palette_color(pal.two_sided_line),
                game.palette_color(pal.floor_change_line),
                game.palette_color(pal.ceiling_change_line),
                game.palette_color(pal.thing),
                game.palette_color(pal.background),
            )
        };

        self.defaults = [
            LineStyle::plain(unseen),
            LineStyle::plain(one),
            LineStyle::plain(two),
            LineStyle::plain(floor),
            LineStyle::plain(ceiling),
        ];
        self.thing_color = things;
        self.player_color = game.palette_color(pal.player);
        self.background_color = background;
    }
}
