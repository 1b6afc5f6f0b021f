/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Which Game's Rules + Palette the Automap Uses
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Doom,
    Heretic,
    Hexen,
}

/// Palette Indices the Stock Automap Draws With
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteDefaults {
    pub background: u8,
    pub unseen_line: u8,
    pub one_sided_line: u8,
    pub two_sided_line: u8,
    pub floor_change_line: u8,
    pub ceiling_change_line: u8,
    pub thing: u8,
    pub player: u8,
}

// (index, r, g, b) in 8-bit RGB, only the slots the automap reads
const DOOM_PAL: [(u8, u8, u8, u8); 9] = [
    (0x00, 0, 0, 0),
    (0x04, 255, 255, 255),
    (0x40, 191, 131, 75),   // browns
    (0x60, 135, 135, 135),  // grays
    (0x63, 123, 123, 123),  // grays + 3
    (0x70, 119, 255, 111),  // greens
    (0xb0, 255, 0, 0),      // reds
    (0xe7, 255, 255, 115),  // yellows
    (0xfb, 0, 0, 83),
];

const HERETIC_PAL: [(u8, u8, u8, u8); 9] = [
    (0x00, 0, 0, 0),
    (0x23, 255, 255, 255),
    (0x17, 151, 103, 59),
    (0x51, 107, 107, 107),
    (0x52, 99, 99, 99),
    (0x6e, 171, 95, 43),
    (0x8a, 95, 143, 51),
    (0x96, 123, 123, 187),
    (0xa0, 215, 183, 67),
];

const HEXEN_PAL: [(u8, u8, u8, u8); 9] = [
    (0x00, 0, 0, 0),
    (0x03, 71, 59, 43),
    (0x0f, 255, 255, 255),
    (0x53, 175, 123, 75),
    (0x66, 107, 91, 67),
    (0x6a, 127, 111, 87),
    (0x78, 195, 183, 151),
    (0x90, 207, 171, 43),
    (0xb6, 91, 143, 199),
];

impl GameMode {
    pub const fn name(self) -> &'static str {
        match self {
            GameMode::Doom => "Doom",
            GameMode::Heretic => "Heretic",
            GameMode::Hexen => "Hexen",
        }
    }

    pub const fn palette_defaults(self) -> PaletteDefaults {
        match self {
            GameMode::Doom => PaletteDefaults {
                background: 0x00,
                unseen_line: 0x63,
                one_sided_line: 0xb0,
                two_sided_line: 0x60,
                floor_change_line: 0x40,
                ceiling_change_line: 0xe7,
                thing: 0x70,
                player: 0x04,
            },
            GameMode::Heretic => PaletteDefaults {
                background: 0x00,
                unseen_line: 0x52,
                one_sided_line: 0x6e,
                two_sided_line: 0x51,
                floor_change_line: 0x17,
                ceiling_change_line: 0xa0,
                thing: 0x8a,
                player: 0x23,
            },
            GameMode::Hexen => PaletteDefaults {
                background: 0x03,
                unseen_line: 0x66,
                one_sided_line: 0x53,
                two_sided_line: 0x6a,
                floor_change_line: 0x78,
                ceiling_change_line: 0x90,
                thing: 0xb6,
                player: 0x0f,
            },
        }
    }

    fn table(self) -> &'static [(u8, u8, u8, u8)] {
        match self {
            GameMode::Doom => &DOOM_PAL,
            GameMode::Heretic => &HERETIC_PAL,
            GameMode::Hexen => &HEXEN_PAL,
        }
    }

    /// Palette Index -> Opaque Color, Unknown Slots Come Back Black
    pub fn palette_color(self, idx: u8) -> Srgba {
        let (r8, g8, b8) = self
            .table()
            .iter()
            .find(|(i, ..)| *i == idx)
            .map(|&(_, r, g, b)| (r, g, b))
            .unwrap_or((0, 0, 0));

        Srgba::new(
            r8 as f32 / 255.0,
            g8 as f32 / 255.0,
            b8 as f32 / 255.0,
            1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_index_is_in_palette() {
        for game in [GameMode::Doom, GameMode::Heretic, GameMode::Hexen] {
            let d = game.palette_defaults();
            let slots = [
                d.unseen_line,
                d.one_sided_line,
                d.two_sided_line,
                d.floor_change_line,
                d.ceiling_change_line,
                d.thing,
                d.player,
            ];
            for idx in slots {
                assert!(
                    game.table().iter().any(|(i, ..)| *i == idx),
                    "{} palette is missing index {idx:#x}",
                    game.name()
                );
            }
        }
    }

    #[test]
    fn test_doom_walls_are_red() {
        let c = GameMode::Doom.palette_color(GameMode::Doom.palette_defaults().one_sided_line);
        assert_eq!(c, Srgba::new(1.0, 0.0, 0.0, 1.0));
    }
}
