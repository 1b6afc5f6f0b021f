/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

use crate::automap::{AutomapController, AutomapFlags, FollowTarget};
use crate::config::AutomapConfig;
use crate::map::{LevelGeometry, MappedLines, ThingKind};
use crate::style::{GlowKind, StyleRuleTable};

/// Map Units: Thing Icon Radius
const THING_ICON_SCALE: f32 = 16.0;
const PLAYER_ICON_SCALE: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorIcon {
    PlayerArrow,
    Thing,
    Key,
}

/// One Resolved Line, Map-Space Endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineDraw {
    pub a: Vec2,
    pub b: Vec2,
    pub color: Srgba,
    pub glow: GlowKind,
    pub glow_strength: f32,
    /// Pixels
    pub glow_size: f32,
    pub thickness: f32,
}

/// Whatever Actually Puts Pixels on Screen
pub trait AutomapRenderer {
    fn draw_line(&mut self, line: &LineDraw);
    fn draw_vector_icon(&mut self, icon: VectorIcon, pos: Vec2, angle_deg: f32, scale: f32, color: Srgba);
    fn draw_label(&mut self, text: &str, pos: Vec2, color: Srgba);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawStats {
    pub lines: usize,
    pub icons: usize,
    pub labels: usize,
}

fn faded(color: Srgba, alpha: f32) -> Srgba {
    color.with_alpha(color.alpha * alpha)
}

/// One Frame of One Player's Automap
pub fn draw_automap(
    am: &mut AutomapController,
    table: &StyleRuleTable,
    level: &LevelGeometry,
    mapped: &MappedLines,
    follow: Option<FollowTarget>,
    cfg: &AutomapConfig,
    renderer: &mut impl AutomapRenderer,
) -> DrawStats {
    let mut stats = DrawStats::default();
    if !am.is_visible() {
        return stats;
    }

    let alpha = (cfg.line_alpha * cfg.opacity * am.camera().opacity()).clamp(0.0, 1.0);
    let view_scale = am.camera().view_scale();
    let region = *am.region();

    am.begin_frame(level);
    for (idx, line) in level.lines_in_box(region.min, region.max) {
        let Some(classification) = am.line_style(idx, table, level, mapped.is_mapped(idx)) else {
            continue;
        };
        let Some(style) = classification.style() else {
            continue;
        };

        let glow_strength = (style.glow_strength * cfg.glow_amount).clamp(0.0, 1.0);
        let glow_size = if style.glow_scales_with_view { style.glow_size * view_scale } else { style.glow_size };
        renderer.draw_line(&LineDraw {
            a: line.v1,
            b: line.v2,
            color: faded(style.color, alpha),
            glow: if glow_strength > 0.0 { style.glow } else { GlowKind::None },
            glow_strength,
            glow_size,
            thickness: cfg.line_width,
        });
        stats.lines += 1;
    }

    let flags = am.flags();
    let show_keys = flags.intersects(AutomapFlags::THINGS | AutomapFlags::KEYS);
    for thing in &level.things {
        let icon = match thing.kind {
            ThingKind::Key if show_keys => VectorIcon::Key,
            ThingKind::Monster | ThingKind::Item if flags.contains(AutomapFlags::THINGS) => VectorIcon::Thing,
            _ => continue,
        };
        if !region.contains(thing.origin) {
            continue;
        }
        renderer.draw_vector_icon(icon, thing.origin, thing.angle_deg, THING_ICON_SCALE, faded(table.thing_color, alpha));
        stats.icons += 1;
    }

    if let Some(target) = follow {
        renderer.draw_vector_icon(
            VectorIcon::PlayerArrow,
            target.origin,
            target.angle_deg,
            PLAYER_ICON_SCALE,
            faded(table.player_color, alpha),
        );
        stats.icons += 1;
    }

    // Marks off-screen get pinned to the border, toward the view centre
    let viewer = am.camera().origin();
    for (i, point) in am.points().iter() {
        let pos = region.fit_point(point.origin.truncate(), viewer);
        renderer.draw_label(&(i + 1).to_string(), pos, faded(Srgba::WHITE, alpha));
        stats.labels += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::GameMode;

    #[derive(Default)]
    struct Recorder {
        lines: Vec<LineDraw>,
        icons: Vec<(VectorIcon, Vec2)>,
        labels: Vec<(String, Vec2)>,
    }

    impl AutomapRenderer for Recorder {
        fn draw_line(&mut self, line: &LineDraw) {
            self.lines.push(*line);
        }

        fn draw_vector_icon(&mut self, icon: VectorIcon, pos: Vec2, _angle_deg: f32, _scale: f32, _color: Srgba) {
            self.icons.push((icon, pos));
        }

        fn draw_label(&mut self, text: &str, pos: Vec2, _color: Srgba) {
            self.labels.push((text.to_string(), pos));
        }
    }

    struct Fixture {
        cfg: AutomapConfig,
        level: LevelGeometry,
        table: StyleRuleTable,
        mapped: MappedLines,
        am: AutomapController,
    }

    fn fixture(rows: &[&str]) -> Fixture {
        let cfg = AutomapConfig::default();
        let level = LevelGeometry::from_ascii(rows);
        let table = StyleRuleTable::for_game(GameMode::Doom, &cfg).unwrap();
        let mapped = MappedLines::new(level.lines.len());
        let mut am = AutomapController::new(0, &cfg);
        am.reset(&level, &cfg);
        am.set_pixel_geometry(Vec2::new(640.0, 400.0));
        am.open(true, true, None, &cfg);
        am.set_zoom_max(true);
        for _ in 0..100 {
            am.tick(0.05, Default::default(), None, &cfg);
        }
        Fixture { cfg, level, table, mapped, am }
    }

    fn draw(f: &mut Fixture, follow: Option<FollowTarget>) -> (Recorder, DrawStats) {
        let mut rec = Recorder::default();
        let stats = draw_automap(&mut f.am, &f.table, &f.level, &f.mapped, follow, &f.cfg, &mut rec);
        (rec, stats)
    }

    const ROOM: [&str; 5] = ["#####", "#...#", "#.G.#", "#.k.#", "#####"];

    #[test]
    fn test_closed_map_draws_nothing() {
        let mut f = fixture(&ROOM);
        f.am.open(false, true, None, &f.cfg);
        let (rec, stats) = draw(&mut f, None);
        assert_eq!(stats, DrawStats::default());
        assert!(rec.lines.is_empty());
    }

    #[test]
    fn test_only_mapped_lines_are_drawn() {
        let mut f = fixture(&ROOM);
        assert_eq!(draw(&mut f, None).1.lines, 0);

        f.mapped.mark(0);
        f.mapped.mark(1);
        let (rec, stats) = draw(&mut f, None);
        assert_eq!(stats.lines, 2);
        assert_eq!(rec.lines[0].thickness, f.cfg.line_width);
    }

    #[test]
    fn test_revealed_draws_every_line() {
        let mut f = fixture(&ROOM);
        f.am.set_revealed(true);
        let (_, stats) = draw(&mut f, None);
        assert_eq!(stats.lines, f.level.lines.len());
    }

    #[test]
    fn test_alpha_scales_with_config_and_fade() {
        let mut f = fixture(&ROOM);
        f.mapped.mark(0);
        f.cfg.line_alpha = 0.5;
        f.cfg.opacity = 0.5;
        let (rec, _) = draw(&mut f, None);
        assert!((rec.lines[0].color.alpha - 0.25).abs() < 1.0e-5);
    }

    #[test]
    fn test_things_need_flag() {
        let mut f = fixture(&ROOM);
        let (rec, _) = draw(&mut f, None);
        assert!(rec.icons.is_empty());

        f.am.toggle_flag(AutomapFlags::KEYS);
        let (rec, _) = draw(&mut f, None);
        assert_eq!(rec.icons.len(), 1);
        assert_eq!(rec.icons[0].0, VectorIcon::Key);

        f.am.toggle_flag(AutomapFlags::THINGS);
        let (rec, _) = draw(&mut f, None);
        assert_eq!(rec.icons.len(), 2);
    }

    #[test]
    fn test_player_arrow_always_drawn() {
        let mut f = fixture(&ROOM);
        let target = FollowTarget { origin: Vec2::new(160.0, 160.0), angle_deg: 90.0 };
        let (rec, _) = draw(&mut f, Some(target));
        assert_eq!(rec.icons, vec![(VectorIcon::PlayerArrow, target.origin)]);
    }

    #[test]
    fn test_labels_stay_inside_view() {
        let mut f = fixture(&ROOM);
        f.am.add_point(Vec3::new(160.0, 160.0, 0.0));
        f.am.add_point(Vec3::new(1.0e6, 160.0, 0.0));
        let (rec, stats) = draw(&mut f, None);
        assert_eq!(stats.labels, 2);
        assert_eq!(rec.labels[0], ("1".to_string(), Vec2::new(160.0, 160.0)));
        assert_eq!(rec.labels[1].0, "2");
        assert!(f.am.region().contains(rec.labels[1].1));
    }

    #[test]
    fn test_glow_scales_with_view() {
        let mut f = fixture(&ROOM);
        for i in 0..f.level.lines.len() {
            f.mapped.mark(i);
        }
        f.table.set_default_glow(crate::style::DefaultCategory::OneSidedLine, GlowKind::Both, 1.0, 10.0, true);
        let scale = f.am.camera().view_scale();
        let (rec, _) = draw(&mut f, None);
        assert!(!rec.lines.is_empty());
        assert!(rec.lines.iter().all(|l| l.glow == GlowKind::Both && (l.glow_size - 10.0 * scale).abs() < 1.0e-4));

        f.cfg.glow_amount = 0.0;
        let (rec, _) = draw(&mut f, None);
        assert!(rec.lines.iter().all(|l| l.glow == GlowKind::None));
    }
}
