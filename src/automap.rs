/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use bitflags::bitflags;

use crate::camera::CameraState;
use crate::classify::{Classification, ClassifyContext, ClassifyPass, LineClassifier};
use crate::config::AutomapConfig;
use crate::error::AutomapError;
use crate::map::{LevelGeometry, MapBounds};
use crate::points::{MarkedPoint, MarkedPointStore};
use crate::style::StyleRuleTable;
use crate::view::{ScaleBounds, ViewTransform, VisibleRegion};

bitflags! {
    /// What the Automap Currently Shows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AutomapFlags: u32 {
        const THINGS        = 0x01;
        const KEYS          = 0x02;
        const ALL_LINES     = 0x04;
        const SPECIAL_LINES = 0x08;
    }
}

/// Open / Close Lifecycle, Derived From the Open Flag + Opacity Easing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomapPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Snapshot of the Actor the Camera Follows (Map Space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTarget {
    pub origin: Vec2,
    /// Degrees, 0 = East, Counter-Clockwise
    pub angle_deg: f32,
}

/// Held Input for One Tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AutomapInput {
    /// Screen Directions (X Right, Y Up), Each -1 ..= 1
    pub pan: Vec2,
    /// > 0 Zooms In, < 0 Zooms Out
    pub zoom: f32,
}

/// One Local Player's Automap
#[derive(Component, Debug, Clone)]
pub struct AutomapController {
    player: usize,
    camera: CameraState,
    region: VisibleRegion,
    points: MarkedPointStore,
    classifier: LineClassifier,
    is_open: bool,
    revealed: bool,
    follow_player: Option<usize>,
    follow_enabled: bool,
    rotate_enabled: bool,
    flags: AutomapFlags,
    widget_px: Vec2,
    map_bounds: MapBounds,
    min_user_scale: f32,
    border_px: f32,
}

impl AutomapController {
    pub fn new(player: usize, cfg: &AutomapConfig) -> Self {
        let mut camera = CameraState::default();
        camera.max_position_delta = cfg.max_position_delta;
        Self {
            player,
            camera,
            region: VisibleRegion::default(),
            points: MarkedPointStore::default(),
            classifier: LineClassifier::default(),
            is_open: false,
            revealed: false,
            follow_player: Some(player),
            follow_enabled: cfg.follow,
            rotate_enabled: cfg.rotate,
            flags: AutomapFlags::SPECIAL_LINES,
            widget_px: Vec2::new(320.0, 200.0),
            map_bounds: MapBounds::default(),
            min_user_scale: cfg.min_user_scale,
            border_px: cfg.border_px,
        }
    }

    /// Map Load: Same Controller, Fresh State
    pub fn reset(&mut self, level: &LevelGeometry, cfg: &AutomapConfig) {
        self.map_bounds = level.bounds;
        self.min_user_scale = cfg.min_user_scale;
        self.border_px = cfg.border_px;
        self.camera.max_position_delta = cfg.max_position_delta;
        self.is_open = false;
        self.revealed = false;
        self.points.clear_all();
        self.classifier = LineClassifier::default();

        let start = level.player_start.map(|(p, _)| p).unwrap_or(level.bounds.center());
        self.camera.reset(start, self.scale_bounds());
        self.update_region();
        debug!("automap reset for player {} (bounds {:?})", self.player, self.map_bounds);
    }

    fn scale_bounds(&self) -> ScaleBounds {
        ScaleBounds::compute(&self.map_bounds, self.widget_px, self.min_user_scale)
    }

    /// Widget Resized
    pub fn set_pixel_geometry(&mut self, widget_px: Vec2) {
        if widget_px == self.widget_px {
            return;
        }
        self.widget_px = widget_px;
        self.camera.set_scale_bounds(self.scale_bounds());
        self.update_region();
    }

    pub fn set_map_bounds(&mut self, bounds: MapBounds) {
        if bounds == self.map_bounds {
            return;
        }
        self.map_bounds = bounds;
        self.camera.set_scale_bounds(self.scale_bounds());
    }

    fn rotated_angle(&self, target: &FollowTarget) -> f32 {
        // Player always faces "up" on a rotating map
        if self.rotate_enabled { target.angle_deg - 90.0 } else { 0.0 }
    }

    /// Returns True When the Open State Changed
    /// (Caller Toggles Automap Input Bindings on That)
    pub fn open(&mut self, yes: bool, instantly: bool, follow: Option<FollowTarget>, cfg: &AutomapConfig) -> bool {
        if yes == self.is_open {
            return false;
        }
        self.is_open = yes;

        if !yes {
            self.camera.set_opacity(0.0, instantly);
            info!("automap closed (player {})", self.player);
            return true;
        }

        self.camera.set_opacity(1.0, instantly);
        match follow {
            Some(target) => {
                if self.follow_enabled || cfg.reset_pan_on_open {
                    self.camera.set_position(target.origin, true);
                }
                if !self.follow_enabled && cfg.reset_pan_on_open {
                    let angle = self.rotated_angle(&target);
                    self.camera.set_angle(angle, true);
                }
            }
            None => {
                self.camera.set_position(self.map_bounds.center(), true);
                self.camera.set_angle(0.0, true);
            }
        }
        info!("automap opened (player {})", self.player);
        true
    }

    pub fn tick(&mut self, elapsed_secs: f32, input: AutomapInput, follow: Option<FollowTarget>, cfg: &AutomapConfig) {
        self.camera.max_position_delta = cfg.max_position_delta;

        if self.is_open {
            match follow.filter(|_| self.follow_enabled) {
                Some(target) => {
                    self.camera.set_position(target.origin, false);
                    let angle = self.rotated_angle(&target);
                    self.camera.set_angle(angle, false);
                }
                None => self.apply_free_input(elapsed_secs, input, cfg),
            }
        }

        self.camera.tick(elapsed_secs, cfg.camera_rate, cfg.fade_rate);
        self.update_region();
    }

    fn apply_free_input(&mut self, elapsed_secs: f32, input: AutomapInput, cfg: &AutomapConfig) {
        if input.pan != Vec2::ZERO {
            let units = self.camera.frame_to_map(cfg.pan_pixels_per_sec()) * elapsed_secs;
            let rot = Vec2::from_angle(self.camera.angle_deg().to_radians());
            let delta = rot.rotate(input.pan.clamp(Vec2::NEG_ONE, Vec2::ONE) * units);
            // Panning is direct, never eased
            let origin = self.camera.origin() + delta;
            self.camera.set_position(origin, true);
        }

        if input.zoom != 0.0 && !self.camera.is_zoom_max() {
            let factor = cfg.zoom_factor_per_sec().powf(input.zoom.clamp(-1.0, 1.0) * elapsed_secs);
            let scale = self.camera.scale.target * factor;
            self.camera.set_scale(scale, false);
        }
    }

    fn update_region(&mut self) {
        let f2m = self.camera.frame_to_map(1.0);
        self.region.recompute(
            self.camera.origin(),
            self.camera.angle_deg(),
            f2m,
            self.widget_px,
            self.border_px,
        );
    }

    pub fn phase(&self) -> AutomapPhase {
        match (self.is_open, self.camera.opacity.is_settled()) {
            (true, true) => AutomapPhase::Open,
            (true, false) => AutomapPhase::Opening,
            (false, true) => AutomapPhase::Closed,
            (false, false) => AutomapPhase::Closing,
        }
    }

    /// Anything Worth Drawing? (Open, or Still Fading Out)
    pub fn is_visible(&self) -> bool {
        self.camera.opacity() > 0.0
    }

    pub fn player(&self) -> usize {
        self.player
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_following(&self) -> bool {
        self.follow_enabled
    }

    pub fn is_rotating(&self) -> bool {
        self.rotate_enabled
    }

    pub fn follow_player(&self) -> Option<usize> {
        self.follow_player
    }

    pub fn flags(&self) -> AutomapFlags {
        self.flags
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn region(&self) -> &VisibleRegion {
        &self.region
    }

    pub fn widget_px(&self) -> Vec2 {
        self.widget_px
    }

    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform {
            origin: self.camera.origin(),
            angle_deg: self.camera.angle_deg(),
            scale: self.camera.view_scale(),
        }
    }

    pub fn set_follow(&mut self, yes: bool) {
        if self.follow_enabled != yes {
            self.follow_enabled = yes;
            info!("automap follow {}", if yes { "on" } else { "off" });
        }
    }

    pub fn set_follow_player(&mut self, player: Option<usize>) {
        self.follow_player = player;
    }

    pub fn set_rotate(&mut self, yes: bool) {
        if self.rotate_enabled != yes {
            self.rotate_enabled = yes;
            if !yes {
                self.camera.set_angle(0.0, false);
            }
            info!("automap rotate {}", if yes { "on" } else { "off" });
        }
    }

    /// Cheat Reveal, Only Changes Which Lines Classify as Unseen
    pub fn set_revealed(&mut self, yes: bool) {
        if self.revealed != yes {
            self.revealed = yes;
            info!("automap reveal {}", if yes { "on" } else { "off" });
        }
    }

    pub fn set_zoom_max(&mut self, yes: bool) {
        self.camera.set_zoom_max(yes);
    }

    pub fn set_flags(&mut self, flags: AutomapFlags) {
        self.flags = flags;
    }

    pub fn toggle_flag(&mut self, flags: AutomapFlags) {
        self.flags.toggle(flags);
    }

    pub fn set_camera_origin(&mut self, origin: Vec2, instantly: bool) {
        self.camera.set_position(origin, instantly);
    }

    pub fn set_camera_angle(&mut self, angle_deg: f32, instantly: bool) {
        self.camera.set_angle(angle_deg, instantly);
    }

    pub fn set_scale(&mut self, scale: f32, instantly: bool) {
        self.camera.set_scale(scale, instantly);
    }

    pub fn add_point(&mut self, origin: Vec3) -> usize {
        let idx = self.points.add_point(origin);
        info!("automap: marked spot {} at ({:.0}, {:.0})", idx + 1, origin.x, origin.y);
        idx
    }

    pub fn point(&self, index: usize) -> Result<&MarkedPoint, AutomapError> {
        self.points.point(index)
    }

    pub fn points(&self) -> &MarkedPointStore {
        &self.points
    }

    pub fn clear_points(&mut self) {
        self.points.clear_all();
        info!("automap: marks cleared");
    }

    /// Must Run Once Before the Frame's 'line_style' Calls
    pub fn begin_frame(&mut self, level: &LevelGeometry) {
        self.classifier.begin_frame(level.lines.len());
    }

    /// Style for One Line This Frame, None if Already Handled This Frame
    pub fn line_style(
        &mut self,
        index: usize,
        table: &StyleRuleTable,
        level: &LevelGeometry,
        is_mapped: bool,
    ) -> Option<Classification> {
        let ctx = ClassifyContext {
            flags: self.flags,
            revealed: self.revealed,
            pass: ClassifyPass::WithCategories,
        };
        self.classifier.classify_once(index, table, level, is_mapped, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AutomapConfig {
        AutomapConfig::default()
    }

    fn square_level() -> LevelGeometry {
        let mut rows = vec!["##########"];
        rows.extend(std::iter::repeat_n("#........#", 14));
        rows.push("##########");
        LevelGeometry::from_ascii(&rows)
    }

    fn controller(cfg: &AutomapConfig) -> AutomapController {
        let mut am = AutomapController::new(0, cfg);
        am.reset(&square_level(), cfg);
        am
    }

    fn run(am: &mut AutomapController, secs: f32, input: AutomapInput, follow: Option<FollowTarget>, cfg: &AutomapConfig) {
        let steps = (secs / 0.01).round() as usize;
        for _ in 0..steps {
            am.tick(0.01, input, follow, cfg);
        }
    }

    #[test]
    fn test_phase_cycle() {
        let c = cfg();
        let mut am = controller(&c);
        assert_eq!(am.phase(), AutomapPhase::Closed);

        assert!(am.open(true, false, None, &c));
        assert_eq!(am.phase(), AutomapPhase::Opening);
        run(&mut am, 1.0, AutomapInput::default(), None, &c);
        assert_eq!(am.phase(), AutomapPhase::Open);
        assert_eq!(am.camera().opacity(), 1.0);

        assert!(am.open(false, false, None, &c));
        assert_eq!(am.phase(), AutomapPhase::Closing);
        // Fade keeps going after the logical close
        run(&mut am, 1.0, AutomapInput::default(), None, &c);
        assert_eq!(am.phase(), AutomapPhase::Closed);
        assert!(!am.is_visible());
    }

    #[test]
    fn test_open_twice_is_noop() {
        let c = cfg();
        let mut am = controller(&c);
        assert!(am.open(true, true, None, &c));
        assert!(!am.open(true, true, None, &c));
        assert_eq!(am.phase(), AutomapPhase::Open);
    }

    #[test]
    fn test_open_follow_snaps_to_actor() {
        let mut c = cfg();
        c.reset_pan_on_open = false;
        c.rotate = false;
        let mut am = controller(&c);
        am.set_camera_angle(30.0, true);

        let target = FollowTarget { origin: Vec2::new(50.0, 50.0), angle_deg: 135.0 };
        am.open(true, false, Some(target), &c);
        assert_eq!(am.camera().position.target, Vec2::new(50.0, 50.0));
        assert_eq!(am.camera().angle.target.get(), 30.0);
    }

    #[test]
    fn test_open_without_follow_resets_pan_and_angle() {
        let mut c = cfg();
        c.follow = false;
        c.rotate = true;
        c.reset_pan_on_open = true;
        let mut am = controller(&c);
        am.set_camera_origin(Vec2::new(10.0, 10.0), true);

        let target = FollowTarget { origin: Vec2::new(200.0, 300.0), angle_deg: 180.0 };
        am.open(true, false, Some(target), &c);
        assert_eq!(am.camera().origin(), Vec2::new(200.0, 300.0));
        assert_eq!(am.camera().angle.current.get(), 90.0);
    }

    #[test]
    fn test_open_without_actor_centres_map() {
        let c = cfg();
        let mut am = controller(&c);
        am.set_camera_angle(45.0, true);
        am.open(true, false, None, &c);
        assert_eq!(am.camera().origin(), square_level().bounds.center());
        assert_eq!(am.camera().angle_deg(), 0.0);
    }

    #[test]
    fn test_follow_tracks_actor_each_tick() {
        let mut c = cfg();
        c.rotate = true;
        let mut am = controller(&c);
        let mut target = FollowTarget { origin: Vec2::new(100.0, 100.0), angle_deg: 90.0 };
        am.open(true, true, Some(target), &c);

        target.origin = Vec2::new(140.0, 100.0);
        target.angle_deg = 180.0;
        run(&mut am, 2.0, AutomapInput::default(), Some(target), &c);
        assert!(am.camera().origin().abs_diff_eq(Vec2::new(140.0, 100.0), 1.0e-3));
        assert!((am.camera().angle_deg() - 90.0).abs() < 1.0e-3);
    }

    #[test]
    fn test_pan_is_instant_and_rotated() {
        let mut c = cfg();
        c.follow = false;
        let mut am = controller(&c);
        am.open(true, true, None, &c);
        am.set_camera_angle(90.0, true);
        let start = am.camera().origin();

        let input = AutomapInput { pan: Vec2::new(1.0, 0.0), zoom: 0.0 };
        am.tick(0.1, input, None, &c);
        let moved = am.camera().origin() - start;
        // Screen-right is map-up at 90 degrees
        assert!(moved.x.abs() < 1.0e-3);
        assert!(moved.y > 0.0);
        assert!(am.camera().position.is_settled());
    }

    #[test]
    fn test_pan_ignored_while_following() {
        let c = cfg();
        let mut am = controller(&c);
        let target = FollowTarget { origin: Vec2::new(100.0, 100.0), angle_deg: 0.0 };
        am.open(true, true, Some(target), &c);
        let input = AutomapInput { pan: Vec2::new(1.0, 1.0), zoom: 1.0 };
        let scale = am.camera().scale.target;
        am.tick(0.1, input, Some(target), &c);
        assert_eq!(am.camera().origin(), Vec2::new(100.0, 100.0));
        assert_eq!(am.camera().scale.target, scale);
    }

    #[test]
    fn test_zoom_in_and_out() {
        let mut c = cfg();
        c.follow = false;
        let mut am = controller(&c);
        am.open(true, true, None, &c);
        let before = am.camera().scale.target;
        am.tick(0.1, AutomapInput { pan: Vec2::ZERO, zoom: 1.0 }, None, &c);
        let zoomed_in = am.camera().scale.target;
        assert!(zoomed_in > before);
        am.tick(0.1, AutomapInput { pan: Vec2::ZERO, zoom: -1.0 }, None, &c);
        assert!(am.camera().scale.target < zoomed_in);
    }

    #[test]
    fn test_closed_map_ignores_input() {
        let mut c = cfg();
        c.follow = false;
        let mut am = controller(&c);
        let start = am.camera().origin();
        am.tick(0.5, AutomapInput { pan: Vec2::ONE, zoom: 1.0 }, None, &c);
        assert_eq!(am.camera().origin(), start);
    }

    #[test]
    fn test_region_tracks_camera() {
        let c = cfg();
        let mut am = controller(&c);
        am.set_pixel_geometry(Vec2::new(320.0, 200.0));
        am.set_camera_origin(Vec2::new(300.0, 300.0), true);
        am.tick(0.0, AutomapInput::default(), None, &c);
        assert!(am.region().contains(Vec2::new(300.0, 300.0)));
        let center = (am.region().min + am.region().max) * 0.5;
        assert!(center.abs_diff_eq(Vec2::new(300.0, 300.0), 1.0e-3));
    }

    #[test]
    fn test_resize_updates_scale_bounds() {
        let c = cfg();
        let mut am = controller(&c);
        am.set_pixel_geometry(Vec2::new(640.0, 400.0));
        let b = am.camera().scale_bounds();
        assert!((b.max - 400.0 / c.min_user_scale).abs() < 1.0e-4);
    }

    #[test]
    fn test_reset_clears_points_and_closes() {
        let c = cfg();
        let mut am = controller(&c);
        am.open(true, true, None, &c);
        am.set_revealed(true);
        am.add_point(Vec3::new(1.0, 2.0, 0.0));
        am.add_point(Vec3::new(3.0, 4.0, 0.0));
        am.reset(&square_level(), &c);
        assert_eq!(am.points().len(), 0);
        assert!(!am.is_open());
        assert!(!am.is_revealed());
        assert_eq!(am.phase(), AutomapPhase::Closed);
        assert_eq!(am.add_point(Vec3::ZERO), 0);
    }

    #[test]
    fn test_reveal_leaves_camera_alone() {
        let c = cfg();
        let mut am = controller(&c);
        let before = am.camera().clone();
        am.set_revealed(true);
        assert_eq!(am.camera(), &before);
    }

    #[test]
    fn test_line_style_once_per_frame() {
        let c = cfg();
        let level = square_level();
        let table = StyleRuleTable::for_game(crate::palette::GameMode::Doom, &c).unwrap();
        let mut am = controller(&c);
        am.begin_frame(&level);
        let first = am.line_style(0, &table, &level, true);
        assert!(first.is_some_and(|cl| cl.should_draw()));
        assert!(am.line_style(0, &table, &level, true).is_none());
    }
}
