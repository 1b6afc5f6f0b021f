/*
Davenstein - by David Petnick
*/
// Automap camera easing.
//
// Every animated quantity (position, scale, angle, opacity) is a CameraAxis:
// - set_target starts a new leg from wherever the axis currently is.
// - tick advances a 0..=1 progress value and lerps previous -> target.
// - current == target exactly when progress == 1.

use bevy::prelude::*;

use crate::view::ScaleBounds;

const EPSILON: f32 = 1.0e-5;

/// Values an Axis can Ease Between
pub trait Interpolate: Copy {
    fn lerp_to(self, end: Self, t: f32) -> Self;
    fn approx_eq(self, other: Self) -> bool;
}

impl Interpolate for f32 {
    fn lerp_to(self, end: Self, t: f32) -> Self {
        self + (end - self) * t
    }

    fn approx_eq(self, other: Self) -> bool {
        (self - other).abs() <= EPSILON
    }
}

impl Interpolate for Vec2 {
    fn lerp_to(self, end: Self, t: f32) -> Self {
        self.lerp(end, t)
    }

    fn approx_eq(self, other: Self) -> bool {
        self.abs_diff_eq(other, EPSILON)
    }
}

/// Angle in Degrees, Always Kept in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Degrees(f32);

impl Degrees {
    pub fn new(deg: f32) -> Self {
        Self(wrap_degrees(deg))
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    pub fn radians(self) -> f32 {
        self.0.to_radians()
    }
}

impl Interpolate for Degrees {
    fn lerp_to(self, end: Self, t: f32) -> Self {
        Degrees(interpolate_angle(self.0, end.0, t))
    }

    fn approx_eq(self, other: Self) -> bool {
        let d = (self.0 - other.0).abs();
        d <= EPSILON || (360.0 - d) <= EPSILON
    }
}

pub fn wrap_degrees(deg: f32) -> f32 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negatives
    if r >= 360.0 { 0.0 } else { r }
}

/// Lerp Along the Short Arc, Result in [0, 360)
pub fn interpolate_angle(start: f32, end: f32, t: f32) -> f32 {
    let mut end = end;
    let diff = end - start;
    if diff > 180.0 {
        end -= 360.0;
    } else if diff < -180.0 {
        end += 360.0;
    }
    wrap_degrees(start + (end - start) * t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAxis<T> {
    pub current: T,
    pub target: T,
    pub previous: T,
    /// 0.0 = Just Started, 1.0 = Arrived
    pub progress: f32,
}

impl<T: Interpolate> CameraAxis<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            target: value,
            previous: value,
            progress: 1.0,
        }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }

    fn snap(&mut self, value: T) {
        self.current = value;
        self.previous = value;
        self.target = value;
        self.progress = 1.0;
    }

    /// Returns False When 'value' is Already the Target
    pub fn set_target(&mut self, value: T, instantly: bool) -> bool {
        if value.approx_eq(self.target) {
            return false;
        }
        // Heading back to where we already are is an arrival, not a new leg
        if instantly || value.approx_eq(self.current) {
            self.snap(value);
        } else {
            self.previous = self.current;
            self.target = value;
            self.progress = 0.0;
        }
        true
    }

    pub fn tick(&mut self, elapsed_secs: f32, rate_per_sec: f32) {
        if self.is_settled() {
            return;
        }
        self.progress = (self.progress + rate_per_sec * elapsed_secs).clamp(0.0, 1.0);
        self.current = if self.progress >= 1.0 {
            self.target
        } else {
            self.previous.lerp_to(self.target, self.progress)
        };
    }
}

/// All Four Automap Camera Axes + Scale Limits
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub position: CameraAxis<Vec2>,
    /// Map-to-Frame Scale (Pixels per Map Unit)
    pub scale: CameraAxis<f32>,
    pub angle: CameraAxis<Degrees>,
    pub opacity: CameraAxis<f32>,
    /// Map Units: Longer Moves are Never Animated
    pub max_position_delta: f32,
    bounds: ScaleBounds,
    forced_max_scale: bool,
    prior_to_max_scale: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: CameraAxis::new(Vec2::ZERO),
            scale: CameraAxis::new(1.0),
            angle: CameraAxis::new(Degrees::default()),
            opacity: CameraAxis::new(0.0),
            max_position_delta: 128.0,
            bounds: ScaleBounds::default(),
            forced_max_scale: false,
            prior_to_max_scale: 1.0,
        }
    }
}

impl CameraState {
    pub fn origin(&self) -> Vec2 {
        self.position.current
    }

    pub fn angle_deg(&self) -> f32 {
        self.angle.current.get()
    }

    /// Current Map-to-Frame Scale
    pub fn view_scale(&self) -> f32 {
        self.scale.current
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.current
    }

    pub fn scale_bounds(&self) -> ScaleBounds {
        self.bounds
    }

    pub fn is_zoom_max(&self) -> bool {
        self.forced_max_scale
    }

    #[inline]
    pub fn frame_to_map(&self, v: f32) -> f32 {
        v / self.scale.current
    }

    #[inline]
    pub fn map_to_frame(&self, v: f32) -> f32 {
        v * self.scale.current
    }

    pub fn set_position(&mut self, origin: Vec2, instantly: bool) -> bool {
        // Teleports etc. would otherwise drag the view across the whole map
        let instantly = instantly || self.position.current.distance(origin) > self.max_position_delta;
        self.position.set_target(origin, instantly)
    }

    pub fn set_angle(&mut self, deg: f32, instantly: bool) -> bool {
        self.angle.set_target(Degrees::new(deg), instantly)
    }

    pub fn set_opacity(&mut self, opacity: f32, instantly: bool) -> bool {
        self.opacity.set_target(opacity.clamp(0.0, 1.0), instantly)
    }

    /// Clamped Into the Legal Range, Pinned to the Whole-Map Scale While Zoom Max is On
    pub fn set_scale(&mut self, scale: f32, instantly: bool) -> bool {
        let wanted = if self.forced_max_scale { self.bounds.min } else { scale };
        self.scale.set_target(self.bounds.clamp(wanted), instantly)
    }

    /// Toggle "Show Whole Map", Restoring the Previous Zoom on Exit
    pub fn set_zoom_max(&mut self, on: bool) {
        let was = self.forced_max_scale;
        if on == was {
            return;
        }
        if on {
            self.prior_to_max_scale = self.scale.target;
            self.forced_max_scale = true;
            self.set_scale(self.bounds.min, false);
        } else {
            self.forced_max_scale = false;
            self.set_scale(self.prior_to_max_scale, false);
        }
    }

    /// New Limits (Map Load / Resize), Current Target Re-Clamped
    pub fn set_scale_bounds(&mut self, bounds: ScaleBounds) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        let target = self.scale.target;
        self.set_scale(target, false);
    }

    pub fn tick(&mut self, elapsed_secs: f32, camera_rate: f32, fade_rate: f32) {
        self.opacity.tick(elapsed_secs, fade_rate);
        self.position.tick(elapsed_secs, camera_rate);
        self.scale.tick(elapsed_secs, camera_rate);
        self.angle.tick(elapsed_secs, camera_rate);
    }

    /// Back to a Fresh View on Map Load (Hidden, Unrotated, at 'origin')
    pub fn reset(&mut self, origin: Vec2, bounds: ScaleBounds) {
        self.bounds = bounds;
        self.forced_max_scale = false;
        self.position = CameraAxis::new(origin);
        self.angle = CameraAxis::new(Degrees::default());
        self.opacity = CameraAxis::new(0.0);
        self.scale = CameraAxis::new(bounds.clamp(bounds.default_scale()));
        self.prior_to_max_scale = self.scale.current;
    }
}
