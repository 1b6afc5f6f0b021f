/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

use crate::map::MapBounds;

/// Starting Zoom (Pixels per Map Unit) Before Any Input
const DEFAULT_VIEW_SCALE: f32 = 0.5;

/// Legal Map-to-Frame Scale Range for the Current Map + Widget Size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    /// Whole Map Fits the Widget
    pub min: f32,
    /// 'min_user_scale' Map Units Fill the Widget Height
    pub max: f32,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.01, max: 20.0 }
    }
}

impl ScaleBounds {
    pub fn compute(map: &MapBounds, widget_px: Vec2, min_user_scale: f32) -> Self {
        if widget_px.x <= 0.0 || widget_px.y <= 0.0 {
            return Self::default();
        }
        let max = widget_px.y / min_user_scale.max(f32::EPSILON);
        let diagonal = map.diagonal();
        let min = if diagonal > f32::EPSILON {
            widget_px.x.min(widget_px.y) / diagonal
        } else {
            max
        };
        // Tiny maps: can't zoom out past "fully zoomed in"
        Self { min, max: max.max(min) }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }

    pub fn default_scale(&self) -> f32 {
        self.clamp(DEFAULT_VIEW_SCALE)
    }
}

/// What the Automap Can Currently See, in Map Space
/// Derived From the Camera Every Tick, Never Edited Directly
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibleRegion {
    // Border-inset view rectangle, rotated with the camera
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
    // Conservative culling box around the full rotated rectangle
    pub min: Vec2,
    pub max: Vec2,
}

impl VisibleRegion {
    pub fn recompute(
        &mut self,
        origin: Vec2,
        angle_deg: f32,
        frame_to_map: f32,
        widget_px: Vec2,
        border_px: f32,
    ) {
        let half = widget_px * 0.5 * frame_to_map;
        let border = border_px * frame_to_map;
        let inset = (half - Vec2::splat(border)).max(Vec2::ZERO);
        let rot = Vec2::from_angle(angle_deg.to_radians());

        self.top_left = origin + rot.rotate(Vec2::new(-inset.x, inset.y));
        self.top_right = origin + rot.rotate(Vec2::new(inset.x, inset.y));
        self.bottom_left = origin + rot.rotate(Vec2::new(-inset.x, -inset.y));
        self.bottom_right = origin + rot.rotate(Vec2::new(inset.x, -inset.y));

        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for corner in [
            Vec2::new(-half.x, half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
        ] {
            let p = origin + rot.rotate(corner);
            min = min.min(p);
            max = max.max(p);
        }
        self.min = min;
        self.max = max;
    }

    /// Inset Corners in TL, TR, BR, BL Order
    pub fn corners(&self) -> [Vec2; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    pub fn overlaps(&self, min: Vec2, max: Vec2) -> bool {
        !(max.x < self.min.x || min.x > self.max.x || max.y < self.min.y || min.y > self.max.y)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.overlaps(p, p)
    }

    /// Pull 'point' Back Inside the Inset Rectangle Along the Line From 'viewer'
    pub fn fit_point(&self, point: Vec2, viewer: Vec2) -> Vec2 {
        fit_point_in_rectangle(
            point,
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
            viewer,
        )
    }
}

/// Map Space -> Widget Space (Origin at Widget Centre, Y Up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub origin: Vec2,
    pub angle_deg: f32,
    /// Pixels per Map Unit
    pub scale: f32,
}

impl ViewTransform {
    pub fn apply(&self, p: Vec2) -> Vec2 {
        let unrotate = Vec2::from_angle(-self.angle_deg.to_radians());
        unrotate.rotate(p - self.origin) * self.scale
    }

    /// Facing Angle as Seen on Screen
    pub fn screen_angle(&self, map_angle_deg: f32) -> f32 {
        map_angle_deg - self.angle_deg
    }
}

// Segment a0-a1 vs segment b0-b1
fn intersect_segments(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<Vec2> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.perp_dot(s);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let qp = b0 - a0;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a0 + r * t)
    } else {
        None
    }
}

/// Where the Trace From 'viewer' to 'point' Leaves the Rectangle
/// Left + Bottom Edges are Tried Before Right + Top
/// A Point Already Inside Comes Back Unchanged
pub fn fit_point_in_rectangle(
    point: Vec2,
    top_left: Vec2,
    top_right: Vec2,
    bottom_right: Vec2,
    bottom_left: Vec2,
    viewer: Vec2,
) -> Vec2 {
    let edges = [
        (top_left, bottom_left),
        (bottom_left, bottom_right),
        (bottom_right, top_right),
        (top_right, top_left),
    ];
    edges
        .iter()
        .find_map(|&(e0, e1)| intersect_segments(viewer, point, e0, e1))
        .unwrap_or(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_bounds_for_square_map() {
        let map = MapBounds::new(Vec2::ZERO, Vec2::splat(1000.0));
        let b = ScaleBounds::compute(&map, Vec2::new(320.0, 200.0), 16.0);
        let expected = 200.0 / std::f32::consts::SQRT_2 / 1000.0;
        assert!((b.min - expected).abs() < 1.0e-5);
        assert!((b.max - 12.5).abs() < 1.0e-5);
        assert_eq!(b.clamp(0.0), b.min);
    }

    #[test]
    fn test_scale_bounds_degenerate_inputs() {
        let empty = MapBounds::default();
        let b = ScaleBounds::compute(&empty, Vec2::new(320.0, 200.0), 16.0);
        assert_eq!(b.min, b.max);

        let map = MapBounds::new(Vec2::ZERO, Vec2::splat(1000.0));
        assert_eq!(ScaleBounds::compute(&map, Vec2::ZERO, 16.0), ScaleBounds::default());
    }

    #[test]
    fn test_unrotated_region() {
        let mut r = VisibleRegion::default();
        r.recompute(Vec2::new(100.0, 50.0), 0.0, 2.0, Vec2::new(320.0, 200.0), 4.0);
        // 160x100 px half extents -> 320x200 map units, 8 unit border
        assert!(r.top_left.abs_diff_eq(Vec2::new(100.0 - 312.0, 50.0 + 192.0), 1.0e-3));
        assert!(r.bottom_right.abs_diff_eq(Vec2::new(100.0 + 312.0, 50.0 - 192.0), 1.0e-3));
        assert!(r.min.abs_diff_eq(Vec2::new(-220.0, -150.0), 1.0e-3));
        assert!(r.max.abs_diff_eq(Vec2::new(420.0, 250.0), 1.0e-3));
    }

    #[test]
    fn test_aabb_contains_rotated_full_rect_for_every_angle() {
        let origin = Vec2::new(-30.0, 75.0);
        let widget = Vec2::new(320.0, 200.0);
        let f2m = 1.5;
        let half = widget * 0.5 * f2m;
        let mut r = VisibleRegion::default();

        let mut angle = 0.0_f32;
        while angle < 360.0 {
            r.recompute(origin, angle, f2m, widget, 4.0);
            let rot = Vec2::from_angle(angle.to_radians());
            for c in [
                Vec2::new(-half.x, half.y),
                Vec2::new(half.x, half.y),
                Vec2::new(-half.x, -half.y),
                Vec2::new(half.x, -half.y),
            ] {
                let p = origin + rot.rotate(c);
                assert!(p.x >= r.min.x - 1.0e-3 && p.x <= r.max.x + 1.0e-3, "angle {angle}");
                assert!(p.y >= r.min.y - 1.0e-3 && p.y <= r.max.y + 1.0e-3, "angle {angle}");
            }
            // Inset corners sit inside the box too
            for c in r.corners() {
                assert!(r.contains(c), "angle {angle}");
            }
            angle += 7.5;
        }
    }

    #[test]
    fn test_rotated_box_is_looser_than_rect() {
        let mut r = VisibleRegion::default();
        r.recompute(Vec2::ZERO, 45.0, 1.0, Vec2::new(100.0, 100.0), 0.0);
        let reach = 50.0 * std::f32::consts::SQRT_2;
        assert!((r.max.x - reach).abs() < 1.0e-3);
        assert!((r.min.y + reach).abs() < 1.0e-3);
    }

    #[test]
    fn test_fit_point_inside_is_unchanged() {
        let mut r = VisibleRegion::default();
        r.recompute(Vec2::ZERO, 30.0, 1.0, Vec2::new(100.0, 100.0), 0.0);
        let p = Vec2::new(10.0, -5.0);
        assert_eq!(r.fit_point(p, Vec2::ZERO), p);
    }

    #[test]
    fn test_fit_point_clamps_to_edge() {
        let mut r = VisibleRegion::default();
        r.recompute(Vec2::ZERO, 0.0, 1.0, Vec2::new(100.0, 100.0), 0.0);
        let fitted = r.fit_point(Vec2::new(100.0, 0.0), Vec2::ZERO);
        assert!(fitted.abs_diff_eq(Vec2::new(50.0, 0.0), 1.0e-3));

        let fitted = r.fit_point(Vec2::new(-200.0, -100.0), Vec2::ZERO);
        assert!(fitted.abs_diff_eq(Vec2::new(-50.0, -25.0), 1.0e-3));
    }

    #[test]
    fn test_view_transform_undoes_region_rotation() {
        let xf = ViewTransform { origin: Vec2::new(10.0, 20.0), angle_deg: 90.0, scale: 2.0 };
        let mut r = VisibleRegion::default();
        r.recompute(xf.origin, xf.angle_deg, 1.0 / xf.scale, Vec2::new(100.0, 60.0), 0.0);
        // Top-right corner lands back on the widget's top-right
        assert!(xf.apply(r.top_right).abs_diff_eq(Vec2::new(50.0, 30.0), 1.0e-3));
        assert!(xf.apply(xf.origin).abs_diff_eq(Vec2::ZERO, 1.0e-6));
    }

    #[test]
    fn test_fit_point_under_rotation() {
        let mut r = VisibleRegion::default();
        r.recompute(Vec2::ZERO, 45.0, 1.0, Vec2::new(100.0, 100.0), 0.0);
        // Rotated square's right edge now faces up-right, midpoint 50 units out
        let fitted = r.fit_point(Vec2::new(300.0, 300.0), Vec2::ZERO);
        let m = 50.0 / std::f32::consts::SQRT_2;
        assert!(fitted.abs_diff_eq(Vec2::new(m, m), 1.0e-2));
    }
}
