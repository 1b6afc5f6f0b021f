/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

use crate::automap::FollowTarget;
use crate::map::{LevelGeometry, LineFlags, MappedLines};

/// Map Units
pub const PLAYER_RADIUS: f32 = 16.0;

#[derive(Component, Debug, Clone, Copy)]
pub struct Player {
    pub slot: usize,
}

/// Position + Facing in Map Space (Degrees, 0 = East, CCW)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MapActor {
    pub origin: Vec2,
    pub angle_deg: f32,
}

impl MapActor {
    pub fn facing(&self) -> Vec2 {
        Vec2::from_angle(self.angle_deg.to_radians())
    }

    pub fn follow_target(&self) -> FollowTarget {
        FollowTarget {
            origin: self.origin,
            angle_deg: self.angle_deg,
        }
    }
}

#[derive(Resource)]
pub struct PlayerSettings {
    /// Map Units per Second
    speed: f32,
    /// Degrees per Second
    turn_speed: f32,
    /// Lines Closer Than This Get Mapped
    sight_radius: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: 256.0,
            turn_speed: 180.0,
            sight_radius: 384.0,
        }
    }
}

/// Any Blocking Line Within 'radius' of 'pos'
pub fn collides(level: &LevelGeometry, pos: Vec2, radius: f32) -> bool {
    let r = Vec2::splat(radius);
    level
        .lines_in_box(pos - r, pos + r)
        .any(|(_, l)| l.flags.contains(LineFlags::BLOCKING) && l.distance_to(pos) < radius)
}

/// Slide: Resolve X, then Y
pub fn try_move(level: &LevelGeometry, from: Vec2, step: Vec2, radius: f32) -> Vec2 {
    let mut pos = from;

    let try_x = Vec2::new(pos.x + step.x, pos.y);
    if !collides(level, try_x, radius) {
        pos.x = try_x.x;
    }

    let try_y = Vec2::new(pos.x, pos.y + step.y);
    if !collides(level, try_y, radius) {
        pos.y = try_y.y;
    }

    pos
}

pub fn player_move(
    time: Res<Time<Fixed>>,
    keys: Res<ButtonInput<KeyCode>>,
    level: Res<LevelGeometry>,
    settings: Res<PlayerSettings>,
    mut q_player: Query<&mut MapActor, With<Player>>,
) {
    let Ok(mut actor) = q_player.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    let mut turn = 0.0;
    if keys.pressed(KeyCode::KeyQ) { turn += 1.0; }
    if keys.pressed(KeyCode::KeyE) { turn -= 1.0; }
    if turn != 0.0 {
        actor.angle_deg = (actor.angle_deg + turn * settings.turn_speed * dt).rem_euclid(360.0);
    }

    // Movement Basis
    let forward = actor.facing();
    let right = -forward.perp();

    let mut wish = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) { wish += forward; }
    if keys.pressed(KeyCode::KeyS) { wish -= forward; }
    if keys.pressed(KeyCode::KeyD) { wish += right; }
    if keys.pressed(KeyCode::KeyA) { wish -= right; }

    let wish = wish.normalize_or_zero();
    if wish == Vec2::ZERO {
        return;
    }

    let step = wish * settings.speed * dt;
    actor.origin = try_move(&level, actor.origin, step, PLAYER_RADIUS);
}

/// Lines Near the Player Become "Seen" for the Automap
pub fn map_nearby_lines(
    level: Res<LevelGeometry>,
    settings: Res<PlayerSettings>,
    mut q_player: Query<(&Player, &MapActor, &mut MappedLines)>,
) {
    for (player, actor, mut mapped) in &mut q_player {
        let newly = mapped.mark_within(&level, actor.origin, settings.sight_radius);
        if newly > 0 {
            debug!("player {} mapped {} new lines", player.slot, newly);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TILE_UNITS;

    fn corridor() -> LevelGeometry {
        LevelGeometry::from_ascii(&["#####", "#...#", "#####"])
    }

    #[test]
    fn test_facing_matches_angle() {
        let actor = MapActor { origin: Vec2::ZERO, angle_deg: 90.0 };
        assert!(actor.facing().abs_diff_eq(Vec2::Y, 1.0e-6));
        assert_eq!(actor.follow_target().angle_deg, 90.0);
    }

    #[test]
    fn test_walls_block() {
        let level = corridor();
        let mid = Vec2::new(2.5 * TILE_UNITS, 1.5 * TILE_UNITS);
        assert!(!collides(&level, mid, PLAYER_RADIUS));
        // Hugging the north wall
        let near_wall = Vec2::new(mid.x, 2.0 * TILE_UNITS - 4.0);
        assert!(collides(&level, near_wall, PLAYER_RADIUS));
    }

    #[test]
    fn test_slide_along_wall() {
        let level = corridor();
        let start = Vec2::new(2.5 * TILE_UNITS, 1.5 * TILE_UNITS);
        // Diagonal into the north wall keeps the X part
        let end = try_move(&level, start, Vec2::new(10.0, 40.0), PLAYER_RADIUS);
        assert_eq!(end, Vec2::new(start.x + 10.0, start.y));
    }

    #[test]
    fn test_open_move_is_unchanged() {
        let level = corridor();
        let start = Vec2::new(2.0 * TILE_UNITS, 1.5 * TILE_UNITS);
        let end = try_move(&level, start, Vec2::new(8.0, 0.0), PLAYER_RADIUS);
        assert_eq!(end, start + Vec2::new(8.0, 0.0));
    }
}
