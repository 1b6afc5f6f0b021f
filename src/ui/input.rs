/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

use super::state::{follow_for, follow_targets, AutomapHudState};
use crate::automap::{AutomapController, AutomapFlags, AutomapInput};
use crate::config::{AutomapConfig, AutomapKeys};
use crate::player::{MapActor, Player};

/// Sent When a Player's Map Opens or Closes, so Automap Keys Turn On / Off
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomapBindings {
    pub player: usize,
    pub active: bool,
}

fn axis(keys: &ButtonInput<KeyCode>, pos: KeyCode, neg: KeyCode) -> f32 {
    let mut v = 0.0;
    if keys.pressed(pos) { v += 1.0; }
    if keys.pressed(neg) { v -= 1.0; }
    v
}

/// Held Pan / Zoom Keys -> Per-Tick Input
pub(crate) fn held_input(keys: &ButtonInput<KeyCode>, bind: &AutomapKeys) -> AutomapInput {
    AutomapInput {
        pan: Vec2::new(
            axis(keys, bind.pan_right, bind.pan_left),
            axis(keys, bind.pan_up, bind.pan_down),
        ),
        zoom: axis(keys, bind.zoom_in, bind.zoom_out),
    }
}

pub(crate) fn automap_keys(
    keys: Res<ButtonInput<KeyCode>>,
    bind: Res<AutomapKeys>,
    mut cfg: ResMut<AutomapConfig>,
    mut hud: ResMut<AutomapHudState>,
    mut bindings: MessageWriter<AutomapBindings>,
    q_actors: Query<(&Player, &MapActor)>,
    mut q: Query<&mut AutomapController>,
) {
    let targets = follow_targets(q_actors.iter());

    for mut am in &mut q {
        if keys.just_pressed(bind.toggle) {
            let open = !am.is_open();
            let follow = follow_for(&am, &targets);
            if am.open(open, false, follow, &cfg) {
                bindings.write(AutomapBindings { player: am.player(), active: open });
            }
        }

        if !hud.bindings_active {
            continue;
        }

        if keys.just_pressed(bind.follow) {
            let on = !am.is_following();
            am.set_follow(on);
            cfg.follow = on;
            cfg.save();
        }
        if keys.just_pressed(bind.rotate) {
            let on = !am.is_rotating();
            am.set_rotate(on);
            cfg.rotate = on;
            cfg.save();
        }
        if keys.just_pressed(bind.zoom_max) {
            let on = !am.camera().is_zoom_max();
            am.set_zoom_max(on);
        }
        if keys.just_pressed(bind.reveal) {
            let on = !am.is_revealed();
            am.set_revealed(on);
        }
        if keys.just_pressed(bind.show_things) {
            am.toggle_flag(AutomapFlags::THINGS);
        }
        if keys.just_pressed(bind.add_mark) {
            // Marks go where the map is looking, which is the player while following
            let at = am.camera().origin();
            am.add_point(at.extend(0.0));
        }
        if keys.just_pressed(bind.clear_marks) {
            am.clear_points();
        }
    }

    hud.input = if hud.bindings_active { held_input(&keys, &bind) } else { AutomapInput::default() };
}

pub(crate) fn apply_bindings(
    mut hud: ResMut<AutomapHudState>,
    mut bindings: MessageReader<AutomapBindings>,
) {
    for ev in bindings.read() {
        hud.bindings_active = ev.active;
        debug!("automap bindings {} (player {})", if ev.active { "on" } else { "off" }, ev.player);
    }
}
