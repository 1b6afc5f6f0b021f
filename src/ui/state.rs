/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::automap::{AutomapController, AutomapInput, FollowTarget};
use crate::config::AutomapConfig;
use crate::map::{LevelGeometry, MappedLines};
use crate::palette::GameMode;
use crate::player::{MapActor, Player};
use crate::style::StyleRuleTable;

/// Automap Input Gathered This Frame, Shared by Every Local Controller
#[derive(Resource, Debug, Clone, Default)]
pub struct AutomapHudState {
    pub input: AutomapInput,
    /// Pan / Zoom / Mark Keys Only Live While a Map is Open
    pub bindings_active: bool,
}

/// Follow Targets by Player Slot
pub(crate) fn follow_targets<'a>(actors: impl Iterator<Item = (&'a Player, &'a MapActor)>) -> Vec<(usize, FollowTarget)> {
    actors.map(|(p, a)| (p.slot, a.follow_target())).collect()
}

pub(crate) fn follow_for(am: &AutomapController, targets: &[(usize, FollowTarget)]) -> Option<FollowTarget> {
    let slot = am.follow_player()?;
    targets.iter().find(|(s, _)| *s == slot).map(|(_, t)| *t)
}

pub(crate) fn on_level_loaded(
    level: Res<LevelGeometry>,
    game: Res<GameMode>,
    cfg: Res<AutomapConfig>,
    mut table: ResMut<StyleRuleTable>,
    mut clear_color: ResMut<ClearColor>,
    mut hud: ResMut<AutomapHudState>,
    mut q: Query<(&mut AutomapController, Option<&mut MappedLines>)>,
) {
    // A failed rebuild keeps last map's styles
    match StyleRuleTable::for_game(*game, &cfg) {
        Ok(fresh) => *table = fresh,
        Err(err) => error!("automap styles not rebuilt: {err}"),
    }
    clear_color.0 = table.background_color.into();

    for (mut am, mapped) in &mut q {
        am.reset(&level, &cfg);
        if let Some(mut mapped) = mapped {
            mapped.reset(level.lines.len());
        }
    }
    hud.bindings_active = false;

    info!(
        "automap ready: {} lines, {} things, {} style rules",
        level.lines.len(),
        level.things.len(),
        table.len()
    );
}

pub(crate) fn sync_widget_size(
    window: Single<&Window, With<PrimaryWindow>>,
    mut q: Query<&mut AutomapController>,
) {
    let size = window.resolution.size();
    for mut am in &mut q {
        am.set_pixel_geometry(size);
    }
}

pub(crate) fn tick_automaps(
    time: Res<Time>,
    cfg: Res<AutomapConfig>,
    hud: Res<AutomapHudState>,
    q_actors: Query<(&Player, &MapActor)>,
    mut q: Query<&mut AutomapController>,
) {
    let targets = follow_targets(q_actors.iter());
    let dt = time.delta_secs();
    for mut am in &mut q {
        let follow = follow_for(&am, &targets);
        am.tick(dt, hud.input, follow, &cfg);
    }
}
