/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use hudlib::automap::AutomapController;
use hudlib::config::AutomapConfig;
use hudlib::map::{LevelGeometry, MappedLines};
use hudlib::player::{player_move, MapActor, Player, PlayerSettings};
use hudlib::ui::AutomapPlugin;

// Small demo level exercising every automap line style
const DEMO_LEVEL: [&str; 14] = [
    "####################",
    "#......#...........#",
    "#..G...D....hhhh...#",
    "#......#....hhhh...#",
    "###S####...........#",
    "#......#....cccc...#",
    "#..k...B....cccc.G.#",
    "#......#...........#",
    "####R######Y########",
    "#........#.........#",
    "#...P....%.........#",
    "#........#.......k.E",
    "#........#.........#",
    "####################",
];

fn setup(
    mut commands: Commands,
    level: Res<LevelGeometry>,
    cfg: Res<AutomapConfig>,
) {
    commands.spawn(Camera2d);

    let (origin, angle_deg) = level.player_start.unwrap_or((level.bounds.center(), 90.0));
    commands.spawn((
        Player { slot: 0 },
        MapActor { origin, angle_deg },
        MappedLines::new(level.lines.len()),
        AutomapController::new(0, &cfg),
    ));
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(Time::<Fixed>::from_seconds(1.0 / 60.0))
        .insert_resource(AutomapConfig::load())
        .insert_resource(LevelGeometry::from_ascii(&DEMO_LEVEL))
        .init_resource::<PlayerSettings>()
        .add_plugins(AutomapPlugin)
        .add_systems(Startup, setup)
        .add_systems(FixedUpdate, player_move)
        .run();
}
