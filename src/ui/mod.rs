/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

mod draw;
mod input;
mod state;

pub use draw::GizmoRenderer;
pub use input::AutomapBindings;
pub use state::AutomapHudState;

use crate::config::{AutomapConfig, AutomapKeys};
use crate::map::LevelGeometry;
use crate::palette::GameMode;
use crate::player::{map_nearby_lines, PlayerSettings};
use crate::style::StyleRuleTable;

pub struct AutomapPlugin;

impl Plugin for AutomapPlugin {
	fn build(&self, app: &mut App) {
		app
			// Resources
			.init_resource::<AutomapConfig>()
			.init_resource::<AutomapKeys>()
			.init_resource::<GameMode>()
			.init_resource::<StyleRuleTable>()
			.init_resource::<AutomapHudState>()
			.init_resource::<PlayerSettings>()
			.init_resource::<draw::MarkerLabels>()
			.add_message::<AutomapBindings>()
			// Map Load: Rebuild Styles + Reset Every Controller
			.add_systems(
				Update,
				state::on_level_loaded.run_if(resource_changed::<LevelGeometry>),
			)
			.add_systems(
				Update,
				draw::apply_line_width.run_if(resource_changed::<AutomapConfig>),
			)
			// Input -> Tick -> Draw, Once per Frame
			.add_systems(
				Update,
				(
					state::sync_widget_size,
					map_nearby_lines,
					input::automap_keys,
					input::apply_bindings,
					state::tick_automaps,
					draw::draw_automaps,
					draw::sync_marker_labels,
				)
					.chain()
					.after(state::on_level_loaded),
			);
	}
}
