/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;

use super::state::{follow_for, follow_targets};
use crate::automap::AutomapController;
use crate::config::AutomapConfig;
use crate::map::{LevelGeometry, MappedLines};
use crate::player::{MapActor, Player};
use crate::render::{draw_automap, AutomapRenderer, LineDraw, VectorIcon};
use crate::style::{GlowKind, StyleRuleTable};
use crate::view::ViewTransform;

const LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_Z: f32 = 10.0;
// Glow lines are this much fainter than the line itself
const GLOW_FADE: f32 = 0.5;

// Unit shapes pointing along +X
const ARROW: [(Vec2, Vec2); 5] = [
    (Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)),
    (Vec2::new(1.0, 0.0), Vec2::new(0.5, 0.4)),
    (Vec2::new(1.0, 0.0), Vec2::new(0.5, -0.4)),
    (Vec2::new(-1.0, 0.0), Vec2::new(-1.25, 0.3)),
    (Vec2::new(-1.0, 0.0), Vec2::new(-1.25, -0.3)),
];
const TRIANGLE: [(Vec2, Vec2); 3] = [
    (Vec2::new(1.0, 0.0), Vec2::new(-0.6, 0.6)),
    (Vec2::new(-0.6, 0.6), Vec2::new(-0.6, -0.6)),
    (Vec2::new(-0.6, -0.6), Vec2::new(1.0, 0.0)),
];
const DIAMOND: [(Vec2, Vec2); 4] = [
    (Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.6)),
    (Vec2::new(0.0, 0.6), Vec2::new(-1.0, 0.0)),
    (Vec2::new(-1.0, 0.0), Vec2::new(0.0, -0.6)),
    (Vec2::new(0.0, -0.6), Vec2::new(1.0, 0.0)),
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarkerLabel {
    text: String,
    /// Screen Space
    pos: Vec2,
    color: Srgba,
}

/// Labels Produced by This Frame's Draw Pass
#[derive(Resource, Debug, Default)]
pub(crate) struct MarkerLabels(Vec<MarkerLabel>);

#[derive(Component)]
pub(crate) struct MarkerLabelText;

/// Automap Drawn With 2D Gizmos Over a Camera2d Centred on the Widget
pub struct GizmoRenderer<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    xf: ViewTransform,
    labels: &'a mut Vec<MarkerLabel>,
}

impl GizmoRenderer<'_, '_, '_> {
    fn segment(&mut self, a: Vec2, b: Vec2, color: Srgba) {
        self.gizmos.line_2d(self.xf.apply(a), self.xf.apply(b), color);
    }
}

impl AutomapRenderer for GizmoRenderer<'_, '_, '_> {
    fn draw_line(&mut self, line: &LineDraw) {
        let a = self.xf.apply(line.a);
        let b = self.xf.apply(line.b);
        self.gizmos.line_2d(a, b, line.color);

        if line.glow == GlowKind::None || line.glow_size <= 0.0 {
            return;
        }
        // Front side is to the right of v1 -> v2
        let right = -(b - a).normalize_or_zero().perp() * line.glow_size * 0.5;
        let glow = line.color.with_alpha(line.color.alpha * line.glow_strength * GLOW_FADE);
        if matches!(line.glow, GlowKind::Both | GlowKind::Front) {
            self.gizmos.line_2d(a + right, b + right, glow);
        }
        if matches!(line.glow, GlowKind::Both | GlowKind::Back) {
            self.gizmos.line_2d(a - right, b - right, glow);
        }
    }

    fn draw_vector_icon(&mut self, icon: VectorIcon, pos: Vec2, angle_deg: f32, scale: f32, color: Srgba) {
        let shape: &[(Vec2, Vec2)] = match icon {
            VectorIcon::PlayerArrow => &ARROW,
            VectorIcon::Thing => &TRIANGLE,
            VectorIcon::Key => &DIAMOND,
        };
        let rot = Vec2::from_angle(angle_deg.to_radians());
        for &(a, b) in shape {
            self.segment(pos + rot.rotate(a) * scale, pos + rot.rotate(b) * scale, color);
        }
    }

    fn draw_label(&mut self, text: &str, pos: Vec2, color: Srgba) {
        self.labels.push(MarkerLabel {
            text: text.to_string(),
            pos: self.xf.apply(pos),
            color,
        });
    }
}

pub(crate) fn draw_automaps(
    mut gizmos: Gizmos,
    cfg: Res<AutomapConfig>,
    table: Res<StyleRuleTable>,
    level: Res<LevelGeometry>,
    mut labels: ResMut<MarkerLabels>,
    q_actors: Query<(&Player, &MapActor)>,
    mut q: Query<(&mut AutomapController, &MappedLines)>,
) {
    labels.0.clear();
    let targets = follow_targets(q_actors.iter());

    for (mut am, mapped) in &mut q {
        let follow = follow_for(&am, &targets);
        let mut renderer = GizmoRenderer {
            gizmos: &mut gizmos,
            xf: am.view_transform(),
            labels: &mut labels.0,
        };
        draw_automap(&mut am, &table, &level, mapped, follow, &cfg, &mut renderer);
    }
}

/// One Text2d per Visible Mark, Reused Frame to Frame
pub(crate) fn sync_marker_labels(
    mut commands: Commands,
    labels: Res<MarkerLabels>,
    mut q: Query<(Entity, &mut Text2d, &mut Transform, &mut TextColor), With<MarkerLabelText>>,
) {
    let mut pending = labels.0.iter();

    for (entity, mut text, mut transform, mut color) in &mut q {
        match pending.next() {
            Some(label) => {
                if text.0 != label.text {
                    text.0 = label.text.clone();
                }
                transform.translation = label.pos.extend(LABEL_Z);
                color.0 = label.color.into();
            }
            None => commands.entity(entity).despawn(),
        }
    }

    for label in pending {
        commands.spawn((
            MarkerLabelText,
            Text2d::new(label.text.clone()),
            TextFont {
                font_size: LABEL_FONT_SIZE,
                ..default()
            },
            TextColor(label.color.into()),
            Transform::from_translation(label.pos.extend(LABEL_Z)),
        ));
    }
}

/// Gizmo Lines Share One Width, Taken From the Config
pub(crate) fn apply_line_width(
    cfg: Res<AutomapConfig>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = cfg.line_width * 2.0;
}
