/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "automap.ron";

/// User RGB Overrides (0..1 per Channel)
/// Only Used When 'AutomapConfig::custom_colors' is Set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserColors {
    pub background: [f32; 3],
    pub unseen_line: [f32; 3],
    pub one_sided_line: [f32; 3],
    pub two_sided_line: [f32; 3],
    pub floor_change_line: [f32; 3],
    pub ceiling_change_line: [f32; 3],
    pub things: [f32; 3],
}

impl Default for UserColors {
    fn default() -> Self {
        Self {
            background: [0.0, 0.0, 0.0],
            unseen_line: [0.4, 0.4, 0.4],
            one_sided_line: [0.7, 0.0, 0.0],
            two_sided_line: [0.5, 0.5, 0.5],
            floor_change_line: [0.75, 0.5, 0.3],
            ceiling_change_line: [0.9, 0.9, 0.4],
            things: [0.2, 1.0, 0.2],
        }
    }
}

/// Automap Settings Snapshot
/// Read Every Tick / Draw, Never Mutated by the Automap Itself
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomapConfig {
    /// Multiplier on Every Line's Alpha
    /// Range: 0.0 ..= 1.0
    pub line_alpha: f32,
    /// Fully Open Map Opacity
    /// Range: 0.0 ..= 1.0
    pub opacity: f32,
    /// Multiplier on Glow Strength, 0 Disables Glow
    /// Range: 0.0 ..= 2.0
    pub glow_amount: f32,
    /// Base Line Thickness in Pixels
    pub line_width: f32,
    /// Range: 0.0 ..= 1.0
    pub pan_speed: f32,
    /// Range: 0.0 ..= 1.0
    pub zoom_speed: f32,
    /// Opacity Fade Progress per Second
    pub fade_rate: f32,
    /// Position / Scale / Angle Easing Progress per Second
    pub camera_rate: f32,
    pub rotate: bool,
    pub follow: bool,
    /// Snap Camera Back to the Player Every Time the Map Opens
    pub reset_pan_on_open: bool,
    /// Color Locked Doors (Registers Door Rules on Map Load)
    pub show_doors: bool,
    pub custom_colors: bool,
    pub colors: UserColors,
    /// Map Units: Camera Moves Further Than This Jump Instead of Gliding
    pub max_position_delta: f32,
    /// Map Units Still Visible Vertically at Full Zoom In
    pub min_user_scale: f32,
    /// Inset Applied When Keeping Marker Labels on Screen
    pub border_px: f32,
}

impl Default for AutomapConfig {
    fn default() -> Self {
        Self {
            line_alpha: 1.0,
            opacity: 0.7,
            glow_amount: 1.0,
            line_width: 1.1,
            pan_speed: 0.5,
            zoom_speed: 0.1,
            fade_rate: 4.0,
            camera_rate: 2.5,
            rotate: false,
            follow: true,
            reset_pan_on_open: true,
            show_doors: true,
            custom_colors: false,
            colors: UserColors::default(),
            max_position_delta: 128.0,
            min_user_scale: 16.0,
            border_px: 4.0,
        }
    }
}

impl AutomapConfig {
    fn config_path() -> Option<PathBuf> {
        #[cfg(debug_assertions)]
        {
            // Debug builds: keep next to the project
            let mut p = std::env::current_dir().ok()?;
            p.push(CONFIG_FILE);
            Some(p)
        }
        #[cfg(not(debug_assertions))]
        {
            dirs::config_dir().and_then(|mut p| {
                p.push("hudmap");
                std::fs::create_dir_all(&p).ok()?;
                p.push(CONFIG_FILE);
                Some(p)
            })
        }
    }

    /// Missing File = Defaults, Broken File = Defaults + Warning
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::from_ron(&contents).unwrap_or_else(|err| {
            warn!("automap config {} is invalid ({err}), using defaults", path.display());
            Self::default()
        })
    }

    pub fn from_ron(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str::<Self>(contents).map(Self::sanitized)
    }

    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        match ron::ser::to_string_pretty(self, Default::default()) {
            Ok(contents) => {
                if let Err(err) = std::fs::write(&path, contents) {
                    warn!("failed to write {}: {err}", path.display());
                }
            }
            Err(err) => warn!("failed to serialize automap config: {err}"),
        }
    }

    /// Clamp Everything Into the Ranges Documented Above
    pub fn sanitized(mut self) -> Self {
        self.line_alpha = self.line_alpha.clamp(0.0, 1.0);
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.glow_amount = self.glow_amount.clamp(0.0, 2.0);
        self.line_width = self.line_width.max(0.1);
        self.pan_speed = self.pan_speed.clamp(0.0, 1.0);
        self.zoom_speed = self.zoom_speed.clamp(0.0, 1.0);
        self.fade_rate = self.fade_rate.max(0.01);
        self.camera_rate = self.camera_rate.max(0.01);
        self.max_position_delta = self.max_position_delta.max(0.0);
        self.min_user_scale = self.min_user_scale.max(1.0);
        self.border_px = self.border_px.max(0.0);
        self
    }

    /// Map Pan Speed in *Frame* Pixels per Second
    pub fn pan_pixels_per_sec(&self) -> f32 {
        // Full speed crosses a 320-wide widget in about a second
        self.pan_speed * 320.0 + 40.0
    }

    /// Multiplicative Zoom Step per Second of Held Input
    pub fn zoom_factor_per_sec(&self) -> f32 {
        1.0 + 2.0 * self.zoom_speed * 35.0 / 10.0
    }
}

/// Rebindable Automap Keys
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomapKeys {
    pub toggle: KeyCode,
    pub follow: KeyCode,
    pub rotate: KeyCode,
    pub zoom_max: KeyCode,
    pub zoom_in: KeyCode,
    pub zoom_out: KeyCode,
    pub pan_up: KeyCode,
    pub pan_down: KeyCode,
    pub pan_left: KeyCode,
    pub pan_right: KeyCode,
    pub add_mark: KeyCode,
    pub clear_marks: KeyCode,
    pub reveal: KeyCode,
    pub show_things: KeyCode,
}

impl Default for AutomapKeys {
    fn default() -> Self {
        Self {
            toggle:      KeyCode::Tab,
            follow:      KeyCode::KeyF,
            rotate:      KeyCode::KeyR,
            zoom_max:    KeyCode::Digit0,
            zoom_in:     KeyCode::Equal,
            zoom_out:    KeyCode::Minus,
            pan_up:      KeyCode::ArrowUp,
            pan_down:    KeyCode::ArrowDown,
            pan_left:    KeyCode::ArrowLeft,
            pan_right:   KeyCode::ArrowRight,
            add_mark:    KeyCode::KeyM,
            clear_marks: KeyCode::KeyC,
            reveal:      KeyCode::F7,
            show_things: KeyCode::F8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let cfg = AutomapConfig::from_ron("(rotate: true, pan_speed: 0.25)").unwrap();
        assert!(cfg.rotate);
        assert_eq!(cfg.pan_speed, 0.25);
        assert_eq!(cfg.max_position_delta, 128.0);
        assert_eq!(cfg.colors, UserColors::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let cfg = AutomapConfig::from_ron("(line_alpha: 3.0, opacity: -1.0, min_user_scale: 0.0)").unwrap();
        assert_eq!(cfg.line_alpha, 1.0);
        assert_eq!(cfg.opacity, 0.0);
        assert_eq!(cfg.min_user_scale, 1.0);
    }

    #[test]
    fn test_round_trip_through_ron() {
        let mut cfg = AutomapConfig::default();
        cfg.custom_colors = true;
        cfg.colors.things = [1.0, 0.5, 0.0];
        let text = ron::ser::to_string_pretty(&cfg, Default::default()).unwrap();
        assert_eq!(AutomapConfig::from_ron(&text).unwrap(), cfg);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(AutomapConfig::from_ron("not ron at all").is_err());
    }
}
