//! Scene presets: background, lighting, motion and fabric.
//!
//! Plain config objects. The renderer consumes them verbatim; nothing here
//! feeds back into placement.

use serde::{Deserialize, Serialize};

use super::color::Color;

/// Preview backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    Solid { color: Color },
    /// Vertical gradient, top to bottom
    Gradient { top: Color, bottom: Color },
}

impl Default for Background {
    fn default() -> Self {
        Background::Gradient {
            top: Color::rgb(0xf4, 0xf4, 0xf6),
            bottom: Color::rgb(0xc9, 0xcc, 0xd3),
        }
    }
}

impl Background {
    /// Color at normalized height `t` (0 = top, 1 = bottom).
    pub fn sample(&self, t: f32) -> Color {
        match *self {
            Background::Solid { color } => color,
            Background::Gradient { top, bottom } => top.lerp(bottom, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingPreset {
    #[default]
    Studio,
    Soft,
    Dramatic,
}

impl LightingPreset {
    pub const ALL: [LightingPreset; 3] = [LightingPreset::Studio, LightingPreset::Soft, LightingPreset::Dramatic];

    pub fn display_name(&self) -> &'static str {
        match self {
            LightingPreset::Studio => "Studio",
            LightingPreset::Soft => "Soft",
            LightingPreset::Dramatic => "Dramatic",
        }
    }

    /// (ambient, key light) intensities.
    pub fn intensities(&self) -> (f32, f32) {
        match self {
            LightingPreset::Studio => (0.6, 0.8),
            LightingPreset::Soft => (0.85, 0.35),
            LightingPreset::Dramatic => (0.25, 1.2),
        }
    }

    /// Flat shading factor used by the 2D preview.
    pub fn shade(&self) -> f32 {
        let (ambient, key) = self.intensities();
        (ambient + key * 0.5).min(1.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionPreset {
    #[default]
    Static,
    Turntable { degrees_per_second: f32 },
    Sway { amplitude: f32 },
}

impl MotionPreset {
    pub fn display_name(&self) -> &'static str {
        match self {
            MotionPreset::Static => "Static",
            MotionPreset::Turntable { .. } => "Turntable",
            MotionPreset::Sway { .. } => "Sway",
        }
    }

    /// Model yaw in degrees at `time` seconds.
    pub fn yaw_at(&self, time: f64) -> f32 {
        match *self {
            MotionPreset::Static => 0.0,
            MotionPreset::Turntable { degrees_per_second } => {
                ((time * degrees_per_second as f64) % 360.0) as f32
            }
            MotionPreset::Sway { amplitude } => (time * 1.5).sin() as f32 * amplitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FabricPreset {
    #[default]
    Smooth,
    Cotton,
    Heather,
    Denim,
}

impl FabricPreset {
    pub const ALL: [FabricPreset; 4] = [
        FabricPreset::Smooth,
        FabricPreset::Cotton,
        FabricPreset::Heather,
        FabricPreset::Denim,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FabricPreset::Smooth => "Smooth",
            FabricPreset::Cotton => "Cotton",
            FabricPreset::Heather => "Heather",
            FabricPreset::Denim => "Denim",
        }
    }

    /// Tiles across one region; `None` means no base texture.
    pub fn tile_repeat(&self) -> Option<f32> {
        match self {
            FabricPreset::Smooth => None,
            FabricPreset::Cotton => Some(24.0),
            FabricPreset::Heather => Some(12.0),
            FabricPreset::Denim => Some(16.0),
        }
    }
}

/// Everything the renderer needs besides materials.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: Background,
    pub lighting: LightingPreset,
    pub motion: MotionPreset,
    pub fabric: FabricPreset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_sample_ends() {
        let bg = Background::Gradient { top: Color::BLACK, bottom: Color::WHITE };
        assert_eq!(bg.sample(0.0), Color::BLACK);
        assert_eq!(bg.sample(1.0), Color::WHITE);
        assert_eq!(Background::Solid { color: Color::BLACK }.sample(0.7), Color::BLACK);
    }

    #[test]
    fn test_motion_yaw() {
        assert_eq!(MotionPreset::Static.yaw_at(12.0), 0.0);
        let t = MotionPreset::Turntable { degrees_per_second: 90.0 };
        assert!((t.yaw_at(5.0) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_scene_config_partial_json() {
        let cfg: SceneConfig = serde_json::from_str(r#"{"lighting":"dramatic"}"#).unwrap();
        assert_eq!(cfg.lighting, LightingPreset::Dramatic);
        assert_eq!(cfg.fabric, FabricPreset::Smooth);
    }
}
