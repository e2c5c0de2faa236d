//! sRGB color stored as `#rrggbb` in settings and the color snapshot.

use eframe::egui;
use serde::{Deserialize, Serialize};

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Multiply all channels by `factor`, saturating at white.
    pub fn scaled(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor.max(0.0)).round().clamp(0.0, 255.0) as u8;
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }

    /// Linear blend towards `other` (t=0 -> self, t=1 -> other).
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let f = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::rgb(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color '{}', expected #rrggbb", value))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl From<Color> for egui::Color32 {
    fn from(c: Color) -> Self {
        egui::Color32::from_rgb(c.r, c.g, c.b)
    }
}

impl From<egui::Color32> for Color {
    fn from(c: egui::Color32) -> Self {
        Color::rgb(c.r(), c.g(), c.b())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!(Color::from_hex("#1a2B3c"), Some(Color::rgb(0x1a, 0x2b, 0x3c)));
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 128)).unwrap();
        assert_eq!(json, "\"#ff0080\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(255, 0, 128));
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }

    #[test]
    fn test_scaled_saturates() {
        assert_eq!(Color::rgb(200, 100, 0).scaled(2.0), Color::rgb(255, 200, 0));
        assert_eq!(Color::rgb(200, 100, 0).scaled(-1.0), Color::BLACK);
    }
}
