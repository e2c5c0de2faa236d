//! Texture placement mapping: user transform -> UV sampler parameters.
//!
//! ```text
//! rotation = degrees * PI / 180
//! repeat   = max(MIN_REPEAT, scale / SCALE_PERCENT_PER_REPEAT)   (x == y)
//! offset   = (x / PIXELS_PER_UV_UNIT, -y / PIXELS_PER_UV_UNIT)
//! center   = (0.5, 0.5)
//! ```
//!
//! Y is negated because screen/image Y grows down while texture V grows up.
//! The mapping is pure: identical input yields bit-identical output.

use std::f32::consts::PI;

use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};

use super::region::Region;
use super::transform::TransformState;

/// Scale percent that maps to a repeat factor of 1.
pub const SCALE_PERCENT_PER_REPEAT: f32 = 100.0;
/// Screen pixels per UV unit of offset.
pub const PIXELS_PER_UV_UNIT: f32 = 100.0;
/// Repeat floor; keeps the sampler away from zero/negative repeat.
pub const MIN_REPEAT: f32 = 0.05;

/// UV rotation pivot.
pub const UV_CENTER: Vec2 = Vec2::new(0.5, 0.5);

/// Texture edge behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Decal on one region, no bleed across UV seams
    ClampToEdge,
    /// Tiled base textures
    Repeat,
}

/// Texture filtering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Linear, no mipmaps: crisp decal edges at any scale
    LinearNoMips,
    /// Linear with mipmaps: tiled textures at varying zoom
    Mipmapped,
}

/// What a texture is used for; selects wrap and sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureRole {
    Decal,
    Base,
}

impl TextureRole {
    pub fn wrap(&self) -> WrapMode {
        match self {
            TextureRole::Decal => WrapMode::ClampToEdge,
            TextureRole::Base => WrapMode::Repeat,
        }
    }

    pub fn sampling(&self) -> Sampling {
        match self {
            TextureRole::Decal => Sampling::LinearNoMips,
            TextureRole::Base => Sampling::Mipmapped,
        }
    }
}

/// Normalization constants of the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub scale_divisor: f32,
    pub position_divisor: f32,
    pub min_repeat: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            scale_divisor: SCALE_PERCENT_PER_REPEAT,
            position_divisor: PIXELS_PER_UV_UNIT,
            min_repeat: MIN_REPEAT,
        }
    }
}

impl PlacementConfig {
    /// Replace non-positive or non-finite constants with the defaults.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let pick = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            scale_divisor: pick(self.scale_divisor, d.scale_divisor),
            position_divisor: pick(self.position_divisor, d.position_divisor),
            min_repeat: pick(self.min_repeat, d.min_repeat),
        }
    }
}

/// Sampler parameters for one texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvTextureParams {
    pub repeat: Vec2,
    pub offset: Vec2,
    pub rotation_rad: f32,
    pub center: Vec2,
    pub wrap: WrapMode,
    pub sampling: Sampling,
}

impl UvTextureParams {
    /// Untransformed parameters for `role`.
    pub fn identity(role: TextureRole) -> Self {
        Self {
            repeat: Vec2::ONE,
            offset: Vec2::ZERO,
            rotation_rad: 0.0,
            center: UV_CENTER,
            wrap: role.wrap(),
            sampling: role.sampling(),
        }
    }

    /// Tiled parameters (base/fabric textures).
    pub fn tiled(repeat: f32) -> Self {
        Self {
            repeat: Vec2::splat(repeat.max(MIN_REPEAT)),
            ..Self::identity(TextureRole::Base)
        }
    }

    /// 3x3 UV transform, same layout as the usual WebGL `setUvTransform`:
    ///
    /// ```text
    /// | sx*c   sx*s   -sx*( c*cx + s*cy) + cx + tx |
    /// | -sy*s  sy*c   -sy*(-s*cx + c*cy) + cy + ty |
    /// | 0      0      1                            |
    /// ```
    pub fn uv_matrix(&self) -> Mat3 {
        let (s, c) = self.rotation_rad.sin_cos();
        let (sx, sy) = (self.repeat.x, self.repeat.y);
        let (cx, cy) = (self.center.x, self.center.y);
        let (tx, ty) = (self.offset.x, self.offset.y);
        // glam is column-major
        Mat3::from_cols_array(&[
            sx * c,
            -sy * s,
            0.0,
            sx * s,
            sy * c,
            0.0,
            -sx * (c * cx + s * cy) + cx + tx,
            -sy * (-s * cx + c * cy) + cy + ty,
            1.0,
        ])
    }

    /// Transform a mesh UV into texture space.
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        self.uv_matrix().transform_point2(uv)
    }
}

/// Map a transform on `region` to decal sampler parameters.
///
/// Region is part of the signature so per-region policy can be added without
/// touching callers; all regions currently share the same constants.
pub fn map_placement(state: &TransformState, _region: Region, config: &PlacementConfig) -> UvTextureParams {
    let config = config.sanitized();
    let repeat = (state.scale / config.scale_divisor).max(config.min_repeat);
    let repeat = if repeat.is_nan() { config.min_repeat } else { repeat };
    let position = if state.position.is_finite() { state.position } else { Vec2::ZERO };
    let rotation_deg = if state.rotation_deg.is_finite() { state.rotation_deg } else { 0.0 };

    UvTextureParams {
        repeat: Vec2::splat(repeat),
        offset: Vec2::new(
            position.x / config.position_divisor,
            -position.y / config.position_divisor,
        ),
        rotation_rad: rotation_deg * PI / 180.0,
        center: UV_CENTER,
        wrap: TextureRole::Decal.wrap(),
        sampling: TextureRole::Decal.sampling(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(x: f32, y: f32, scale: f32, rot: f32) -> TransformState {
        TransformState {
            position: Vec2::new(x, y),
            scale,
            rotation_deg: rot,
            ..Default::default()
        }
    }

    #[test]
    fn test_front_identity_scenario() {
        let p = map_placement(&state(0.0, 0.0, 100.0, 0.0), Region::Front, &PlacementConfig::default());
        assert_eq!(p.repeat, Vec2::new(1.0, 1.0));
        assert_eq!(p.offset, Vec2::ZERO);
        assert_eq!(p.rotation_rad, 0.0);
        assert_eq!(p.center, Vec2::new(0.5, 0.5));
        assert_eq!(p.wrap, WrapMode::ClampToEdge);
        assert_eq!(p.sampling, Sampling::LinearNoMips);
    }

    #[test]
    fn test_repeat_uniform_and_floored() {
        let cfg = PlacementConfig::default();
        let mut scale = 20.0;
        while scale <= 300.0 {
            let p = map_placement(&state(0.0, 0.0, scale, 0.0), Region::Back, &cfg);
            assert_eq!(p.repeat.x, p.repeat.y);
            assert_eq!(p.repeat.x, (scale / cfg.scale_divisor).max(cfg.min_repeat));
            scale += 7.5;
        }
        let tiny = map_placement(&state(0.0, 0.0, 0.0, 0.0), Region::Back, &cfg);
        assert_eq!(tiny.repeat, Vec2::splat(MIN_REPEAT));
        let negative = map_placement(&state(0.0, 0.0, -50.0, 0.0), Region::Back, &cfg);
        assert!(negative.repeat.x > 0.0);
    }

    #[test]
    fn test_rotation_radians_round_trip() {
        for deg in [-180.0f32, -90.0, -33.3, 0.0, 45.0, 179.9, 360.0] {
            let p = map_placement(&state(0.0, 0.0, 100.0, deg), Region::Front, &PlacementConfig::default());
            assert_eq!(p.rotation_rad, deg * PI / 180.0);
            assert!((p.rotation_rad.to_degrees() - deg).abs() < 1e-3);
        }
    }

    #[test]
    fn test_offset_y_inverted() {
        let cfg = PlacementConfig::default();
        let down = map_placement(&state(30.0, 40.0, 100.0, 0.0), Region::Front, &cfg);
        assert!(down.offset.y < 0.0);
        assert_eq!(down.offset.x, 0.3);
        let up = map_placement(&state(0.0, -40.0, 100.0, 0.0), Region::Front, &cfg);
        assert!(up.offset.y > 0.0);
    }

    #[test]
    fn test_mapping_is_pure() {
        let cfg = PlacementConfig::default();
        let s = state(12.5, -7.25, 137.0, -61.0);
        let a = map_placement(&s, Region::LeftSleeve, &cfg);
        let b = map_placement(&s, Region::LeftSleeve, &cfg);
        assert_eq!(a.repeat.x.to_bits(), b.repeat.x.to_bits());
        assert_eq!(a.offset.x.to_bits(), b.offset.x.to_bits());
        assert_eq!(a.offset.y.to_bits(), b.offset.y.to_bits());
        assert_eq!(a.rotation_rad.to_bits(), b.rotation_rad.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_config_falls_back() {
        let cfg = PlacementConfig { scale_divisor: 0.0, position_divisor: f32::NAN, min_repeat: -1.0 };
        let p = map_placement(&state(100.0, 0.0, 100.0, 0.0), Region::Front, &cfg);
        assert_eq!(p.repeat, Vec2::ONE);
        assert_eq!(p.offset.x, 1.0);
    }

    #[test]
    fn test_uv_matrix_identity_and_offset() {
        let id = UvTextureParams::identity(TextureRole::Decal);
        let uv = Vec2::new(0.25, 0.75);
        assert!((id.apply(uv) - uv).length() < 1e-6);

        let shifted = UvTextureParams { offset: Vec2::new(0.1, -0.2), ..id };
        assert!((shifted.apply(uv) - Vec2::new(0.35, 0.55)).length() < 1e-6);
    }

    #[test]
    fn test_uv_matrix_keeps_center_fixed() {
        let p = UvTextureParams {
            repeat: Vec2::splat(2.0),
            rotation_rad: 1.1,
            ..UvTextureParams::identity(TextureRole::Decal)
        };
        assert!((p.apply(UV_CENTER) - UV_CENTER).length() < 1e-6);
        // repeat 2 doubles distances from center
        let edge = p.apply(Vec2::new(1.0, 0.5));
        assert!(((edge - UV_CENTER).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_base_role_tiles() {
        let t = UvTextureParams::tiled(4.0);
        assert_eq!(t.wrap, WrapMode::Repeat);
        assert_eq!(t.sampling, Sampling::Mipmapped);
        assert_eq!(t.repeat, Vec2::splat(4.0));
    }
}
