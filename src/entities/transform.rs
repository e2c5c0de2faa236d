//! Per-region placement transform and its limits.
//!
//! Units:
//! - position: screen pixels, relative to the region center, +Y down
//! - scale: percent (100 = native)
//! - rotation: degrees, clockwise-positive on screen
//! - crop: insets in wrapper pixels, measured against `crop_base_size`
//!
//! Every setter clamps; out-of-range input is never rejected.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::region::{Region, RegionRegistry};

/// Valid scale interval in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 20.0, max: 300.0 }
    }
}

impl ScaleRange {
    /// Ordered, finite and strictly positive; anything else falls back to the default.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        if !(self.min.is_finite() && self.max.is_finite()) {
            return d;
        }
        let (lo, hi) = if self.min <= self.max { (self.min, self.max) } else { (self.max, self.min) };
        if hi <= 0.0 {
            return d;
        }
        let lo = if lo > 0.0 { lo } else { d.min.min(hi) };
        Self { min: lo, max: hi }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.min;
        }
        scale.clamp(self.min, self.max)
    }
}

/// Rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RotationRange {
    /// Clamp into `[min, max]` degrees
    Clamped { min: f32, max: f32 },
    /// Unbounded free-drag rotation
    Free,
}

impl Default for RotationRange {
    fn default() -> Self {
        RotationRange::Clamped { min: -180.0, max: 180.0 }
    }
}

impl RotationRange {
    /// Swap an inverted interval; a non-finite bound gives the default.
    pub fn sanitized(self) -> Self {
        match self {
            RotationRange::Clamped { min, max } if !(min.is_finite() && max.is_finite()) => Self::default(),
            RotationRange::Clamped { min, max } if min > max => RotationRange::Clamped { min: max, max: min },
            other => other,
        }
    }

    pub fn clamp(&self, degrees: f32) -> f32 {
        if degrees.is_nan() {
            return 0.0;
        }
        match *self {
            RotationRange::Clamped { min, max } => degrees.clamp(min, max),
            RotationRange::Free => degrees,
        }
    }
}

/// Limits shared by every region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformLimits {
    pub scale: ScaleRange,
    pub rotation: RotationRange,
    /// Wrapper edge length crop insets are measured against
    pub crop_base_size: f32,
    /// Smallest visible extent left between opposing crop edges
    pub min_visible: f32,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            scale: ScaleRange::default(),
            rotation: RotationRange::default(),
            crop_base_size: 200.0,
            min_visible: 10.0,
        }
    }
}

impl TransformLimits {
    /// Copy that is safe to clamp against: ordered ranges, positive crop base,
    /// `min_visible` within `[0, crop_base_size]`.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let crop_base_size = if self.crop_base_size.is_finite() && self.crop_base_size > 0.0 {
            self.crop_base_size
        } else {
            d.crop_base_size
        };
        let min_visible = if self.min_visible.is_finite() && self.min_visible >= 0.0 {
            self.min_visible
        } else {
            d.min_visible
        };
        Self {
            scale: self.scale.sanitized(),
            rotation: self.rotation.sanitized(),
            crop_base_size,
            min_visible: min_visible.min(crop_base_size),
        }
    }
}

/// Crop insets, one per wrapper edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Crop rectangle in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn full(size: (u32, u32)) -> Self {
        Self { x: 0, y: 0, width: size.0, height: size.1 }
    }
}

impl CropMargins {
    /// Clamp each inset so opposing edges keep at least `min_visible` between them.
    pub fn clamped(self, limits: &TransformLimits) -> Self {
        let base = limits.crop_base_size.max(0.0);
        let room = (base - limits.min_visible).max(0.0);
        let fix = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, room) };
        let left = fix(self.left);
        let top = fix(self.top);
        Self {
            left,
            right: fix(self.right).min(room - left),
            top,
            bottom: fix(self.bottom).min(room - top),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.top == 0.0 && self.bottom == 0.0
    }

    /// Map wrapper insets to a pixel rectangle of a `size` source image.
    ///
    /// The result always keeps at least one pixel on each axis.
    pub fn to_source_rect(&self, size: (u32, u32), base: f32) -> CropRect {
        if base <= 0.0 || size.0 == 0 || size.1 == 0 {
            return CropRect::full(size);
        }
        let axis = |lo: f32, hi: f32, len: u32| -> (u32, u32) {
            let len_f = len as f32;
            let start = ((lo / base).clamp(0.0, 1.0) * len_f).floor() as u32;
            let end = (len_f - (hi / base).clamp(0.0, 1.0) * len_f).ceil() as u32;
            let start = start.min(len - 1);
            let end = end.clamp(start + 1, len);
            (start, end - start)
        };
        let (x, width) = axis(self.left, self.right, size.0);
        let (y, height) = axis(self.top, self.bottom, size.1);
        CropRect { x, y, width, height }
    }
}

/// User-adjustable placement of an image on one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub position: Vec2,
    pub scale: f32,
    pub rotation_deg: f32,
    pub crop: CropMargins,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 100.0,
            rotation_deg: 0.0,
            crop: CropMargins::default(),
        }
    }
}

impl TransformState {
    /// Fresh state for `region` using the registry default scale.
    pub fn for_region(region: Region, registry: &RegionRegistry) -> Self {
        Self {
            scale: registry.get(region).default_scale,
            ..Self::default()
        }
    }

    /// Copy with every field brought inside `limits`.
    pub fn clamped(mut self, limits: &TransformLimits) -> Self {
        if !self.position.is_finite() {
            self.position = Vec2::ZERO;
        }
        self.scale = limits.scale.clamp(self.scale);
        self.rotation_deg = limits.rotation.clamp(self.rotation_deg);
        self.crop = self.crop.clamped(limits);
        self
    }

    /// Check if the state is the region default (nothing to reset).
    pub fn is_default_for(&self, region: Region, registry: &RegionRegistry) -> bool {
        *self == Self::for_region(region, registry)
    }
}
