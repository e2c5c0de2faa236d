//! Coordinate spaces used by the preview and the gesture adapter.
//!
//! ## Coordinate Spaces
//!
//! - **Screen space**: egui points, origin top-left, +Y down.
//!   Pointer events and transform positions live here.
//!
//! - **Region space**: origin at the region center, +Y down (pixels).
//!   `TransformState::position` is measured in this space.
//!
//! - **UV space**: origin bottom-left of the region, +V up, 0..1.
//!   Sampler parameters live here.
//!
//! ```text
//! pointer (screen)
//!     |  minus region center
//!     v
//! region space (+Y down)
//!     |  / PIXELS_PER_UV_UNIT, flip Y
//!     v
//! UV offset (+V up)
//! ```

use glam::Vec2;

/// Region space -> screen point.
#[inline]
pub fn region_to_screen(p: Vec2, region_center: Vec2) -> Vec2 {
    p + region_center
}

/// Region-local unit rect coordinate (0..1, +Y down) -> mesh UV (+V up).
#[inline]
pub fn rect_to_uv(t: Vec2) -> Vec2 {
    Vec2::new(t.x, 1.0 - t.y)
}

/// Mesh UV (+V up) -> region-local unit rect coordinate (+Y down).
#[inline]
pub fn uv_to_rect(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

/// Pointer angle around `center` in degrees, `atan2(dy, dx)`.
#[inline]
pub fn angle_deg(center: Vec2, p: Vec2) -> f32 {
    let d = p - center;
    d.y.atan2(d.x).to_degrees()
}

/// Pointer distance from `center`.
#[inline]
pub fn distance(center: Vec2, p: Vec2) -> f32 {
    (p - center).length()
}

/// Rotate `p` around `center` clockwise on screen by `degrees` (+Y down).
#[inline]
pub fn rotate_about(p: Vec2, center: Vec2, degrees: f32) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    let d = p - center;
    center + Vec2::new(d.x * c - d.y * s, d.x * s + d.y * c)
}
