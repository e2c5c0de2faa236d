//! Preview geometry: flat garment layout, decal quads and handle picking.
//!
//! The panel is split in two views:
//!
//! - **Garment view**: every region with its material. The decal quad is where
//!   the texture actually lands, obtained by pushing the texture corners back
//!   through the inverse UV matrix, as a mesh renderer would show it with
//!   clamp-to-edge sampling.
//! - **Editor view**: the selected region's artwork laid out flat. The image
//!   is drawn inside its [`Wrapper`], so the handles and the pixels under them
//!   always move together with the pointer.
//!
//! # Picking
//!
//! 1. Rotate knob, corner and edge handles are tested first (radius hit)
//! 2. Then the pointer is un-rotated into wrapper space and tested against
//!    the visible (cropped) rectangle for a move

use eframe::egui::{Pos2, Rect, pos2};
use glam::Vec2;

use crate::core::gesture::{Corner, Edge, GestureMode};
use crate::entities::space;
use crate::entities::{Region, TransformState, UvTextureParams};

/// Share of the panel given to the editor view.
pub const EDITOR_SHARE: f32 = 0.38;

/// Handle hit radius in points.
pub const HANDLE_RADIUS: f32 = 7.0;
/// Distance of the rotate knob above the top edge.
pub const ROTATE_KNOB_OFFSET: f32 = 24.0;

/// Normalized placement of each region panel inside the garment canvas.
const PANELS: [(Region, [f32; 4]); 4] = [
    (Region::LeftSleeve, [0.02, 0.14, 0.18, 0.44]),
    (Region::Front, [0.20, 0.08, 0.49, 0.92]),
    (Region::Back, [0.51, 0.08, 0.80, 0.92]),
    (Region::RightSleeve, [0.82, 0.14, 0.98, 0.44]),
];

/// Width / height of the garment canvas.
pub const CANVAS_ASPECT: f32 = 1.6;

#[inline]
pub fn to_vec2(p: Pos2) -> Vec2 {
    Vec2::new(p.x, p.y)
}

#[inline]
pub fn to_pos2(v: Vec2) -> Pos2 {
    pos2(v.x, v.y)
}

/// Largest canvas of [`CANVAS_ASPECT`] centered in `available`.
pub fn fit_canvas(available: Rect) -> Rect {
    let size = available.size();
    let (w, h) = if size.x / size.y.max(1.0) > CANVAS_ASPECT {
        (size.y * CANVAS_ASPECT, size.y)
    } else {
        (size.x, size.x / CANVAS_ASPECT)
    };
    Rect::from_center_size(available.center(), eframe::egui::vec2(w, h))
}

/// Garment view and editor view of the preview panel.
///
/// The editor sits on the right of a wide panel, below a tall one.
pub fn split_panel(panel: Rect) -> (Rect, Rect) {
    if panel.width() >= panel.height() {
        let x = panel.max.x - panel.width() * EDITOR_SHARE;
        let garment = Rect::from_min_max(panel.min, pos2(x, panel.max.y));
        let editor = Rect::from_min_max(pos2(x, panel.min.y), panel.max);
        (garment, editor)
    } else {
        let y = panel.max.y - panel.height() * EDITOR_SHARE;
        let garment = Rect::from_min_max(panel.min, pos2(panel.max.x, y));
        let editor = Rect::from_min_max(pos2(panel.min.x, y), panel.max);
        (garment, editor)
    }
}

/// Trim strip of a region panel: collar along the top of the body panels,
/// cuff along the bottom of the sleeves.
pub fn trim_band(rect: Rect, region: Region) -> Rect {
    if region.is_sleeve() {
        let h = (rect.height() * 0.12).max(4.0);
        Rect::from_min_max(pos2(rect.min.x, rect.max.y - h), rect.max)
    } else {
        let h = (rect.height() * 0.05).max(3.0);
        let inset = rect.width() * 0.3;
        Rect::from_min_max(pos2(rect.min.x + inset, rect.min.y), pos2(rect.max.x - inset, rect.min.y + h))
    }
}

/// Screen rect of every region panel, in draw order.
pub fn region_rects(canvas: Rect) -> [(Region, Rect); 4] {
    PANELS.map(|(region, [x0, y0, x1, y1])| {
        let min = canvas.lerp_inside(eframe::egui::vec2(x0, y0));
        let max = canvas.lerp_inside(eframe::egui::vec2(x1, y1));
        (region, Rect::from_min_max(min, max))
    })
}

pub fn region_rect(canvas: Rect, region: Region) -> Rect {
    region_rects(canvas)
        .into_iter()
        .find(|(r, _)| *r == region)
        .map(|(_, rect)| rect)
        .unwrap_or(canvas)
}

/// Texture coordinate (+V up) -> screen point on `rect`.
fn texture_to_screen(rect: Rect, inverse: &glam::Mat3, t: Vec2) -> Pos2 {
    let uv = inverse.transform_point2(t);
    let r = space::uv_to_rect(uv);
    rect.lerp_inside(eframe::egui::vec2(r.x, r.y))
}

/// Screen corners of the sub-texture `[u0,u1] x [v0,v1]` (egui texture UV,
/// +V down) as placed by `params`: top-left, top-right, bottom-right,
/// bottom-left of the image.
///
/// `None` when the UV matrix is singular.
pub fn decal_quad(rect: Rect, params: &UvTextureParams, uv_rect: Rect) -> Option<[Pos2; 4]> {
    let m = params.uv_matrix();
    if m.determinant().abs() < 1e-8 {
        return None;
    }
    let inverse = m.inverse();
    // egui texture space (+V down) -> sampler space (+V up)
    let t = |u: f32, v: f32| Vec2::new(u, 1.0 - v);
    let (u0, v0, u1, v1) = (uv_rect.min.x, uv_rect.min.y, uv_rect.max.x, uv_rect.max.y);
    Some([
        texture_to_screen(rect, &inverse, t(u0, v0)),
        texture_to_screen(rect, &inverse, t(u1, v0)),
        texture_to_screen(rect, &inverse, t(u1, v1)),
        texture_to_screen(rect, &inverse, t(u0, v1)),
    ])
}

/// Drag overlay of one placed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wrapper {
    /// Gesture center (scale and rotate pivot), screen space
    pub center: Vec2,
    /// Visible rect relative to center, before rotation
    pub min: Vec2,
    pub max: Vec2,
    pub rotation_deg: f32,
}

impl Wrapper {
    /// Wrapper of `state` around `anchor` (editor center).
    ///
    /// `scale_divisor` is the scale percentage drawn at the crop base size.
    pub fn new(anchor: Vec2, state: &TransformState, crop_base_size: f32, scale_divisor: f32) -> Self {
        let s = if scale_divisor > 0.0 { state.scale / scale_divisor } else { state.scale / 100.0 };
        let half = crop_base_size * 0.5;
        let c = state.crop;
        Self {
            center: space::region_to_screen(state.position, anchor),
            min: Vec2::new(-half + c.left, -half + c.top) * s,
            max: Vec2::new(half - c.right, half - c.bottom) * s,
            rotation_deg: state.rotation_deg,
        }
    }

    fn place(&self, local: Vec2) -> Vec2 {
        space::rotate_about(self.center + local, self.center, self.rotation_deg)
    }

    /// Geometric center of the visible (cropped) rect; scale and rotate
    /// gestures measure from here.
    pub fn pivot(&self) -> Vec2 {
        self.place((self.min + self.max) * 0.5)
    }

    pub fn corner(&self, corner: Corner) -> Vec2 {
        let u = corner.unit();
        let x = if u.x < 0.0 { self.min.x } else { self.max.x };
        let y = if u.y < 0.0 { self.min.y } else { self.max.y };
        self.place(Vec2::new(x, y))
    }

    pub fn edge_mid(&self, edge: Edge) -> Vec2 {
        let mid = (self.min + self.max) * 0.5;
        let u = edge.unit();
        let x = match u.x {
            x if x < 0.0 => self.min.x,
            x if x > 0.0 => self.max.x,
            _ => mid.x,
        };
        let y = match u.y {
            y if y < 0.0 => self.min.y,
            y if y > 0.0 => self.max.y,
            _ => mid.y,
        };
        self.place(Vec2::new(x, y))
    }

    pub fn rotate_knob(&self) -> Vec2 {
        let mid_x = (self.min.x + self.max.x) * 0.5;
        self.place(Vec2::new(mid_x, self.min.y - ROTATE_KNOB_OFFSET))
    }

    /// Outline, clockwise from top-left.
    pub fn outline(&self) -> [Vec2; 4] {
        [
            self.corner(Corner::TopLeft),
            self.corner(Corner::TopRight),
            self.corner(Corner::BottomRight),
            self.corner(Corner::BottomLeft),
        ]
    }

    /// Screen corners of the artwork, same order as [`Wrapper::outline`].
    pub fn quad(&self) -> [Pos2; 4] {
        self.outline().map(to_pos2)
    }

    /// Handle under `p`, if any.
    pub fn pick(&self, p: Vec2) -> Option<GestureMode> {
        let near = |h: Vec2| space::distance(h, p) <= HANDLE_RADIUS;
        if near(self.rotate_knob()) {
            return Some(GestureMode::Rotate);
        }
        if let Some(c) = Corner::ALL.into_iter().find(|c| near(self.corner(*c))) {
            return Some(GestureMode::ScaleCorner(c));
        }
        if let Some(e) = Edge::ALL.into_iter().find(|e| near(self.edge_mid(*e))) {
            return Some(GestureMode::CropEdge(e));
        }
        let local = space::rotate_about(p, self.center, -self.rotation_deg) - self.center;
        let inside = local.x >= self.min.x && local.x <= self.max.x && local.y >= self.min.y && local.y <= self.max.y;
        inside.then_some(GestureMode::Move)
    }
}
