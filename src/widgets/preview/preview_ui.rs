//! Preview widget - flat garment rendering, artwork editor and drag handles.

use eframe::egui::{self, Color32, Mesh, Pos2, Rect, Sense, Shape, Stroke, pos2};
use glam::Vec2;
use indexmap::IndexMap;
use log::{debug, trace};

use super::layout::{self, Wrapper, to_pos2, to_vec2};
use super::textures::{TextureCache, crop_uv_rect};
use crate::core::design_events::{GestureCommitEvent, RetryRenderEvent};
use crate::core::gesture::{Corner, Edge, GestureController, GestureMode, GestureTarget, PointerId};
use crate::core::material_binder::{MaterialChange, MaterialDescriptor};
use crate::entities::space::rect_to_uv;
use crate::entities::{
    Background, Color, CropMargins, Design, LoadState, MotionPreset, PlacedImage, PlacementConfig, Region,
    TextureRole, TransformState, UvTextureParams,
};
use crate::widgets::actions::ActionQueue;

const HANDLE_FILL: Color32 = Color32::WHITE;
const HANDLE_STROKE: Color32 = Color32::from_rgb(40, 120, 220);
const PANEL_STROKE: Color32 = Color32::from_gray(90);
const SELECTED_STROKE: Color32 = Color32::from_rgb(40, 120, 220);
const EDITOR_FILL: Color32 = Color32::from_gray(36);
/// Lateral drift of the garment at 90 degrees of yaw, as a canvas fraction.
const MOTION_DRIFT: f32 = 0.04;

pub type PreviewActions = ActionQueue;

/// Renderer-side state: what was applied, GPU textures, context health.
#[derive(Default)]
pub struct PreviewState {
    /// Sizes the editor wrapper the way the binder sizes the decal
    placement: PlacementConfig,
    materials: IndexMap<Region, MaterialDescriptor>,
    textures: TextureCache,
    context_lost: Option<String>,
    /// Seconds of motion animation, frozen while dragging
    motion_time: f64,
}

impl PreviewState {
    pub fn new(placement: PlacementConfig) -> Self {
        Self {
            placement: placement.sanitized(),
            ..Default::default()
        }
    }

    /// Apply a material diff from the binder.
    pub fn apply(&mut self, changes: Vec<MaterialChange>) {
        for change in changes {
            trace!("Preview: {} <- {:?}", change.material_slot, change.descriptor);
            self.materials.insert(change.region, change.descriptor);
        }
    }

    pub fn material(&self, region: Region) -> Option<&MaterialDescriptor> {
        self.materials.get(&region)
    }

    pub fn lose_context(&mut self, reason: String) {
        self.context_lost = Some(reason);
    }

    pub fn context_lost(&self) -> Option<&str> {
        self.context_lost.as_deref()
    }

    /// Full reload: forget materials and textures; the binder re-sends all.
    pub fn reload(&mut self) {
        debug!("Preview: full reload");
        self.materials.clear();
        self.textures.clear();
        self.context_lost = None;
    }
}

fn shaded(color: Color, shade: f32) -> Color32 {
    color.scaled(shade).into()
}

fn paint_background(painter: &egui::Painter, rect: Rect, background: &Background) {
    let top: Color32 = background.sample(0.0).into();
    let bottom: Color32 = background.sample(1.0).into();
    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(Shape::mesh(mesh));
}

/// Textured quad; `uvs` in egui texture space, same order as `corners`.
fn quad_mesh(texture: egui::TextureId, corners: [Pos2; 4], uvs: [Pos2; 4], tint: Color32) -> Mesh {
    let mut mesh = Mesh::with_texture(texture);
    for (pos, uv) in corners.into_iter().zip(uvs) {
        mesh.vertices.push(egui::epaint::Vertex { pos, uv, color: tint });
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    mesh
}

fn rect_uvs(r: Rect) -> [Pos2; 4] {
    [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()]
}

fn paint_wrapper(painter: &egui::Painter, wrapper: &Wrapper, active: bool) {
    let outline: Vec<Pos2> = wrapper.outline().into_iter().map(to_pos2).collect();
    let width = if active { 2.0 } else { 1.5 };
    painter.add(Shape::closed_line(outline, Stroke::new(width, HANDLE_STROKE)));

    let top_mid = to_pos2(wrapper.edge_mid(Edge::Top));
    let knob = to_pos2(wrapper.rotate_knob());
    painter.line_segment([top_mid, knob], Stroke::new(1.0, HANDLE_STROKE));
    painter.circle(knob, layout::HANDLE_RADIUS - 1.0, HANDLE_FILL, Stroke::new(1.5, HANDLE_STROKE));

    for c in Corner::ALL {
        let p = to_pos2(wrapper.corner(c));
        let r = Rect::from_center_size(p, egui::vec2(9.0, 9.0));
        painter.rect(r, 1.0, HANDLE_FILL, Stroke::new(1.5, HANDLE_STROKE), egui::StrokeKind::Middle);
    }
    for e in Edge::ALL {
        let p = to_pos2(wrapper.edge_mid(e));
        painter.circle(p, 3.5, HANDLE_STROKE, Stroke::NONE);
    }
}

/// Cropped artwork drawn inside its wrapper.
fn paint_art(
    ctx: &egui::Context,
    painter: &egui::Painter,
    textures: &mut TextureCache,
    image: &PlacedImage,
    crop: &CropMargins,
    base: f32,
    wrapper: &Wrapper,
) {
    let params = UvTextureParams::identity(TextureRole::Decal);
    let Some((handle, size)) = textures.decal(ctx, image, &params) else {
        let label = if image.load.is_failed() { "Failed to load" } else { "Loading..." };
        painter.text(to_pos2(wrapper.pivot()), egui::Align2::CENTER_CENTER, label, egui::FontId::proportional(13.0), PANEL_STROKE);
        return;
    };
    let Some(source) = image.crop_rect(crop, base) else {
        return;
    };
    let uv_rect = crop_uv_rect(source, size);
    painter.add(quad_mesh(handle.id(), wrapper.quad(), rect_uvs(uv_rect), Color32::WHITE));
}

/// Pointer events of this frame routed into the gesture controller.
fn route_pointer(
    ctx: &egui::Context,
    panel: Rect,
    wrappers: &[(GestureTarget, Wrapper, TransformState)],
    gestures: &mut GestureController,
    actions: &mut PreviewActions,
) {
    let events = ctx.input(|i| i.events.clone());
    for event in events {
        match event {
            egui::Event::PointerButton { pos, button: egui::PointerButton::Primary, pressed, .. } => {
                let p = to_vec2(pos);
                if pressed {
                    if panel.contains(pos) {
                        begin(gestures, PointerId::MOUSE, p, wrappers);
                    }
                } else if let Some(commit) = gestures.pointer_up(PointerId::MOUSE, p) {
                    actions.send(GestureCommitEvent(commit));
                }
            }
            egui::Event::PointerMoved(pos) => {
                gestures.pointer_move(PointerId::MOUSE, to_vec2(pos));
            }
            egui::Event::PointerGone => {
                gestures.pointer_cancel(PointerId::MOUSE);
            }
            egui::Event::Touch { id, phase, pos, .. } => {
                // mouse owns id 0
                let pointer = PointerId(id.0.wrapping_add(1));
                let p = to_vec2(pos);
                match phase {
                    egui::TouchPhase::Start => {
                        if panel.contains(pos) {
                            begin(gestures, pointer, p, wrappers);
                        }
                    }
                    egui::TouchPhase::Move => {
                        gestures.pointer_move(pointer, p);
                    }
                    egui::TouchPhase::End => {
                        if let Some(commit) = gestures.pointer_up(pointer, p) {
                            actions.send(GestureCommitEvent(commit));
                        }
                    }
                    egui::TouchPhase::Cancel => {
                        gestures.pointer_cancel(pointer);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Start a gesture on the topmost wrapper under `p`.
fn begin(gestures: &mut GestureController, pointer: PointerId, p: Vec2, wrappers: &[(GestureTarget, Wrapper, TransformState)]) {
    for (target, wrapper, state) in wrappers.iter().rev() {
        if let Some(mode) = wrapper.pick(p) {
            gestures.pointer_down(pointer, *target, mode, p, wrapper.pivot(), *state);
            return;
        }
    }
}

/// Render the preview inside `ui`.
///
/// The garment view only selects regions; handles live in the editor view.
pub fn render(
    ui: &mut egui::Ui,
    state: &mut PreviewState,
    design: &Design,
    gestures: &mut GestureController,
    selected: &mut Region,
) -> PreviewActions {
    let mut actions = PreviewActions::default();
    let ctx = ui.ctx().clone();
    let panel = ui.max_rect();
    let response = ui.allocate_rect(panel, Sense::click_and_drag());
    actions.hovered = response.hovered();
    let painter = ui.painter_at(panel);
    let scene = design.scene();
    let (garment_view, editor_view) = layout::split_panel(panel);

    paint_background(&painter, garment_view, &scene.background);
    painter.rect_filled(editor_view, 0.0, EDITOR_FILL);
    painter.rect_stroke(editor_view, 0.0, Stroke::new(1.0, PANEL_STROKE), egui::StrokeKind::Inside);

    if let Some(reason) = state.context_lost.clone() {
        gestures.cancel();
        painter.rect_filled(panel, 0.0, Color32::from_black_alpha(200));
        let builder = egui::UiBuilder::new().max_rect(Rect::from_center_size(panel.center(), egui::vec2(320.0, 90.0)));
        ui.scope_builder(builder, |ui| {
            ui.vertical_centered(|ui| {
                ui.colored_label(Color32::WHITE, format!("Preview lost its graphics context: {}", reason));
                if ui.button("Retry").clicked() {
                    actions.send(RetryRenderEvent);
                }
            });
        });
        return actions;
    }

    // Motion: advance only while nothing is being dragged.
    if !gestures.is_active() {
        state.motion_time += ctx.input(|i| i.stable_dt) as f64;
    }
    let drift = if matches!(scene.motion, MotionPreset::Static) {
        0.0
    } else {
        ctx.request_repaint();
        scene.motion.yaw_at(state.motion_time).to_radians().sin()
    };
    let canvas = layout::fit_canvas(garment_view.shrink(16.0));
    let painter = painter.with_clip_rect(garment_view);
    let canvas = canvas.translate(egui::vec2(drift * MOTION_DRIFT * canvas.width(), 0.0));
    let shade = scene.lighting.shade();

    // Free decal textures of removed images.
    state
        .textures
        .retain_decals(|uuid| design.image(*uuid).is_some_and(|i| i.load.is_ready()));

    for (region, rect) in layout::region_rects(canvas) {
        let Some(material) = state.materials.get(&region).copied() else {
            continue;
        };

        // Base: flat color, optionally with tiled fabric.
        let base_tex = material
            .base_texture
            .and_then(|bt| state.textures.fabric(&ctx, bt.fabric, &bt.params).map(|h| (h, bt.params)));
        match base_tex {
            Some((handle, params)) => {
                let uvs = rect_uvs(Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))).map(|p| {
                    let t = params.apply(rect_to_uv(to_vec2(p)));
                    pos2(t.x, 1.0 - t.y)
                });
                let corners = rect_uvs(rect);
                painter.add(quad_mesh(handle.id(), corners, uvs, shaded(material.color, shade)));
            }
            None => {
                painter.rect_filled(rect, 6.0, shaded(material.color, shade));
            }
        }

        // Decal over the base, clipped to the panel.
        if let Some(decal) = material.decal
            && let Some(image) = design.image(decal.image)
            && let Some((handle, size)) = state.textures.decal(&ctx, image, &decal.params)
        {
            let uv_rect = crop_uv_rect(decal.crop, size);
            if let Some(corners) = layout::decal_quad(rect, &decal.params, uv_rect) {
                let tint = Color32::from_gray((255.0 * shade.min(1.0)) as u8);
                painter
                    .with_clip_rect(rect)
                    .add(quad_mesh(handle.id(), corners, rect_uvs(uv_rect), tint));
            }
        }

        painter.rect_filled(layout::trim_band(rect, region), 2.0, shaded(material.trim, shade));

        if design.bound_image(region).is_some_and(|i| matches!(i.load, LoadState::Pending)) {
            painter.text(rect.center(), egui::Align2::CENTER_CENTER, "Loading...", egui::FontId::proportional(13.0), PANEL_STROKE);
        }

        let stroke = if region == *selected {
            Stroke::new(2.0, SELECTED_STROKE)
        } else {
            Stroke::new(1.0, PANEL_STROKE)
        };
        painter.rect_stroke(rect, 6.0, stroke, egui::StrokeKind::Inside);
        painter.text(
            rect.center_bottom() + egui::vec2(0.0, 4.0),
            egui::Align2::CENTER_TOP,
            region.display_name(),
            egui::FontId::proportional(12.0),
            PANEL_STROKE,
        );
    }

    // Editor: the selected region's artwork, then floating images on top.
    let editor = ui.painter_at(editor_view);
    let anchor = to_vec2(editor_view.center());
    let base = design.limits().crop_base_size;
    let divisor = state.placement.scale_divisor;
    let mut wrappers: Vec<(GestureTarget, Wrapper, TransformState)> = Vec::new();
    let title = match design.bound_image(*selected) {
        Some(image) => {
            let t = design.transform(*selected);
            let wrapper = Wrapper::new(anchor, &t, base, divisor);
            paint_art(&ctx, &editor, &mut state.textures, image, &t.crop, base, &wrapper);
            wrappers.push((GestureTarget::Region(*selected), wrapper, t));
            format!("{}: {}", selected.display_name(), image.name)
        }
        None => format!("{}: no artwork", selected.display_name()),
    };
    for image in design.floating_images() {
        let wrapper = Wrapper::new(anchor, &image.floating, base, divisor);
        paint_art(&ctx, &editor, &mut state.textures, image, &image.floating.crop, base, &wrapper);
        wrappers.push((GestureTarget::Floating(image.uuid), wrapper, image.floating));
    }
    editor.text(
        editor_view.left_top() + egui::vec2(8.0, 6.0),
        egui::Align2::LEFT_TOP,
        title,
        egui::FontId::proportional(12.0),
        Color32::from_gray(170),
    );

    route_pointer(&ctx, editor_view, &wrappers, gestures, &mut actions);

    let active = gestures.active_target();
    for (target, wrapper, _) in &wrappers {
        paint_wrapper(&editor, wrapper, active == Some(*target));
    }

    // Click on a garment panel selects that region.
    if response.clicked()
        && !gestures.is_active()
        && let Some(pos) = response.interact_pointer_pos()
        && garment_view.contains(pos)
        && let Some((region, _)) = layout::region_rects(canvas).into_iter().find(|(_, r)| r.contains(pos))
    {
        debug!("Preview: selected {}", region);
        *selected = region;
    }

    if let Some(mode) = gestures.active_mode() {
        ctx.set_cursor_icon(cursor_for(mode));
    } else if let Some(hover) = response.hover_pos().filter(|p| editor_view.contains(*p)) {
        let p = to_vec2(hover);
        if let Some(mode) = wrappers.iter().rev().find_map(|(_, w, _)| w.pick(p)) {
            ctx.set_cursor_icon(cursor_for(mode));
        }
    }

    actions
}

fn cursor_for(mode: GestureMode) -> egui::CursorIcon {
    match mode {
        GestureMode::Move => egui::CursorIcon::Move,
        GestureMode::Rotate => egui::CursorIcon::Alias,
        GestureMode::ScaleCorner(Corner::TopLeft | Corner::BottomRight) => egui::CursorIcon::ResizeNwSe,
        GestureMode::ScaleCorner(_) => egui::CursorIcon::ResizeNeSw,
        GestureMode::CropEdge(Edge::Left | Edge::Right) => egui::CursorIcon::ResizeHorizontal,
        GestureMode::CropEdge(_) => egui::CursorIcon::ResizeVertical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material_binder::MaterialBinder;
    use crate::entities::TransformLimits;

    #[test]
    fn test_apply_and_reload() {
        let design = Design::default();
        let mut binder = MaterialBinder::default();
        let mut preview = PreviewState::default();
        preview.apply(binder.sync(&design));
        assert_eq!(preview.material(Region::Back), binder.applied(Region::Back));

        preview.lose_context("device reset".into());
        assert_eq!(preview.context_lost(), Some("device reset"));
        preview.reload();
        assert!(preview.context_lost().is_none());
        assert!(preview.material(Region::Back).is_none());
    }

    #[test]
    fn test_cursor_per_mode() {
        assert_eq!(cursor_for(GestureMode::CropEdge(Edge::Top)), egui::CursorIcon::ResizeVertical);
        assert_eq!(cursor_for(GestureMode::Move), egui::CursorIcon::Move);
    }

    #[test]
    fn test_scale_measured_from_cropped_center() {
        let mut t = TransformState::default();
        t.crop.left = 100.0;
        let wrapper = Wrapper::new(Vec2::ZERO, &t, 200.0, 100.0);
        let corner = wrapper.corner(Corner::BottomRight);
        let pivot = wrapper.pivot();
        assert_eq!(pivot, Vec2::new(50.0, 0.0));

        let mut g = GestureController::new(TransformLimits::default());
        let target = GestureTarget::Region(Region::Front);
        begin(&mut g, PointerId::MOUSE, corner, &[(target, wrapper, t)]);
        assert_eq!(g.active_mode(), Some(GestureMode::ScaleCorner(Corner::BottomRight)));

        // twice as far from the visible center doubles the scale
        let commit = g.pointer_up(PointerId::MOUSE, pivot + (corner - pivot) * 2.0).unwrap();
        assert!((commit.state.scale - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_editor_uses_configured_divisor() {
        let preview = PreviewState::new(PlacementConfig { scale_divisor: 50.0, ..Default::default() });
        assert_eq!(preview.placement.scale_divisor, 50.0);
        let preview = PreviewState::new(PlacementConfig { scale_divisor: 0.0, ..Default::default() });
        assert_eq!(preview.placement, PlacementConfig::default());
    }
}
