//! Sidebar - region picker, artwork, placement sliders, colors, scene presets.
//!
//! Edits a copy of the current values and emits an event when a control
//! reports a change; the design itself is read-only here.

use eframe::egui;
use eframe::egui::color_picker::{Alpha, color_edit_button_srgba};

use super::actions::ActionQueue;
use crate::core::design_events::*;
use crate::entities::{
    Background, Color, ColorSlot, Design, FabricPreset, LightingPreset, LoadState, MotionPreset, PlacedImage, Region,
    RotationRange, TransformLimits, TransformState,
};

pub type SidebarActions = ActionQueue;

/// Range offered by the position sliders, in preview pixels.
const POSITION_RANGE: f32 = 300.0;
/// Range offered by the rotation slider when rotation is unbounded.
const FREE_ROTATION_RANGE: f32 = 720.0;

fn status_label(ui: &mut egui::Ui, image: &PlacedImage) {
    match &image.load {
        LoadState::Pending => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(&image.name);
            });
        }
        LoadState::Ready(px) => {
            ui.label(format!("{} ({}x{})", image.name, px.width(), px.height()));
        }
        LoadState::Failed(err) => {
            ui.colored_label(egui::Color32::from_rgb(220, 80, 60), format!("{}: failed", image.name))
                .on_hover_text(err);
        }
    }
}

fn color_row(ui: &mut egui::Ui, label: &str, color: Color) -> Option<Color> {
    let mut c32: egui::Color32 = color.into();
    let mut out = None;
    ui.horizontal(|ui| {
        if color_edit_button_srgba(ui, &mut c32, Alpha::Opaque).changed() {
            out = Some(Color::from(c32));
        }
        ui.label(label);
    });
    out
}

fn render_artwork(ui: &mut egui::Ui, design: &Design, region: Region, actions: &mut SidebarActions) {
    ui.heading("Artwork");
    match design.bound_image(region) {
        Some(image) => {
            status_label(ui, image);
            ui.horizontal(|ui| {
                if ui.button("Replace...").clicked() {
                    actions.send(OpenUploadDialogEvent(Some(region)));
                }
                if ui.button("Detach").on_hover_text("Keep the image as floating").clicked() {
                    actions.send(DetachImageEvent(region));
                }
                if ui.button("Remove").clicked() {
                    actions.send(RemoveRegionImageEvent(region));
                }
            });
        }
        None => {
            ui.label("No image on this region.");
            if ui.button("Upload...").clicked() {
                actions.send(OpenUploadDialogEvent(Some(region)));
            }
        }
    }
}

/// Placement sliders editing `next`; true when any of them moved.
///
/// Position and free rotation are unbounded in the model, so those sliders
/// only suggest a range and never pull an out-of-range value back in.
fn placement_sliders(ui: &mut egui::Ui, next: &mut TransformState, limits: &TransformLimits) -> bool {
    let mut changed = false;
    egui::Grid::new("placement_grid").num_columns(2).show(ui, |ui| {
        ui.label("X");
        changed |= ui
            .add(
                egui::Slider::new(&mut next.position.x, -POSITION_RANGE..=POSITION_RANGE)
                    .clamping(egui::SliderClamping::Never)
                    .suffix(" px"),
            )
            .changed();
        ui.end_row();

        ui.label("Y");
        changed |= ui
            .add(
                egui::Slider::new(&mut next.position.y, -POSITION_RANGE..=POSITION_RANGE)
                    .clamping(egui::SliderClamping::Never)
                    .suffix(" px"),
            )
            .changed();
        ui.end_row();

        ui.label("Scale");
        changed |= ui
            .add(egui::Slider::new(&mut next.scale, limits.scale.min..=limits.scale.max).suffix(" %"))
            .changed();
        ui.end_row();

        ui.label("Rotation");
        let slider = match limits.rotation {
            RotationRange::Clamped { min, max } => egui::Slider::new(&mut next.rotation_deg, min..=max),
            RotationRange::Free => egui::Slider::new(&mut next.rotation_deg, -FREE_ROTATION_RANGE..=FREE_ROTATION_RANGE)
                .clamping(egui::SliderClamping::Never),
        };
        changed |= ui.add(slider.suffix(" °")).changed();
        ui.end_row();

        let room = (limits.crop_base_size - limits.min_visible).max(0.0);
        for (label, value) in [
            ("Crop left", &mut next.crop.left),
            ("Crop right", &mut next.crop.right),
            ("Crop top", &mut next.crop.top),
            ("Crop bottom", &mut next.crop.bottom),
        ] {
            ui.label(label);
            changed |= ui.add(egui::Slider::new(value, 0.0..=room).suffix(" px")).changed();
            ui.end_row();
        }
    });
    changed
}

fn render_placement(ui: &mut egui::Ui, design: &Design, region: Region, actions: &mut SidebarActions) {
    ui.heading("Placement");
    let limits = *design.limits();
    let current = design.transform(region);
    let mut next = current;

    if placement_sliders(ui, &mut next, &limits) {
        actions.send(SetTransformEvent { region, state: next });
    }

    let is_default = current.is_default_for(region, design.registry());
    if ui.add_enabled(!is_default, egui::Button::new("Reset placement")).clicked() {
        actions.send(ResetTransformEvent(region));
    }
}

fn render_colors(ui: &mut egui::Ui, design: &Design, actions: &mut SidebarActions) {
    ui.heading("Colors");
    let colors = design.colors();
    for slot in ColorSlot::ALL {
        if let Some(color) = color_row(ui, slot.display_name(), colors.get(slot)) {
            actions.send(SetColorEvent { slot, color });
        }
    }
    if ui.button("Reset colors").clicked() {
        actions.send(ResetColorsEvent);
    }
}

fn render_scene(ui: &mut egui::Ui, design: &Design, actions: &mut SidebarActions) {
    ui.heading("Scene");
    let current = *design.scene();
    let mut next = current;

    ui.horizontal(|ui| {
        ui.label("Background");
        let is_gradient = matches!(next.background, Background::Gradient { .. });
        if ui.selectable_label(!is_gradient, "Solid").clicked() && is_gradient {
            next.background = Background::Solid { color: next.background.sample(0.5) };
        }
        if ui.selectable_label(is_gradient, "Gradient").clicked() && !is_gradient {
            let c = next.background.sample(0.0);
            next.background = Background::Gradient { top: c, bottom: c.scaled(0.8) };
        }
    });
    match next.background {
        Background::Solid { color } => {
            if let Some(color) = color_row(ui, "Color", color) {
                next.background = Background::Solid { color };
            }
        }
        Background::Gradient { top, bottom } => {
            if let Some(top) = color_row(ui, "Top", top) {
                next.background = Background::Gradient { top, bottom };
            }
            if let Some(bottom) = color_row(ui, "Bottom", bottom) {
                next.background = Background::Gradient { top, bottom };
            }
        }
    }

    egui::ComboBox::from_label("Lighting")
        .selected_text(next.lighting.display_name())
        .show_ui(ui, |ui| {
            for preset in LightingPreset::ALL {
                ui.selectable_value(&mut next.lighting, preset, preset.display_name());
            }
        });

    let motions = [
        MotionPreset::Static,
        MotionPreset::Turntable { degrees_per_second: 30.0 },
        MotionPreset::Sway { amplitude: 25.0 },
    ];
    egui::ComboBox::from_label("Motion")
        .selected_text(next.motion.display_name())
        .show_ui(ui, |ui| {
            for preset in motions {
                let selected = std::mem::discriminant(&next.motion) == std::mem::discriminant(&preset);
                if ui.selectable_label(selected, preset.display_name()).clicked() && !selected {
                    next.motion = preset;
                }
            }
        });

    egui::ComboBox::from_label("Fabric")
        .selected_text(next.fabric.display_name())
        .show_ui(ui, |ui| {
            for preset in FabricPreset::ALL {
                ui.selectable_value(&mut next.fabric, preset, preset.display_name());
            }
        });

    if next != current {
        actions.send(SetSceneEvent(next));
    }
}

fn render_floating(ui: &mut egui::Ui, design: &Design, region: Region, actions: &mut SidebarActions) {
    ui.heading("Floating images");
    let floating: Vec<&PlacedImage> = design.floating_images().collect();
    if floating.is_empty() {
        ui.label("None. Floating images are shown on the canvas only.");
    }
    for image in floating {
        ui.push_id(image.uuid, |ui| {
            status_label(ui, image);
            ui.horizontal(|ui| {
                let assign = ui.add_enabled(
                    !image.load.is_failed(),
                    egui::Button::new(format!("Apply to {}", region.display_name())),
                );
                if assign.clicked() {
                    actions.send(AssignRegionEvent { image: image.uuid, region });
                }
                if ui.button("Remove").clicked() {
                    actions.send(RemoveImageEvent(image.uuid));
                }
            });
        });
    }
    if ui.button("Add floating image...").clicked() {
        actions.send(OpenUploadDialogEvent(None));
    }
}

/// Render the sidebar for the `selected` region.
pub fn render(ui: &mut egui::Ui, design: &Design, selected: &mut Region) -> SidebarActions {
    let mut actions = SidebarActions::default();

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.heading("Region");
        ui.horizontal_wrapped(|ui| {
            for region in Region::ALL {
                ui.selectable_value(selected, region, region.display_name());
            }
        });
        ui.separator();

        let region = *selected;
        render_artwork(ui, design, region, &mut actions);
        ui.separator();
        render_placement(ui, design, region, &mut actions);
        ui.separator();
        render_colors(ui, design, &mut actions);
        ui.separator();
        render_scene(ui, design, &mut actions);
        ui.separator();
        render_floating(ui, design, region, &mut actions);
    });

    actions.hovered = ui.ui_contains_pointer();
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// Lay out the sliders for one headless frame.
    fn show_sliders(state: &mut TransformState, limits: &TransformLimits) -> bool {
        let ctx = egui::Context::default();
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = placement_sliders(ui, state, limits);
            });
        });
        changed
    }

    #[test]
    fn test_sliders_keep_out_of_range_position() {
        let mut state = TransformState {
            position: Vec2::new(400.0, -550.0),
            ..Default::default()
        };
        let changed = show_sliders(&mut state, &TransformLimits::default());
        assert!(!changed);
        assert_eq!(state.position, Vec2::new(400.0, -550.0));
    }

    #[test]
    fn test_sliders_keep_free_rotation() {
        let limits = TransformLimits {
            rotation: RotationRange::Free,
            ..Default::default()
        };
        let mut state = TransformState {
            rotation_deg: 1080.0,
            ..Default::default()
        };
        assert!(!show_sliders(&mut state, &limits));
        assert_eq!(state.rotation_deg, 1080.0);
    }
}
