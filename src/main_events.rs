//! Designer event handling - extracted from main.rs for clarity.
//!
//! Widgets only emit intents; every mutation of the design happens here, on
//! the UI thread, between frames. After the handler runs, the update loop
//! calls `MaterialBinder::sync` and the preview applies the resulting diff.
//!
//! Anything that removes or replaces an image also cancels a gesture on it
//! and tells the loader to drop a decode still in flight, so neither a stale
//! drag nor late pixels can resurrect it.

use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::design_events::*;
use crate::core::event_bus::{BoxedEvent, downcast_event};
use crate::core::gesture::{GestureController, GestureTarget, TransformCommit};
use crate::core::image_loader::{self, ImageLoader};
use crate::core::material_binder::MaterialBinder;
use crate::entities::color_store::save_colors;
use crate::entities::{Design, GarmentColors, ImageSource, KeyValueStore, PlacedImage, Region};

/// Side effects the app shell must carry out.
#[derive(Debug, Default)]
pub struct EventResult {
    /// Open the upload dialog (`Some(None)` = floating upload)
    pub open_dialog: Option<Option<Region>>,
    /// Renderer lost its context with this message
    pub context_lost: Option<String>,
    /// Drop every GPU texture before the next frame
    pub reload: bool,
    /// Colors changed but the snapshot was not written yet
    pub colors_changed: bool,
}

/// Mutable state the handler operates on.
pub struct DesignerState<'a> {
    pub design: &'a mut Design,
    pub gestures: &'a mut GestureController,
    pub loader: &'a mut ImageLoader,
    pub binder: &'a mut MaterialBinder,
    pub store: &'a mut dyn KeyValueStore,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Stop gestures and decodes that belong to a removed image.
fn drop_image(state: &mut DesignerState, image: &PlacedImage) {
    state.gestures.cancel_target(GestureTarget::Floating(image.uuid));
    if let Some(region) = image.region {
        state.gestures.cancel_target(GestureTarget::Region(region));
    }
    state.loader.forget(image.uuid);
}

fn persist_colors(state: &mut DesignerState) {
    let colors = state.design.colors();
    if let Err(e) = save_colors(&mut *state.store, &colors) {
        warn!("Failed to save colors: {:#}", e);
    }
}

/// Add an upload onto `region` (`None` = floating) and queue its decode.
pub fn add_image(state: &mut DesignerState, region: Option<Region>, name: String, source: ImageSource) -> Uuid {
    let image = PlacedImage::new(name, Some(source.clone()));
    let uuid = image.uuid;
    match region {
        Some(region) => {
            state.gestures.cancel_target(GestureTarget::Region(region));
            if let Some(old) = state.design.place_image(region, image) {
                debug!("Replaced '{}' on {}", old.name, region);
                drop_image(state, &old);
            }
        }
        None => {
            state.design.place_floating_image(image);
        }
    }
    state.loader.request(uuid, source);
    uuid
}

/// Upload `path` onto `region` and queue its decode.
pub fn place_image_from_path(state: &mut DesignerState, region: Region, path: &Path) -> Uuid {
    add_image(state, Some(region), display_name(path), ImageSource::Path(path.to_path_buf()))
}

/// Decode `path` on the calling thread and bind it to `region`.
///
/// A broken file is not fatal: the image stays Failed and the region keeps
/// its base material.
pub fn place_image_blocking(design: &mut Design, region: Region, path: &Path) -> Uuid {
    let source = ImageSource::Path(path.to_path_buf());
    let image = PlacedImage::new(display_name(path), Some(source.clone()));
    let uuid = image.uuid;
    design.place_image(region, image);
    match image_loader::decode(&source) {
        Ok(pixels) => design.mark_loaded(uuid, Arc::new(pixels)),
        Err(e) => design.mark_failed(uuid, format!("{:#}", e)),
    };
    uuid
}

/// Write a gesture commit into the design. Returns true if anything changed.
pub fn apply_commit(design: &mut Design, commit: &TransformCommit) -> bool {
    match commit.target {
        GestureTarget::Region(region) => design.set_transform(region, commit.state),
        GestureTarget::Floating(uuid) => design.set_floating_transform(uuid, commit.state),
    }
}

/// Handle a single designer event (called from main event loop).
/// Returns Some(result) if event was handled, None otherwise.
pub fn handle_design_event(event: &BoxedEvent, state: &mut DesignerState) -> Option<EventResult> {
    let mut result = EventResult::default();

    // === Images ===
    if let Some(e) = downcast_event::<PlaceImageEvent>(event) {
        place_image_from_path(state, e.region, &e.path);
        return Some(result);
    }
    if let Some(e) = downcast_event::<AddFloatingImageEvent>(event) {
        add_image(state, None, display_name(&e.0), ImageSource::Path(e.0.clone()));
        return Some(result);
    }
    if let Some(e) = downcast_event::<DropImageBytesEvent>(event) {
        add_image(state, e.region, e.name.clone(), ImageSource::Bytes(Arc::clone(&e.bytes)));
        return Some(result);
    }
    if let Some(e) = downcast_event::<AssignRegionEvent>(event) {
        state.gestures.cancel_target(GestureTarget::Floating(e.image));
        state.gestures.cancel_target(GestureTarget::Region(e.region));
        let previous = state.design.image(e.image).and_then(|i| i.region);
        if let Some(prev) = previous {
            state.gestures.cancel_target(GestureTarget::Region(prev));
        }
        match state.design.assign_region(e.image, e.region) {
            Ok(Some(old)) => drop_image(state, &old),
            Ok(None) => {}
            Err(e) => warn!("Assign region: {:#}", e),
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<DetachImageEvent>(event) {
        state.gestures.cancel_target(GestureTarget::Region(e.0));
        let placement = state.design.transform(e.0);
        if let Some(uuid) = state.design.detach(e.0) {
            // keep the placement it had on the garment
            state.design.set_floating_transform(uuid, placement);
            info!("Detached image {} from {}", uuid, e.0);
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<RemoveRegionImageEvent>(event) {
        if let Some(old) = state.design.remove_region_image(e.0) {
            drop_image(state, &old);
            info!("Removed '{}' from {}", old.name, e.0);
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<RemoveImageEvent>(event) {
        if let Some(old) = state.design.remove_image(e.0) {
            drop_image(state, &old);
        }
        return Some(result);
    }

    // === Transforms ===
    if let Some(e) = downcast_event::<SetTransformEvent>(event) {
        if state.design.set_transform(e.region, e.state) {
            debug!("{}: transform set to {:?}", e.region, state.design.transform(e.region));
        }
        return Some(result);
    }
    if let Some(e) = downcast_event::<GestureCommitEvent>(event) {
        apply_commit(state.design, &e.0);
        return Some(result);
    }
    if let Some(e) = downcast_event::<ResetTransformEvent>(event) {
        state.gestures.cancel_target(GestureTarget::Region(e.0));
        state.design.reset_transform(e.0);
        return Some(result);
    }

    // === Colors & scene ===
    if let Some(e) = downcast_event::<SetColorEvent>(event) {
        // picker drags emit one per frame; the shell saves once the edit ends
        state.design.set_color(e.slot, e.color);
        result.colors_changed = true;
        return Some(result);
    }
    if downcast_event::<SaveColorsEvent>(event).is_some() {
        persist_colors(state);
        return Some(result);
    }
    if downcast_event::<ResetColorsEvent>(event).is_some() {
        let defaults = GarmentColors::from_registry(state.design.registry());
        state.design.apply_colors(defaults);
        persist_colors(state);
        info!("Colors reset to defaults");
        return Some(result);
    }
    if let Some(e) = downcast_event::<SetSceneEvent>(event) {
        state.design.set_scene(e.0);
        return Some(result);
    }

    // === Renderer ===
    if let Some(e) = downcast_event::<ContextLostEvent>(event) {
        warn!("Preview context lost: {}", e.0);
        state.gestures.cancel();
        result.context_lost = Some(e.0.clone());
        return Some(result);
    }
    if downcast_event::<RetryRenderEvent>(event).is_some() {
        info!("Retry: full preview reload");
        state.gestures.cancel();
        state.binder.invalidate();
        state.loader.forget_all();
        for (uuid, source) in state.design.begin_reload() {
            state.loader.request(uuid, source);
        }
        result.reload = true;
        return Some(result);
    }
    if let Some(e) = downcast_event::<OpenUploadDialogEvent>(event) {
        result.open_dialog = Some(e.0);
        return Some(result);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::{GestureMode, PointerId};
    use crate::entities::{Color, ColorSlot, MemoryStore, TransformState};
    use crate::entities::color_store::load_colors;
    use glam::Vec2;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::time::Duration;

    struct Fixture {
        design: Design,
        gestures: GestureController,
        loader: ImageLoader,
        binder: MaterialBinder,
        store: MemoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            let design = Design::default();
            Self {
                gestures: GestureController::new(*design.limits()),
                design,
                loader: ImageLoader::new().unwrap(),
                binder: MaterialBinder::default(),
                store: MemoryStore::new(),
            }
        }

        fn handle(&mut self, event: BoxedEvent) -> Option<EventResult> {
            let mut state = DesignerState {
                design: &mut self.design,
                gestures: &mut self.gestures,
                loader: &mut self.loader,
                binder: &mut self.binder,
                store: &mut self.store,
            };
            handle_design_event(&event, &mut state)
        }

        fn grab(&mut self, region: Region) {
            let state = self.design.transform(region);
            assert!(self.gestures.pointer_down(
                PointerId::MOUSE,
                GestureTarget::Region(region),
                GestureMode::Move,
                Vec2::ZERO,
                Vec2::ZERO,
                state,
            ));
        }
    }

    #[test]
    fn test_unknown_event_not_handled() {
        let mut fx = Fixture::new();
        assert!(fx.handle(Box::new(42u32)).is_none());
    }

    #[test]
    fn test_place_missing_file_marks_failed() {
        let mut fx = Fixture::new();
        fx.handle(Box::new(PlaceImageEvent {
            region: Region::Front,
            path: PathBuf::from("/nonexistent/drape/logo.png"),
        }));
        let uuid = fx.design.bound_image(Region::Front).unwrap().uuid;
        assert_eq!(fx.design.bound_image(Region::Front).unwrap().name, "logo.png");

        for res in fx.loader.wait(Duration::from_secs(10)) {
            assert!(res.result.is_err());
            fx.design.mark_failed(res.uuid, res.result.unwrap_err());
        }
        assert!(fx.design.image(uuid).unwrap().load.is_failed());
        // failed image falls back to the base material
        assert!(!fx.binder.describe(&fx.design, Region::Front).has_decal());
    }

    #[test]
    fn test_removing_region_image_cancels_gesture() {
        let mut fx = Fixture::new();
        fx.design.place_image(Region::Back, PlacedImage::from_pixels("b", RgbaImage::new(2, 2)));
        fx.grab(Region::Back);
        fx.gestures.pointer_move(PointerId::MOUSE, Vec2::new(10.0, 0.0));

        fx.handle(Box::new(RemoveRegionImageEvent(Region::Back)));
        assert!(!fx.gestures.is_active());
        assert!(fx.gestures.take_frame_commit().is_none());
        assert!(fx.design.bound_image(Region::Back).is_none());
    }

    #[test]
    fn test_final_commit_applied() {
        let mut fx = Fixture::new();
        fx.grab(Region::Front);
        fx.gestures.pointer_move(PointerId::MOUSE, Vec2::new(5.0, 5.0));
        let commit = fx.gestures.pointer_up(PointerId::MOUSE, Vec2::new(40.0, -20.0)).unwrap();
        assert!(commit.is_final);
        fx.handle(Box::new(GestureCommitEvent(commit)));
        assert_eq!(fx.design.transform(Region::Front).position, Vec2::new(40.0, -20.0));
        // the coalesced move never lands after the final state
        assert!(fx.gestures.take_frame_commit().is_none());
    }

    #[test]
    fn test_detach_keeps_placement() {
        let mut fx = Fixture::new();
        fx.design.place_image(Region::Front, PlacedImage::from_pixels("f", RgbaImage::new(2, 2)));
        let moved = TransformState { position: Vec2::new(30.0, -10.0), ..Default::default() };
        fx.handle(Box::new(SetTransformEvent { region: Region::Front, state: moved }));
        fx.handle(Box::new(DetachImageEvent(Region::Front)));

        let floating: Vec<_> = fx.design.floating_images().collect();
        assert_eq!(floating.len(), 1);
        assert_eq!(floating[0].floating.position, Vec2::new(30.0, -10.0));
    }

    #[test]
    fn test_color_drag_saves_once_on_release() {
        let mut fx = Fixture::new();
        for shade in 0..30u8 {
            let res = fx
                .handle(Box::new(SetColorEvent { slot: ColorSlot::Trim, color: Color::rgb(shade, 2, 3) }))
                .unwrap();
            assert!(res.colors_changed);
        }
        // nothing written while the picker is still dragging
        assert!(load_colors(&fx.store).is_none());
        assert_eq!(fx.design.colors().trim, Color::rgb(29, 2, 3));

        fx.handle(Box::new(SaveColorsEvent));
        assert_eq!(load_colors(&fx.store).unwrap().trim, Color::rgb(29, 2, 3));

        fx.handle(Box::new(ResetColorsEvent));
        assert_eq!(load_colors(&fx.store).unwrap(), GarmentColors::default());
    }

    #[test]
    fn test_dropped_bytes_decode_onto_region() {
        let mut fx = Fixture::new();
        let mut buf = Cursor::new(Vec::new());
        RgbaImage::new(3, 2).write_to(&mut buf, ImageFormat::Png).unwrap();
        fx.handle(Box::new(DropImageBytesEvent {
            region: Some(Region::Back),
            name: "paste.png".into(),
            bytes: buf.into_inner().into(),
        }));
        let uuid = fx.design.bound_image(Region::Back).unwrap().uuid;
        assert!(fx.design.image(uuid).unwrap().source.as_ref().unwrap().path().is_none());

        for res in fx.loader.wait(Duration::from_secs(10)) {
            fx.design.mark_loaded(res.uuid, res.result.unwrap());
        }
        assert_eq!(fx.design.image(uuid).unwrap().size(), Some((3, 2)));
        assert!(fx.binder.describe(&fx.design, Region::Back).has_decal());

        // no region: lands as a floating image
        fx.handle(Box::new(DropImageBytesEvent {
            region: None,
            name: "clip".into(),
            bytes: Arc::from(&b"junk"[..]),
        }));
        assert_eq!(fx.design.floating_images().count(), 1);
    }

    #[test]
    fn test_blocking_placement_survives_bad_file() {
        let mut design = Design::default();
        let uuid = place_image_blocking(&mut design, Region::LeftSleeve, Path::new("/nonexistent/drape/art.png"));
        assert!(design.image(uuid).unwrap().load.is_failed());
        let binder = MaterialBinder::default();
        assert!(!binder.describe(&design, Region::LeftSleeve).has_decal());

        let dir = std::env::temp_dir().join(format!("drape_blocking_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("art.png");
        RgbaImage::new(4, 4).save(&good).unwrap();
        let uuid = place_image_blocking(&mut design, Region::LeftSleeve, &good);
        assert!(design.image(uuid).unwrap().load.is_ready());
        assert!(binder.describe(&design, Region::LeftSleeve).has_decal());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_context_loss_then_retry() {
        let mut fx = Fixture::new();
        fx.binder.sync(&fx.design);
        fx.grab(Region::Front);

        let lost = fx.handle(Box::new(ContextLostEvent("device reset".into()))).unwrap();
        assert_eq!(lost.context_lost.as_deref(), Some("device reset"));
        assert!(!fx.gestures.is_active());

        let retry = fx.handle(Box::new(RetryRenderEvent)).unwrap();
        assert!(retry.reload);
        // binder forgot what the renderer had
        assert_eq!(fx.binder.sync(&fx.design).len(), 4);
    }

    #[test]
    fn test_upload_dialog_request() {
        let mut fx = Fixture::new();
        let res = fx.handle(Box::new(OpenUploadDialogEvent(Some(Region::RightSleeve)))).unwrap();
        assert_eq!(res.open_dialog, Some(Some(Region::RightSleeve)));
    }
}
