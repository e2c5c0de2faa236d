//! Designer intents emitted by the sidebar and the preview.

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::gesture::TransformCommit;
use crate::entities::{Color, ColorSlot, Region, SceneConfig, TransformState};

// === Images ===

/// Upload a file onto a region (replaces the current image there).
#[derive(Clone, Debug)]
pub struct PlaceImageEvent {
    pub region: Region,
    pub path: PathBuf,
}

/// Upload a file without binding it to a region.
#[derive(Clone, Debug)]
pub struct AddFloatingImageEvent(pub PathBuf);

/// Dropped image that arrived as bytes without a file path.
#[derive(Clone, Debug)]
pub struct DropImageBytesEvent {
    /// `None` = floating
    pub region: Option<Region>,
    pub name: String,
    pub bytes: Arc<[u8]>,
}

/// Bind an existing (floating or bound) image to a region.
#[derive(Clone, Debug)]
pub struct AssignRegionEvent {
    pub image: Uuid,
    pub region: Region,
}

/// Unbind a region's image but keep it in the floating list.
#[derive(Clone, Debug)]
pub struct DetachImageEvent(pub Region);

#[derive(Clone, Debug)]
pub struct RemoveRegionImageEvent(pub Region);

#[derive(Clone, Debug)]
pub struct RemoveImageEvent(pub Uuid);

// === Transforms ===

/// Direct edit from the sidebar sliders.
#[derive(Clone, Debug)]
pub struct SetTransformEvent {
    pub region: Region,
    pub state: TransformState,
}

#[derive(Clone, Debug)]
pub struct ResetTransformEvent(pub Region);

/// Final state of a drag (pointer-up), applied immediately.
#[derive(Clone, Debug)]
pub struct GestureCommitEvent(pub TransformCommit);

// === Colors & scene ===

#[derive(Clone, Debug)]
pub struct SetColorEvent {
    pub slot: ColorSlot,
    pub color: Color,
}

/// Write the color snapshot (edit finished, or explicit save).
#[derive(Clone, Debug)]
pub struct SaveColorsEvent;

#[derive(Clone, Debug)]
pub struct ResetColorsEvent;

#[derive(Clone, Debug)]
pub struct SetSceneEvent(pub SceneConfig);

// === Renderer ===

/// The preview lost its GPU resources.
#[derive(Clone, Debug)]
pub struct ContextLostEvent(pub String);

/// User pressed Retry after a context loss: full reload.
#[derive(Clone, Debug)]
pub struct RetryRenderEvent;

/// Open the native file dialog for a region (`None` = floating upload).
#[derive(Clone, Debug)]
pub struct OpenUploadDialogEvent(pub Option<Region>);
