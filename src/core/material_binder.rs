//! Material binder - design state to renderer material descriptors.
//!
//! One binder per mounted preview. Each frame the update loop calls `sync()`,
//! which re-derives every region's descriptor and returns only the regions
//! that changed since the previous sync. The renderer applies that diff and
//! never writes back.
//!
//! ```text
//! gesture -> TransformState -> derive() -> diff -> renderer
//! ```

use indexmap::IndexMap;
use log::{debug, trace};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    Color, CropRect, Design, FabricPreset, LoadState, PlacementConfig, Region, UvTextureParams, map_placement,
};

/// Render order of the flat base material.
pub const BASE_RENDER_ORDER: i32 = 0;
/// Render order of a decal, drawn over the base.
pub const DECAL_RENDER_ORDER: i32 = 1;

/// Decoded artwork drawn on a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecalBinding {
    pub image: Uuid,
    /// Visible part of the source, in source pixels
    pub crop: CropRect,
    pub params: UvTextureParams,
}

/// Tiled fabric texture under the base color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseTexture {
    pub fabric: FabricPreset,
    pub params: UvTextureParams,
}

/// Everything the renderer needs to draw one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialDescriptor {
    pub color: Color,
    /// Color of the region's collar or cuff piece
    pub trim: Color,
    pub decal: Option<DecalBinding>,
    pub base_texture: Option<BaseTexture>,
    pub transparent: bool,
    pub render_order: i32,
}

impl MaterialDescriptor {
    /// Flat base-color material.
    pub fn base(color: Color, trim: Color, base_texture: Option<BaseTexture>) -> Self {
        Self {
            color,
            trim,
            decal: None,
            base_texture,
            transparent: false,
            render_order: BASE_RENDER_ORDER,
        }
    }

    pub fn has_decal(&self) -> bool {
        self.decal.is_some()
    }
}

/// A region whose material must be re-applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialChange {
    pub region: Region,
    pub material_slot: &'static str,
    pub trim_slot: &'static str,
    pub descriptor: MaterialDescriptor,
}

/// Derives descriptors and tracks what the renderer last received.
#[derive(Debug, Clone, Default)]
pub struct MaterialBinder {
    config: PlacementConfig,
    applied: IndexMap<Region, MaterialDescriptor>,
}

impl MaterialBinder {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config: config.sanitized(),
            applied: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Descriptor of one region.
    pub fn describe(&self, design: &Design, region: Region) -> MaterialDescriptor {
        let color = design.base_color(region);
        let base_texture = design.scene().fabric.tile_repeat().map(|repeat| BaseTexture {
            fabric: design.scene().fabric,
            params: UvTextureParams::tiled(repeat),
        });
        let base = MaterialDescriptor::base(color, design.colors().trim, base_texture);

        let Some(image) = design.bound_image(region) else {
            return base;
        };
        let pixels = match &image.load {
            LoadState::Ready(pixels) => pixels,
            LoadState::Pending => return base,
            LoadState::Failed(err) => {
                trace!("{}: image '{}' failed ({}), base color only", region, image.name, err);
                return base;
            }
        };

        let state = design.transform(region);
        let crop = state
            .crop
            .to_source_rect(pixels.dimensions(), design.limits().crop_base_size);
        MaterialDescriptor {
            decal: Some(DecalBinding {
                image: image.uuid,
                crop,
                params: map_placement(&state, region, &self.config),
            }),
            transparent: true,
            render_order: DECAL_RENDER_ORDER,
            ..base
        }
    }

    /// Descriptors for every region, in registry order.
    pub fn derive(&self, design: &Design) -> IndexMap<Region, MaterialDescriptor> {
        design
            .registry()
            .iter()
            .map(|b| (b.region, self.describe(design, b.region)))
            .collect()
    }

    /// Regions whose descriptor changed since the previous sync.
    pub fn sync(&mut self, design: &Design) -> Vec<MaterialChange> {
        let mut changes = Vec::new();
        for (region, descriptor) in self.derive(design) {
            if self.applied.get(&region) == Some(&descriptor) {
                continue;
            }
            let binding = design.registry().get(region);
            changes.push(MaterialChange {
                region,
                material_slot: binding.material_slot,
                trim_slot: binding.trim_slot,
                descriptor,
            });
            self.applied.insert(region, descriptor);
        }
        if !changes.is_empty() {
            debug!("MaterialBinder: {} region(s) changed", changes.len());
        }
        changes
    }

    /// Last descriptor handed to the renderer for `region`.
    pub fn applied(&self, region: Region) -> Option<&MaterialDescriptor> {
        self.applied.get(&region)
    }

    /// Forget what the renderer has; next sync re-sends every region.
    pub fn invalidate(&mut self) {
        self.applied.clear();
    }
}
