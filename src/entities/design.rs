//! Design state: what the user has placed, where, and in which colors.
//!
//! Owned by the UI thread. Mutated through the event handlers; the material
//! binder re-derives renderer state from it after every change.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use image::RgbaImage;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::color::Color;
use super::placed_image::{ImageSource, LoadState, PlacedImage};
use super::presets::SceneConfig;
use super::region::{Region, RegionRegistry};
use super::transform::{TransformLimits, TransformState};

/// Color slots of the garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSlot {
    /// Front and back panels
    Body,
    LeftSleeve,
    RightSleeve,
    /// Collar and cuffs
    Trim,
}

impl ColorSlot {
    pub const ALL: [ColorSlot; 4] = [
        ColorSlot::Body,
        ColorSlot::LeftSleeve,
        ColorSlot::RightSleeve,
        ColorSlot::Trim,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ColorSlot::Body => "Body",
            ColorSlot::LeftSleeve => "Left Sleeve",
            ColorSlot::RightSleeve => "Right Sleeve",
            ColorSlot::Trim => "Trim",
        }
    }

    /// Slot providing the base color of `region`.
    pub fn for_region(region: Region) -> Self {
        match region {
            Region::Front | Region::Back => ColorSlot::Body,
            Region::LeftSleeve => ColorSlot::LeftSleeve,
            Region::RightSleeve => ColorSlot::RightSleeve,
        }
    }
}

/// Garment colors; this is the persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarmentColors {
    pub body: Color,
    pub left_sleeve: Color,
    pub right_sleeve: Color,
    pub trim: Color,
}

impl Default for GarmentColors {
    fn default() -> Self {
        Self::from_registry(&RegionRegistry::garment())
    }
}

impl GarmentColors {
    pub fn from_registry(registry: &RegionRegistry) -> Self {
        Self {
            body: registry.get(Region::Front).default_color,
            left_sleeve: registry.get(Region::LeftSleeve).default_color,
            right_sleeve: registry.get(Region::RightSleeve).default_color,
            trim: Color::rgb(0xe6, 0xe6, 0xe6),
        }
    }

    pub fn get(&self, slot: ColorSlot) -> Color {
        match slot {
            ColorSlot::Body => self.body,
            ColorSlot::LeftSleeve => self.left_sleeve,
            ColorSlot::RightSleeve => self.right_sleeve,
            ColorSlot::Trim => self.trim,
        }
    }

    pub fn set(&mut self, slot: ColorSlot, color: Color) {
        match slot {
            ColorSlot::Body => self.body = color,
            ColorSlot::LeftSleeve => self.left_sleeve = color,
            ColorSlot::RightSleeve => self.right_sleeve = color,
            ColorSlot::Trim => self.trim = color,
        }
    }

    pub fn for_region(&self, region: Region) -> Color {
        self.get(ColorSlot::for_region(region))
    }
}

/// Full designer state.
#[derive(Debug, Clone)]
pub struct Design {
    registry: RegionRegistry,
    limits: TransformLimits,
    transforms: IndexMap<Region, TransformState>,
    images: IndexMap<Uuid, PlacedImage>,
    bindings: IndexMap<Region, Uuid>,
    colors: GarmentColors,
    scene: SceneConfig,
}

impl Default for Design {
    fn default() -> Self {
        Self::new(RegionRegistry::garment(), TransformLimits::default())
    }
}

impl Design {
    pub fn new(registry: RegionRegistry, limits: TransformLimits) -> Self {
        let limits = limits.sanitized();
        let transforms = Region::ALL
            .into_iter()
            .map(|r| (r, TransformState::for_region(r, &registry).clamped(&limits)))
            .collect();
        let colors = GarmentColors::from_registry(&registry);
        Self {
            registry,
            limits,
            transforms,
            images: IndexMap::new(),
            bindings: IndexMap::new(),
            colors,
            scene: SceneConfig::default(),
        }
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn limits(&self) -> &TransformLimits {
        &self.limits
    }

    // ========== Images ==========

    /// Bind `image` to `region`. Returns the image it replaced, if any.
    pub fn place_image(&mut self, region: Region, mut image: PlacedImage) -> Option<PlacedImage> {
        let replaced = self.unbind(region);
        let uuid = image.uuid;
        image.region = Some(region);
        info!("Placed image '{}' ({}) on {}", image.name, uuid, region);
        self.images.insert(uuid, image);
        self.bindings.insert(region, uuid);
        replaced
    }

    /// Add an image that is not bound to any region.
    pub fn place_floating_image(&mut self, mut image: PlacedImage) -> Uuid {
        let uuid = image.uuid;
        image.region = None;
        image.floating = image.floating.clamped(&self.limits);
        debug!("Added floating image '{}' ({})", image.name, uuid);
        self.images.insert(uuid, image);
        uuid
    }

    /// Move an existing image onto `region`. Returns the image it replaced.
    pub fn assign_region(&mut self, uuid: Uuid, region: Region) -> Result<Option<PlacedImage>> {
        let mut image = self
            .images
            .shift_remove(&uuid)
            .ok_or_else(|| anyhow!("Image {} not found", uuid))?;
        if let Some(old) = image.region.take() {
            self.bindings.shift_remove(&old);
        }
        Ok(self.place_image(region, image))
    }

    /// Detach a bound image from its region and keep it floating.
    pub fn detach(&mut self, region: Region) -> Option<Uuid> {
        let uuid = self.bindings.shift_remove(&region)?;
        if let Some(image) = self.images.get_mut(&uuid) {
            image.region = None;
        }
        Some(uuid)
    }

    /// Remove an image entirely.
    pub fn remove_image(&mut self, uuid: Uuid) -> Option<PlacedImage> {
        let image = self.images.shift_remove(&uuid)?;
        if let Some(region) = image.region {
            self.bindings.shift_remove(&region);
        }
        info!("Removed image '{}' ({})", image.name, uuid);
        Some(image)
    }

    /// Remove the image bound to `region`.
    pub fn remove_region_image(&mut self, region: Region) -> Option<PlacedImage> {
        self.unbind(region)
    }

    fn unbind(&mut self, region: Region) -> Option<PlacedImage> {
        let uuid = self.bindings.shift_remove(&region)?;
        self.images.shift_remove(&uuid)
    }

    pub fn image(&self, uuid: Uuid) -> Option<&PlacedImage> {
        self.images.get(&uuid)
    }

    pub fn images(&self) -> impl Iterator<Item = &PlacedImage> {
        self.images.values()
    }

    pub fn floating_images(&self) -> impl Iterator<Item = &PlacedImage> {
        self.images.values().filter(|i| i.region.is_none())
    }

    pub fn bound_image(&self, region: Region) -> Option<&PlacedImage> {
        self.bindings.get(&region).and_then(|uuid| self.images.get(uuid))
    }

    /// Set decoded pixels. Returns false if the image was removed meanwhile.
    pub fn mark_loaded(&mut self, uuid: Uuid, pixels: Arc<RgbaImage>) -> bool {
        let Some(image) = self.images.get_mut(&uuid) else {
            debug!("Dropping decoded pixels for removed image {}", uuid);
            return false;
        };
        info!("Image '{}' ready: {}x{}", image.name, pixels.width(), pixels.height());
        image.load = LoadState::Ready(pixels);
        true
    }

    /// Record a decode failure. The region falls back to its base color.
    pub fn mark_failed(&mut self, uuid: Uuid, error: impl Into<String>) -> bool {
        let Some(image) = self.images.get_mut(&uuid) else {
            return false;
        };
        let error = error.into();
        warn!("Image '{}' failed to load, using base color: {}", image.name, error);
        image.load = LoadState::Failed(error);
        true
    }

    /// Put every image with an encoded source back to Pending for a full reload.
    ///
    /// Returns the decodes to request. Images handed over decoded keep their pixels.
    pub fn begin_reload(&mut self) -> Vec<(Uuid, ImageSource)> {
        self.images
            .values_mut()
            .filter_map(|image| {
                let source = image.source.clone()?;
                image.load = LoadState::Pending;
                Some((image.uuid, source))
            })
            .collect()
    }

    // ========== Transforms ==========

    pub fn transform(&self, region: Region) -> TransformState {
        self.transforms
            .get(&region)
            .copied()
            .unwrap_or_else(|| TransformState::for_region(region, &self.registry))
    }

    /// Store a clamped copy of `state`. Returns true if anything changed.
    pub fn set_transform(&mut self, region: Region, state: TransformState) -> bool {
        let clamped = state.clamped(&self.limits);
        let slot = self.transforms.entry(region).or_default();
        if *slot == clamped {
            return false;
        }
        *slot = clamped;
        true
    }

    /// Back to the region defaults.
    pub fn reset_transform(&mut self, region: Region) {
        debug!("Reset transform on {}", region);
        let fresh = TransformState::for_region(region, &self.registry).clamped(&self.limits);
        self.transforms.insert(region, fresh);
    }

    /// Placement of a floating image.
    pub fn set_floating_transform(&mut self, uuid: Uuid, state: TransformState) -> bool {
        let clamped = state.clamped(&self.limits);
        match self.images.get_mut(&uuid) {
            Some(image) if image.region.is_none() && image.floating != clamped => {
                image.floating = clamped;
                true
            }
            _ => false,
        }
    }

    // ========== Colors & scene ==========

    pub fn colors(&self) -> GarmentColors {
        self.colors
    }

    pub fn set_color(&mut self, slot: ColorSlot, color: Color) {
        self.colors.set(slot, color);
    }

    pub fn apply_colors(&mut self, colors: GarmentColors) {
        self.colors = colors;
    }

    pub fn base_color(&self, region: Region) -> Color {
        self.colors.for_region(region)
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn set_scene(&mut self, scene: SceneConfig) {
        self.scene = scene;
    }
}
