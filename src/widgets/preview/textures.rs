//! GPU texture cache of the preview.
//!
//! Decals are uploaded once per image at full resolution; cropping is done
//! with texture coordinates, so dragging a crop edge never re-uploads.
//! Fabric tiles are generated procedurally per preset.

use std::collections::HashMap;

use eframe::egui::{self, ColorImage, Rect, TextureFilter, TextureHandle, TextureOptions, TextureWrapMode, pos2};
use image::RgbaImage;
use log::{debug, trace};
use uuid::Uuid;

use crate::entities::{CropRect, FabricPreset, PlacedImage, Sampling, UvTextureParams, WrapMode};

/// Edge length of a procedural fabric tile.
const FABRIC_TILE: u32 = 32;

/// Sampler options for a texture placed with `params`.
pub fn texture_options(params: &UvTextureParams) -> TextureOptions {
    let wrap_mode = match params.wrap {
        WrapMode::ClampToEdge => TextureWrapMode::ClampToEdge,
        WrapMode::Repeat => TextureWrapMode::Repeat,
    };
    let mipmap_mode = match params.sampling {
        Sampling::LinearNoMips => None,
        Sampling::Mipmapped => Some(TextureFilter::Linear),
    };
    TextureOptions {
        magnification: TextureFilter::Linear,
        minification: TextureFilter::Linear,
        wrap_mode,
        mipmap_mode,
    }
}

pub fn to_color_image(img: &RgbaImage) -> ColorImage {
    let size = [img.width() as usize, img.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, img.as_raw())
}

/// Crop rectangle as normalized egui texture coordinates (+V down).
pub fn crop_uv_rect(crop: CropRect, size: (u32, u32)) -> Rect {
    if size.0 == 0 || size.1 == 0 {
        return Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    }
    let (w, h) = (size.0 as f32, size.1 as f32);
    Rect::from_min_max(
        pos2(crop.x as f32 / w, crop.y as f32 / h),
        pos2((crop.x + crop.width) as f32 / w, (crop.y + crop.height) as f32 / h),
    )
}

/// Grayscale weave for `preset`, tinted by the base color at draw time.
pub fn fabric_tile(preset: FabricPreset) -> Option<RgbaImage> {
    preset.tile_repeat()?;
    let tile = RgbaImage::from_fn(FABRIC_TILE, FABRIC_TILE, |x, y| {
        let v: u8 = match preset {
            FabricPreset::Smooth => 255,
            // plain weave: alternating over/under
            FabricPreset::Cotton => {
                if (x / 2 + y / 2) % 2 == 0 { 250 } else { 226 }
            }
            // speckled: cheap hash per texel
            FabricPreset::Heather => {
                let h = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
                200 + (h % 56) as u8
            }
            // twill: diagonal ribs
            FabricPreset::Denim => {
                if (x + y) % 4 < 2 { 245 } else { 205 }
            }
        };
        image::Rgba([v, v, v, 255])
    });
    Some(tile)
}

/// Textures currently on the GPU.
#[derive(Default)]
pub struct TextureCache {
    decals: HashMap<Uuid, (TextureHandle, (u32, u32))>,
    fabrics: HashMap<FabricPreset, TextureHandle>,
}

impl TextureCache {
    /// Texture of a decoded image, uploading on first use.
    pub fn decal(
        &mut self,
        ctx: &egui::Context,
        image: &PlacedImage,
        params: &UvTextureParams,
    ) -> Option<(TextureHandle, (u32, u32))> {
        if let Some(entry) = self.decals.get(&image.uuid) {
            return Some(entry.clone());
        }
        let pixels = image.pixels()?;
        let handle = ctx.load_texture(
            format!("decal-{}", image.uuid),
            to_color_image(pixels),
            texture_options(params),
        );
        debug!("Uploaded decal '{}' {}x{}", image.name, pixels.width(), pixels.height());
        let entry = (handle, pixels.dimensions());
        self.decals.insert(image.uuid, entry.clone());
        Some(entry)
    }

    /// Tile texture of a fabric preset (`None` for smooth).
    pub fn fabric(&mut self, ctx: &egui::Context, preset: FabricPreset, params: &UvTextureParams) -> Option<TextureHandle> {
        if let Some(handle) = self.fabrics.get(&preset) {
            return Some(handle.clone());
        }
        let tile = fabric_tile(preset)?;
        let handle = ctx.load_texture(format!("fabric-{:?}", preset), to_color_image(&tile), texture_options(params));
        self.fabrics.insert(preset, handle.clone());
        Some(handle)
    }

    /// Free decals whose image is gone or no longer decoded.
    pub fn retain_decals(&mut self, live: impl Fn(&Uuid) -> bool) {
        self.decals.retain(|uuid, _| {
            let keep = live(uuid);
            if !keep {
                trace!("Freed decal texture {}", uuid);
            }
            keep
        });
    }

    /// Drop every texture (full reload).
    pub fn clear(&mut self) {
        debug!("Dropping {} decal and {} fabric textures", self.decals.len(), self.fabrics.len());
        self.decals.clear();
        self.fabrics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TextureRole;

    #[test]
    fn test_options_follow_role() {
        let decal = texture_options(&UvTextureParams::identity(TextureRole::Decal));
        assert_eq!(decal.wrap_mode, TextureWrapMode::ClampToEdge);
        assert!(decal.mipmap_mode.is_none());

        let base = texture_options(&UvTextureParams::tiled(8.0));
        assert_eq!(base.wrap_mode, TextureWrapMode::Repeat);
        assert!(base.mipmap_mode.is_some());
    }

    #[test]
    fn test_crop_uv_rect() {
        let rect = crop_uv_rect(CropRect { x: 10, y: 0, width: 10, height: 5 }, (20, 10));
        assert_eq!(rect, Rect::from_min_max(pos2(0.5, 0.0), pos2(1.0, 0.5)));
        assert_eq!(crop_uv_rect(CropRect::full((7, 3)), (7, 3)), Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)));
    }

    #[test]
    fn test_fabric_tiles() {
        assert!(fabric_tile(FabricPreset::Smooth).is_none());
        for preset in [FabricPreset::Cotton, FabricPreset::Heather, FabricPreset::Denim] {
            let tile = fabric_tile(preset).unwrap();
            assert_eq!(tile.dimensions(), (FABRIC_TILE, FABRIC_TILE));
            assert!(tile.pixels().all(|p| p.0[3] == 255 && p.0[0] >= 200));
        }
    }

    #[test]
    fn test_color_image_size() {
        let img = to_color_image(&RgbaImage::new(3, 2));
        assert_eq!(img.size, [3, 2]);
    }
}
