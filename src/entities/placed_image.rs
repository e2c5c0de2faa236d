//! Uploaded artwork and its decode state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use uuid::Uuid;

use super::region::Region;
use super::transform::{CropMargins, CropRect, TransformState};

/// Where an upload's encoded bytes come from.
///
/// Kept on the image so a full reload can decode it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Dropped without a file path (bytes handed over by the platform)
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageSource::Path(p) => Some(p),
            ImageSource::Bytes(_) => None,
        }
    }
}

/// Decode progress of an uploaded image.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Decode requested, not finished
    Pending,
    /// Decoded RGBA8 pixels
    Ready(Arc<RgbaImage>),
    /// Decode failed; the region shows its base color until re-upload
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// One uploaded image, optionally bound to a region.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub uuid: Uuid,
    /// Display name (file name of the upload)
    pub name: String,
    /// `None` for images handed over already decoded
    pub source: Option<ImageSource>,
    pub load: LoadState,
    /// `None` = free-floating, never applied to a material
    pub region: Option<Region>,
    /// Placement used while floating; bound images use the region transform
    pub floating: TransformState,
}

impl PlacedImage {
    pub fn new(name: impl Into<String>, source: Option<ImageSource>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            source,
            load: LoadState::Pending,
            region: None,
            floating: TransformState::default(),
        }
    }

    /// Image already decoded in memory (drops, tests, CLI).
    pub fn from_pixels(name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            load: LoadState::Ready(Arc::new(pixels)),
            ..Self::new(name, None)
        }
    }

    pub fn pixels(&self) -> Option<&Arc<RgbaImage>> {
        match &self.load {
            LoadState::Ready(img) => Some(img),
            _ => None,
        }
    }

    /// Source size in pixels once decoded.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.pixels().map(|img| img.dimensions())
    }

    /// Crop rectangle in source pixels for the given insets.
    pub fn crop_rect(&self, crop: &CropMargins, base: f32) -> Option<CropRect> {
        self.size().map(|size| crop.to_source_rect(size, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_has_no_crop() {
        let img = PlacedImage::new("logo.png", Some(ImageSource::Path(PathBuf::from("logo.png"))));
        assert!(!img.load.is_ready());
        assert!(img.crop_rect(&CropMargins::default(), 200.0).is_none());
        assert!(img.region.is_none());
        assert_eq!(img.source.as_ref().and_then(|s| s.path()), Some(Path::new("logo.png")));
    }

    #[test]
    fn test_ready_crop_rect() {
        let img = PlacedImage::from_pixels("dot", RgbaImage::new(20, 10));
        let rect = img.crop_rect(&CropMargins { left: 100.0, ..Default::default() }, 200.0);
        assert_eq!(rect, Some(CropRect { x: 10, y: 0, width: 10, height: 10 }));
    }
}
