//! Entities module - designer data model, independent of UI.
//!
//! - Region registry and per-region transforms
//! - Placement mapping (transform -> UV sampler parameters)
//! - Uploaded images, colors, scene presets and the color snapshot store

pub mod color;
pub mod color_store;
pub mod design;
pub mod keys;
pub mod placed_image;
pub mod placement;
pub mod presets;
pub mod region;
pub mod space;
pub mod transform;

pub use color::Color;
pub use color_store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use design::{ColorSlot, Design, GarmentColors};
pub use placed_image::{ImageSource, LoadState, PlacedImage};
pub use placement::{PlacementConfig, Sampling, TextureRole, UvTextureParams, WrapMode, map_placement};
pub use presets::{Background, FabricPreset, LightingPreset, MotionPreset, SceneConfig};
pub use region::{Region, RegionBinding, RegionRegistry};
pub use transform::{CropMargins, CropRect, RotationRange, ScaleRange, TransformLimits, TransformState};
