//! DRAPE - Apparel mockup designer library
//!
//! Re-exports all modules for use by the binary target.

// Core engine (events, gestures, image decoding, material binding)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod main_events;
pub mod widgets;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use core::gesture::GestureController;
pub use core::material_binder::{MaterialBinder, MaterialDescriptor};

// Re-export entities
pub use entities::{Design, PlacementConfig, Region, TransformState, UvTextureParams, map_placement};
