//! Core engine modules - events, gestures, image decoding, material binding
//!
//! These modules drive the designer, independent of UI.

pub mod design_events;
pub mod event_bus;
pub mod frame_coalescer;
pub mod gesture;
pub mod image_loader;
pub mod material_binder;

// Re-exports for convenience
pub use event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use frame_coalescer::FrameCoalescer;
pub use gesture::{Corner, Edge, GestureController, GestureMode, GestureTarget, PointerId, TransformCommit};
pub use image_loader::{ImageLoader, LoadResult};
pub use material_binder::{MaterialBinder, MaterialChange, MaterialDescriptor};
