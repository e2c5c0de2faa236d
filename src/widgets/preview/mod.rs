//! Preview widget - flat garment renderer with drag handles
//!
//! Consumes material diffs from the binder and routes pointer input into the
//! gesture controller; never writes the design directly.

pub mod layout;
mod preview_ui;
pub mod textures;

pub use preview_ui::{PreviewActions, PreviewState, render};
