//! UI Widgets - modular, reusable UI components
//!
//! Each widget is self-contained and communicates via EventBus

pub mod actions;
pub mod file_dialogs;
pub mod preview;
pub mod sidebar;
