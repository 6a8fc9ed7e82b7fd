//! UI Widgets - modular, reusable UI components
//!
//! Each widget is self-contained and communicates via EventBus

pub mod ae;
pub mod file_dialogs;
pub mod status;
