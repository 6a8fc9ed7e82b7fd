//! ATTRFORM - recursive attribute tree form editor
//!
//! Re-exports all modules for use by the binary target.

// Core engine (events, workers, binary reads)
pub mod core;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod entities;
pub mod widgets;

// Re-export commonly used types from core
pub use core::binary_loader::{BinaryLoaded, BinaryLoader, BinaryReadError};
pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};

// Re-export entities
pub use entities::{AttrValue, AttributeNode, DataType, Document, Entry, NodePath};
