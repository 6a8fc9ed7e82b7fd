//! Core runtime modules - events, workers, background reads
//!
//! These modules are independent of UI.

pub mod binary_loader;
pub mod event_bus;
pub mod workers;

// Re-exports for convenience
pub use binary_loader::{BinaryLoaded, BinaryLoader, BinaryReadError};
pub use event_bus::{EventBus, EventEmitter, downcast_event};
pub use workers::Workers;
