//! Entities - the attribute tree and its host document
//!
//! Pure data + edit logic, no UI. The Attribute Editor widget renders these
//! types and reports replacements built with the operations in [`edits`].

pub mod attr_node;
pub mod data_url;
pub mod document;
pub mod edits;
pub mod node_path;

pub use attr_node::{AttrValue, AttributeNode, DataType, Entry, ShapeError};
pub use data_url::DataUrl;
pub use document::Document;
pub use edits::{EditError, MapField, TypeChangePolicy};
pub use node_path::{NodePath, PathStep, Via};
