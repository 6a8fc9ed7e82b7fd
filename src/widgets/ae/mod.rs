//! Attribute Editor widget
//!
//! Recursive form editor for attribute trees plus the root attribute list.

mod ae_events;
mod ae_list;
mod ae_ui;

pub use ae_events::{
    AddAttributeEvent, AttributeEditedEvent, EntryRemovedEvent, PickBinaryEvent, RemoveAttributeEvent,
    RenameAttributeEvent, SelectAttributeEvent,
};
pub use ae_list::{AttributesState, render_attribute_list};
pub use ae_ui::{EditorOptions, render};
