//! Attribute Editor-specific events.
//!
//! Nested editors can't reach app state (file dialogs, workers, the document
//! list), so anything beyond "here is the new node" goes through the bus.

use crate::entities::NodePath;

/// User asked to pick a file for the `binary` node at `path` under root `root`.
#[derive(Clone, Debug)]
pub struct PickBinaryEvent {
    pub root: usize,
    pub path: NodePath,
}

/// A root attribute was replaced by an edit. Marks the document dirty.
#[derive(Clone, Debug)]
pub struct AttributeEditedEvent {
    pub root: usize,
}

#[derive(Clone, Debug)]
pub struct AddAttributeEvent;

#[derive(Clone, Debug)]
pub struct RemoveAttributeEvent(pub usize);

#[derive(Clone, Debug)]
pub struct SelectAttributeEvent(pub usize);

#[derive(Clone, Debug)]
pub struct RenameAttributeEvent {
    pub root: usize,
    pub name: String,
}

/// Entry `index` of the node at `parent` under root `root` was removed by a
/// nested editor. Later siblings shift down by one.
#[derive(Clone, Debug)]
pub struct EntryRemovedEvent {
    pub root: usize,
    pub parent: NodePath,
    pub index: usize,
}
