//! Toolbar / menu events handled by the app.

use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct NewDocumentEvent;

/// Open a document; `None` shows the file dialog.
#[derive(Clone, Debug)]
pub struct OpenDocumentEvent(pub Option<PathBuf>);

/// Save to the last path (or ask for one).
#[derive(Clone, Debug)]
pub struct SaveDocumentEvent;

#[derive(Clone, Debug)]
pub struct SaveDocumentAsEvent;

#[derive(Clone, Debug)]
pub struct ShowSettingsEvent;
