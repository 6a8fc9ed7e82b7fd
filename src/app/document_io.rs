//! Document I/O for AttrFormApp.
//!
//! Contains methods for:
//! - New/open/save of attribute documents (new_document, load_document, save_document, quick_save)
//! - File dialogs (show_open_dialog, show_save_as_dialog)

use super::AttrFormApp;
use crate::entities::Document;
use crate::widgets::file_dialogs;

use log::{error, info};
use std::path::PathBuf;

impl AttrFormApp {
    /// Drop the current document and start empty.
    pub fn new_document(&mut self) {
        self.binary_loader.cancel_all();
        self.document = Document::new();
        self.attributes_state.selected = None;
        self.last_save_path = None;
        self.error_msg = None;
        self.mark_clean();
        self.status_bar.set_message("New document");
        info!("New document");
    }

    /// Load a document from disk, replacing the current one.
    pub fn load_document(&mut self, path: PathBuf) {
        match Document::from_json(&path) {
            Ok(document) => {
                self.binary_loader.cancel_all();
                self.attributes_state.selected = (!document.is_empty()).then_some(0);
                self.document = document;
                self.last_save_path = Some(path.clone());
                self.error_msg = None;
                self.mark_clean();
                self.status_bar
                    .set_message(format!("Opened {}", path.display()));
            }
            Err(e) => {
                error!("{:#}", e);
                self.error_msg = Some(format!("{:#}", e));
            }
        }
    }

    pub fn save_document(&mut self, path: PathBuf) {
        if let Err(e) = self.document.to_json(&path) {
            error!("{:#}", e);
            self.error_msg = Some(format!("{:#}", e));
        } else {
            info!("Saved document to {}", path.display());
            self.status_bar.set_message(format!("Saved {}", path.display()));
            self.last_save_path = Some(path);
            self.mark_clean();
        }
    }

    /// Quick save - saves to last path or shows dialog
    pub fn quick_save(&mut self) {
        if let Some(path) = self.last_save_path.clone() {
            info!("Quick save to {}", path.display());
            self.save_document(path);
        } else {
            self.show_save_as_dialog();
        }
    }

    pub fn show_save_as_dialog(&mut self) {
        let mut dialog = file_dialogs::create_document_dialog("Save Attributes");
        if let Some(dir) = self.last_save_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.set_file_name("attributes.json").save_file() {
            self.save_document(path);
        }
    }

    pub fn show_open_dialog(&mut self) {
        if let Some(path) = file_dialogs::create_document_dialog("Open Attributes").pick_file() {
            self.load_document(path);
        }
    }
}
