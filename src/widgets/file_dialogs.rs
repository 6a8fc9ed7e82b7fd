//! Shared file dialog helpers for widget UI.

pub const DOCUMENT_EXTS: &[&str] = &["json"];

/// Any file; binary attributes accept arbitrary content.
pub fn create_binary_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new().set_title(title)
}

/// Dialog filtered to attribute documents.
pub fn create_document_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Attribute Document", DOCUMENT_EXTS)
        .set_title(title)
}
