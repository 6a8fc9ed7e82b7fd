//! Application module - AttrFormApp and related functionality.
//!
//! This module organizes the main application logic into focused submodules:
//! - `events` - Event handling (handle_events, apply_binary_results)
//! - `document_io` - Document loading and saving
//! - `run` - eframe::App implementation (frame loop, panels)

pub mod app_events;
mod document_io;
mod events;
mod run;

use crate::config::PathConfig;
use crate::core::binary_loader::BinaryLoader;
use crate::core::event_bus::EventBus;
use crate::core::workers::Workers;
use crate::dialogs::prefs::AppSettings;
use crate::entities::{AttributeNode, Document};
use crate::widgets::ae::{AttributeEditedEvent, AttributesState};
use crate::widgets::status::StatusBar;

use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Main application state.
///
/// Persisted via eframe storage: the open document, settings, panel state, the
/// last save path and whether the document had unsaved changes. Runtime pieces
/// (workers, loader, bus) are rebuilt.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AttrFormApp {
    pub document: Document,
    pub settings: AppSettings,
    pub attributes_state: AttributesState,
    pub last_save_path: Option<PathBuf>,
    /// Snapshot of `dirty` taken when state is persisted
    #[serde(rename = "dirty")]
    unsaved_changes: bool,
    #[serde(skip)]
    pub error_msg: Option<String>,
    #[serde(skip)]
    pub status_bar: StatusBar,
    #[serde(skip)]
    pub show_settings: bool,
    /// Last title sent to the viewport
    #[serde(skip)]
    pub window_title: String,
    /// Global event bus for application-wide events
    #[serde(skip)]
    pub event_bus: EventBus,
    /// Set by any AttributeEditedEvent, cleared on save/load
    #[serde(skip)]
    pub dirty: Arc<AtomicBool>,
    /// Worker pool for binary reads
    #[serde(skip)]
    pub workers: Arc<Workers>,
    #[serde(skip)]
    pub binary_loader: BinaryLoader,
    #[serde(skip)]
    pub path_config: PathConfig,
}

impl Default for AttrFormApp {
    fn default() -> Self {
        let settings = AppSettings::default();
        let workers = Arc::new(Workers::new(settings.worker_threads()));
        let binary_loader = BinaryLoader::new(Arc::clone(&workers));

        let event_bus = EventBus::new();
        let dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dirty);
        event_bus.subscribe::<AttributeEditedEvent, _>(move |_| {
            flag.store(true, Ordering::Relaxed);
        });

        Self {
            document: Document::sample(),
            settings,
            attributes_state: AttributesState {
                selected: Some(0),
                ..Default::default()
            },
            last_save_path: None,
            unsaved_changes: false,
            error_msg: None,
            status_bar: StatusBar::new(),
            show_settings: false,
            window_title: String::new(),
            event_bus,
            dirty,
            workers,
            binary_loader,
            path_config: PathConfig::from_env_and_cli(None),
        }
    }
}

impl AttrFormApp {
    /// Replace the worker pool (CLI/settings override). Outstanding reads are dropped.
    pub fn set_workers(&mut self, num_workers: usize) {
        let num_workers = num_workers.max(1);
        info!("Recreating worker pool with {} threads", num_workers);
        self.workers = Arc::new(Workers::new(num_workers));
        self.binary_loader = BinaryLoader::new(Arc::clone(&self.workers));
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }

    /// Serialize the persisted part of the state.
    pub fn to_state_json(&mut self) -> serde_json::Result<String> {
        self.unsaved_changes = self.is_dirty();
        serde_json::to_string(self)
    }

    /// Restore state written by [`Self::to_state_json`].
    pub fn from_state_json(json: &str) -> serde_json::Result<Self> {
        let app: Self = serde_json::from_str(json)?;
        app.dirty.store(app.unsaved_changes, Ordering::Relaxed);
        Ok(app)
    }

    /// Store an edited root attribute coming back from the editor.
    pub fn fold_update(&mut self, root: usize, next: AttributeNode) {
        match self.document.replace(root, next) {
            Ok(()) => self.event_bus.emit(AttributeEditedEvent { root }),
            Err(e) => warn!("Dropping edit for root {}: {}", root, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AttrValue, DataType};

    #[test]
    fn test_fold_update_marks_dirty() {
        let mut app = AttrFormApp::default();
        assert!(!app.is_dirty());

        let edited = app.document.attributes[0].with_value(Some(AttrValue::Str("x".into())));
        app.fold_update(0, edited.clone());
        assert!(app.is_dirty());
        assert_eq!(app.document.attributes[0], edited);

        app.mark_clean();
        assert!(!app.is_dirty());
    }

    #[test]
    fn test_fold_update_out_of_range_ignored() {
        let mut app = AttrFormApp::default();
        let before = app.document.clone();
        app.fold_update(99, AttributeNode::new("ghost", DataType::Null, None));
        assert_eq!(app.document, before);
        assert!(!app.is_dirty());
    }

    #[test]
    fn test_persisted_state_roundtrip() {
        let mut app = AttrFormApp::default();
        app.settings.show_flat_sections = false;
        app.attributes_state.selected = Some(1);

        let json = app.to_state_json().unwrap();
        let restored = AttrFormApp::from_state_json(&json).unwrap();
        assert_eq!(restored.document, app.document);
        assert!(!restored.settings.show_flat_sections);
        assert_eq!(restored.attributes_state.selected, Some(1));
        assert!(!restored.is_dirty());

        // Runtime pieces are rebuilt and still wired
        restored.event_bus.emit(AttributeEditedEvent { root: 0 });
        assert!(restored.is_dirty());
    }

    #[test]
    fn test_unsaved_changes_survive_restart() {
        let mut app = AttrFormApp::default();
        let edited = app.document.attributes[0].with_value(Some(AttrValue::Str("x".into())));
        app.fold_update(0, edited);

        let json = app.to_state_json().unwrap();
        let mut restored = AttrFormApp::from_state_json(&json).unwrap();
        assert!(restored.is_dirty());

        // Cleared again once saved
        restored.mark_clean();
        let json = restored.to_state_json().unwrap();
        assert!(!AttrFormApp::from_state_json(&json).unwrap().is_dirty());
    }
}
