//! Event handling for AttrFormApp.
//!
//! Contains handlers for:
//! - Event bus events (handle_events)
//! - Finished binary reads (apply_binary_results)
//!
//! `handle_events` must run before `apply_binary_results` each frame, so that
//! removals from the previous frame rebase outstanding reads before they land.

use super::AttrFormApp;
use super::app_events::*;
use crate::core::event_bus::downcast_event;
use crate::entities::{AttrValue, NodePath};
use crate::widgets::ae::*;
use crate::widgets::file_dialogs;

use log::{debug, error, info, trace, warn};

impl AttrFormApp {
    /// Handle events from event bus.
    pub fn handle_events(&mut self) {
        // Dialog-driven actions run after the loop so they see a settled state
        let mut deferred_pick: Option<(usize, NodePath)> = None;
        let mut deferred_open: Option<Option<std::path::PathBuf>> = None;
        let mut deferred_save = false;
        let mut deferred_save_as = false;

        let events = self.event_bus.poll();
        for event in events {
            // === Attribute Editor ===
            if let Some(e) = downcast_event::<PickBinaryEvent>(&event) {
                deferred_pick = Some((e.root, e.path.clone()));
                continue;
            }
            if let Some(e) = downcast_event::<EntryRemovedEvent>(&event) {
                debug!("Entry {} removed under root {} {}", e.index, e.root, e.parent);
                self.binary_loader.on_entry_removed(e.root, &e.parent, e.index);
                continue;
            }
            if downcast_event::<AttributeEditedEvent>(&event).is_some() {
                // Dirty flag is handled by the subscriber
                continue;
            }
            if downcast_event::<AddAttributeEvent>(&event).is_some() {
                let name = self.document.unique_name("attribute");
                let index = self.document.add_attribute(name.clone());
                info!("Added attribute {:?} at {}", name, index);
                self.attributes_state.selected = Some(index);
                self.event_bus.emit(AttributeEditedEvent { root: index });
                continue;
            }
            if let Some(e) = downcast_event::<RemoveAttributeEvent>(&event) {
                self.remove_attribute(e.0);
                continue;
            }
            if let Some(e) = downcast_event::<SelectAttributeEvent>(&event) {
                trace!("Select attribute {}", e.0);
                self.attributes_state.selected = Some(e.0);
                continue;
            }
            if let Some(e) = downcast_event::<RenameAttributeEvent>(&event) {
                if let Some(node) = self.document.get(e.root) {
                    let renamed = node.with_name(Some(e.name.clone()));
                    self.fold_update(e.root, renamed);
                }
                continue;
            }

            // === Toolbar ===
            if downcast_event::<NewDocumentEvent>(&event).is_some() {
                self.new_document();
                continue;
            }
            if let Some(e) = downcast_event::<OpenDocumentEvent>(&event) {
                deferred_open = Some(e.0.clone());
                continue;
            }
            if downcast_event::<SaveDocumentEvent>(&event).is_some() {
                deferred_save = true;
                continue;
            }
            if downcast_event::<SaveDocumentAsEvent>(&event).is_some() {
                deferred_save_as = true;
                continue;
            }
            if downcast_event::<ShowSettingsEvent>(&event).is_some() {
                self.show_settings = true;
                continue;
            }

            debug!("Unhandled event: {}", (*event).type_name());
        }

        if let Some((root, path)) = deferred_pick {
            self.pick_binary(root, path);
        }
        match deferred_open {
            Some(Some(path)) => self.load_document(path),
            Some(None) => self.show_open_dialog(),
            None => {}
        }
        if deferred_save_as {
            self.show_save_as_dialog();
        } else if deferred_save {
            self.quick_save();
        }
    }

    /// Ask for a file and start reading it for the binary node at `path`.
    fn pick_binary(&mut self, root: usize, path: NodePath) {
        let Some(file) = file_dialogs::create_binary_dialog("Select File").pick_file() else {
            debug!("Binary pick cancelled for root {} {}", root, path);
            return;
        };
        info!("Reading {} for root {} {}", file.display(), root, path);
        self.status_bar
            .set_message(format!("Reading {}", file.display()));
        self.binary_loader.request(root, path, file);
    }

    /// Remove a root attribute. Root indices shift, so outstanding reads are dropped.
    fn remove_attribute(&mut self, index: usize) {
        let Some(removed) = self.document.remove_attribute(index) else {
            warn!("Remove: no attribute at {}", index);
            return;
        };
        info!("Removed attribute {:?}", removed.display_name());
        self.binary_loader.cancel_all();
        self.attributes_state.on_removed(index);
        self.status_bar
            .set_message(format!("Removed {}", removed.display_name()));
        self.event_bus.emit(AttributeEditedEvent { root: index });
    }

    /// Fold finished binary reads into the document.
    pub fn apply_binary_results(&mut self) {
        for loaded in self.binary_loader.poll() {
            let url = match loaded.result {
                Ok(url) => url,
                Err(e) => {
                    error!("{}", e);
                    self.error_msg = Some(e.to_string());
                    continue;
                }
            };

            let size = url.len();
            let applied = self
                .document
                .update_at(loaded.root, &loaded.path, |node| node.with_value(Some(AttrValue::Str(url))));
            match applied {
                Ok(()) => {
                    info!(
                        "Stored {} ({} chars) at root {} {}",
                        loaded.file.display(),
                        size,
                        loaded.root,
                        loaded.path
                    );
                    let name = loaded
                        .file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.status_bar.set_message(format!("Loaded {name}"));
                    self.event_bus.emit(AttributeEditedEvent { root: loaded.root });
                }
                Err(e) => {
                    // Node went away while the read was in flight
                    warn!("Discarding read of {}: {}", loaded.file.display(), e);
                }
            }
        }
    }
}
