//! eframe::App implementation for AttrFormApp.
//!
//! Frame order: handle events queued last frame, apply finished binary reads,
//! then draw toolbar, status bar, attribute list and the editor.

use super::AttrFormApp;
use super::app_events::*;
use crate::dialogs::prefs::render_settings_window;
use crate::widgets::ae::{self, EditorOptions, RenameAttributeEvent};

use eframe::egui;
use log::trace;
use std::time::Duration;

impl eframe::App for AttrFormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme based on settings
        if self.settings.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // Apply font size from settings
        let mut style = (*ctx.style()).clone();
        for (_, font_id) in style.text_styles.iter_mut() {
            font_id.size = self.settings.font_size;
        }
        ctx.set_style(style);

        // Removals rebase pending reads before any of them land
        self.handle_events();
        self.apply_binary_results();

        self.update_title(ctx);
        self.render_toolbar(ctx);
        self.render_error_panel(ctx);
        self.status_bar.render(
            ctx,
            &self.document,
            self.last_save_path.as_deref(),
            self.is_dirty(),
            self.binary_loader.pending(),
        );
        self.render_attribute_panel(ctx);
        self.render_editor(ctx);

        render_settings_window(ctx, &mut self.show_settings, &mut self.settings);

        // Reads finish off-thread; keep polling until they land
        if self.binary_loader.pending() > 0 {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
        // Events emitted this frame are handled at the start of the next one
        if self.event_bus.queue_len() > 0 {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = self.to_state_json() {
            storage.set_string(eframe::APP_KEY, json);
            trace!(
                "App state saved: {} attributes, selected={:?}",
                self.document.len(),
                self.attributes_state.selected
            );
        }
    }
}

impl AttrFormApp {
    fn update_title(&mut self, ctx: &egui::Context) {
        let name = self
            .last_save_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        let dirty = if self.is_dirty() { " *" } else { "" };
        let title = format!("AttrForm v{} • {}{}", env!("CARGO_PKG_VERSION"), name, dirty);
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }

    fn render_toolbar(&self, ctx: &egui::Context) {
        let emitter = self.event_bus.emitter();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("New").clicked() {
                    emitter.emit(NewDocumentEvent);
                }
                if ui.button("Open…").clicked() {
                    emitter.emit(OpenDocumentEvent(None));
                }
                if ui.button("Save").clicked() {
                    emitter.emit(SaveDocumentEvent);
                }
                if ui.button("Save As…").clicked() {
                    emitter.emit(SaveDocumentAsEvent);
                }
                ui.separator();
                if ui.button("Settings").clicked() {
                    emitter.emit(ShowSettingsEvent);
                }
            });
        });
    }

    fn render_error_panel(&mut self, ctx: &egui::Context) {
        let Some(msg) = self.error_msg.clone() else {
            return;
        };
        egui::TopBottomPanel::top("error_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(230, 80, 80), &msg);
                if ui.small_button("✖").on_hover_text("Dismiss").clicked() {
                    self.error_msg = None;
                }
            });
        });
    }

    fn render_attribute_panel(&mut self, ctx: &egui::Context) {
        let emitter = self.event_bus.emitter();
        let pending_roots = self.binary_loader.pending_roots();
        egui::SidePanel::left("attributes_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                ae::render_attribute_list(
                    ui,
                    &self.document,
                    &mut self.attributes_state,
                    &pending_roots,
                    &emitter,
                );
            });
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let emitter = self.event_bus.emitter();
        let mut updated = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(index) = self.attributes_state.selected_in(&self.document) else {
                ui.centered_and_justified(|ui| {
                    ui.weak("Select an attribute or add one");
                });
                return;
            };
            let Some(node) = self.document.get(index) else {
                return;
            };

            ui.horizontal(|ui| {
                ui.label("Name:");
                let mut name = node.name.clone().unwrap_or_default();
                if ui.text_edit_singleline(&mut name).changed() {
                    emitter.emit(RenameAttributeEvent { root: index, name });
                }
            });
            ui.separator();

            let pending = self.binary_loader.pending_paths(index);
            let opts = EditorOptions {
                root: index,
                policy: self.settings.type_change_policy,
                show_flat_sections: self.settings.show_flat_sections,
                emitter: &emitter,
                pending: &pending,
            };
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ae::render(ui, node, &opts, |next| updated = Some((index, next)));
                });
        });

        if let Some((index, next)) = updated {
            self.fold_update(index, next);
        }
    }
}
