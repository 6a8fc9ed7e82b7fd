use crate::entities::Document;
use eframe::egui;
use std::path::Path;

/// Status bar component
#[derive(Default)]
pub struct StatusBar {
    pub current_message: String,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.current_message = message.into();
    }

    /// Render status bar at bottom of screen
    pub fn render(
        &self,
        ctx: &egui::Context,
        document: &Document,
        file: Option<&Path>,
        dirty: bool,
        pending_reads: usize,
    ) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Filename
                let name = file
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .unwrap_or("Untitled");
                if dirty {
                    ui.monospace(format!("{name} *"));
                } else {
                    ui.monospace(name);
                }

                ui.separator();
                ui.monospace(format!("{} attrs", document.len()));

                if pending_reads > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.monospace(format!("reading {pending_reads} file(s)"));
                }

                // Status message (if any)
                if !self.current_message.is_empty() {
                    ui.separator();
                    ui.monospace(&self.current_message);
                }
            });
        });
    }
}
