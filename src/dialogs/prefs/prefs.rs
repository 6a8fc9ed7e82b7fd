use eframe::egui;
use egui_ltreeview::TreeView;

use crate::entities::TypeChangePolicy;

/// Settings categories
#[derive(Debug, Clone, Copy, PartialEq)]
enum SettingsCategory {
    Editor,
    UI,
    Performance,
}

impl SettingsCategory {
    fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::Editor => "Editor",
            SettingsCategory::UI => "UI",
            SettingsCategory::Performance => "Performance",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "Editor" => Some(SettingsCategory::Editor),
            "UI" => Some(SettingsCategory::UI),
            "Performance" => Some(SettingsCategory::Performance),
            _ => None,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AppSettings {
    // UI
    pub dark_mode: bool,
    pub font_size: f32,

    // Editor
    pub type_change_policy: TypeChangePolicy,
    pub show_flat_sections: bool, // Flat key/value and element rows next to nested ones

    // Workers (binary reads)
    pub workers_override: u32, // 0 = auto, N = override (applies on restart)

    // Internal
    pub selected_settings_category: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            font_size: 13.0,
            type_change_policy: TypeChangePolicy::default(),
            show_flat_sections: true,
            workers_override: 0,
            selected_settings_category: Some("Editor".to_string()),
        }
    }
}

impl AppSettings {
    /// Threads for the binary read pool.
    pub fn worker_threads(&self) -> usize {
        if self.workers_override > 0 {
            self.workers_override as usize
        } else {
            (num_cpus::get() / 2).clamp(1, 4)
        }
    }
}

/// Render Editor settings category
fn render_editor_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Type Changes");
    ui.add_space(8.0);

    ui.radio_value(
        &mut settings.type_change_policy,
        TypeChangePolicy::KeepValue,
        "Keep current value",
    );
    ui.radio_value(
        &mut settings.type_change_policy,
        TypeChangePolicy::ResetValue,
        "Reset value to the new type's default",
    );
    ui.label("A kept value that doesn't fit the new type is flagged with a Reset button.");
    ui.add_space(12.0);

    ui.heading("Sections");
    ui.add_space(8.0);
    ui.checkbox(
        &mut settings.show_flat_sections,
        "Show flat key/value and element rows for map and list",
    );
}

/// Render UI settings category
fn render_ui_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Appearance");
    ui.add_space(8.0);

    ui.label("Font Size:");
    ui.add(
        egui::Slider::new(&mut settings.font_size, 10.0..=18.0)
            .suffix(" px")
            .step_by(0.5),
    );
    ui.add_space(8.0);

    ui.checkbox(&mut settings.dark_mode, "Dark mode");
}

/// Render Performance settings category
fn render_performance_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Workers");
    ui.add_space(8.0);

    ui.label("Worker threads (0 = auto):");
    ui.add(
        egui::DragValue::new(&mut settings.workers_override)
            .speed(1.0)
            .range(0..=64),
    );
    ui.label("Takes effect on next launch. Defaults to half the CPU cores, up to 4.");
}

pub fn render_settings_window(ctx: &egui::Context, show_settings: &mut bool, settings: &mut AppSettings) {
    let mut selected = settings
        .selected_settings_category
        .as_ref()
        .and_then(|s| SettingsCategory::from_str(s))
        .unwrap_or(SettingsCategory::Editor);

    egui::Window::new("Settings")
        .id(egui::Id::new("settings_window"))
        .open(show_settings)
        .default_size([600.0, 400.0])
        .min_size([420.0, 300.0])
        .resizable(true)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Left panel: category tree
                ui.vertical(|ui| {
                    ui.set_width(160.0);
                    ui.add_space(4.0);

                    let tree_id = ui.make_persistent_id("settings_tree_view");
                    let (_response, actions) = TreeView::new(tree_id).show(ui, |builder| {
                        builder.leaf(0, SettingsCategory::Editor.as_str());
                        builder.leaf(1, SettingsCategory::UI.as_str());
                        builder.leaf(2, SettingsCategory::Performance.as_str());
                    });

                    for action in actions {
                        if let egui_ltreeview::Action::SetSelected(node_ids) = action
                            && let Some(&node_id) = node_ids.first()
                        {
                            selected = match node_id {
                                0 => SettingsCategory::Editor,
                                1 => SettingsCategory::UI,
                                2 => SettingsCategory::Performance,
                                _ => selected,
                            };
                        }
                    }
                });

                ui.separator();

                ui.vertical(|ui| {
                    ui.add_space(8.0);
                    match selected {
                        SettingsCategory::Editor => render_editor_settings(ui, settings),
                        SettingsCategory::UI => render_ui_settings(ui, settings),
                        SettingsCategory::Performance => render_performance_settings(ui, settings),
                    }
                });
            });
        });

    settings.selected_settings_category = Some(selected.as_str().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: AppSettings = serde_json::from_str(r#"{"font_size": 15.0}"#).unwrap();
        assert_eq!(settings.font_size, 15.0);
        assert!(settings.show_flat_sections);
        assert_eq!(settings.type_change_policy, TypeChangePolicy::KeepValue);
    }

    #[test]
    fn test_worker_threads() {
        let mut settings = AppSettings::default();
        let auto = settings.worker_threads();
        assert!((1..=4).contains(&auto));

        settings.workers_override = 7;
        assert_eq!(settings.worker_threads(), 7);
    }

    #[test]
    fn test_category_names_roundtrip() {
        for category in [
            SettingsCategory::Editor,
            SettingsCategory::UI,
            SettingsCategory::Performance,
        ] {
            assert_eq!(SettingsCategory::from_str(category.as_str()), Some(category));
        }
        assert_eq!(SettingsCategory::from_str("Cache"), None);
    }
}
