//! Root attribute list - the document's top-level attributes as a table.
//!
//! One row per root attribute: selectable name, type and shape status, and a
//! remove button. Everything the user does here is emitted as an event; the
//! app owns the document and applies them.

use eframe::egui::{Pos2, Rect, Sense, Stroke, TextStyle, Ui};
use egui_extras::{Column, TableBuilder};

use super::ae_events::{AddAttributeEvent, RemoveAttributeEvent, SelectAttributeEvent};
use crate::core::event_bus::EventEmitter;
use crate::entities::Document;

/// Persistent UI state for the Attributes panel.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AttributesState {
    pub name_column_width: f32,
    /// Root attribute shown in the editor.
    pub selected: Option<usize>,
}

impl Default for AttributesState {
    fn default() -> Self {
        Self {
            name_column_width: 140.0,
            selected: None,
        }
    }
}

impl AttributesState {
    /// Selected index if it still points into `document`.
    pub fn selected_in(&self, document: &Document) -> Option<usize> {
        self.selected.filter(|&index| index < document.len())
    }

    /// Fix the selection after root `removed` was taken out.
    pub fn on_removed(&mut self, removed: usize) {
        self.selected = match self.selected {
            Some(sel) if sel == removed => None,
            Some(sel) if sel > removed => Some(sel - 1),
            other => other,
        };
    }
}

pub fn render_attribute_list(
    ui: &mut Ui,
    document: &Document,
    state: &mut AttributesState,
    pending_roots: &[usize],
    emitter: &EventEmitter,
) {
    ui.label(format!("{} attribute(s)", document.len()));

    let row_height = ui
        .text_style_height(&TextStyle::Body)
        .max(ui.spacing().interact_size.y);

    let available_width = ui.available_width();
    let min_label = 80.0;
    let max_label = (available_width - 120.0).max(min_label);
    state.name_column_width = state.name_column_width.clamp(min_label, max_label);

    let table_top = ui.cursor().min;
    let selected = state.selected_in(document);

    TableBuilder::new(ui)
        .id_salt("root_attributes_table")
        .striped(true)
        .column(
            Column::initial(state.name_column_width)
                .range(min_label..=max_label)
                .resizable(false),
        )
        .column(Column::remainder())
        .column(Column::exact(28.0))
        .header(row_height, |mut header| {
            header.col(|ui| {
                ui.strong("Attribute");
            });
            header.col(|ui| {
                ui.strong("Type");
            });
            header.col(|_| {});
        })
        .body(|mut body| {
            for (index, node) in document.iter().enumerate() {
                body.row(row_height, |mut row| {
                    row.col(|ui| {
                        if ui
                            .selectable_label(selected == Some(index), node.display_name())
                            .clicked()
                        {
                            emitter.emit(SelectAttributeEvent(index));
                        }
                    });
                    row.col(|ui| {
                        ui.label(node.data_type.as_str());
                        if pending_roots.contains(&index) {
                            ui.spinner();
                        } else if let Err(e) = node.check_shape() {
                            let warn_color = ui.visuals().warn_fg_color;
                            ui.colored_label(warn_color, "⚠")
                                .on_hover_text(e.to_string());
                        }
                    });
                    row.col(|ui| {
                        if ui.small_button("🗑").on_hover_text("Remove attribute").clicked() {
                            emitter.emit(RemoveAttributeEvent(index));
                        }
                    });
                });
            }
        });

    // Splitter for the name column, spanning header + body
    let table_bottom = ui.cursor().min;
    let x = table_top.x + state.name_column_width;
    let splitter_rect = Rect::from_min_max(
        Pos2::new(x - 4.0, table_top.y),
        Pos2::new(x + 4.0, table_bottom.y),
    );
    let splitter_id = ui.make_persistent_id("root_attributes_splitter_drag");
    let response = ui.interact(splitter_rect, splitter_id, Sense::click_and_drag());
    if response.dragged() {
        state.name_column_width =
            (state.name_column_width + response.drag_delta().x).clamp(min_label, max_label);
    }
    let stroke = if response.hovered() || response.dragged() {
        Stroke::new(2.0, ui.visuals().strong_text_color())
    } else {
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
    };
    ui.painter().line_segment(
        [Pos2::new(x, table_top.y), Pos2::new(x, table_bottom.y)],
        stroke,
    );

    ui.separator();
    if ui.button("Add Attribute").clicked() {
        emitter.emit(AddAttributeEvent);
    }
}
