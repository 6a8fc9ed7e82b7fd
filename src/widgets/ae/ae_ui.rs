//! Attribute Editor widget - recursive UI rendering
//!
//! Renders one [`AttributeNode`] and recursively instantiates itself for nested
//! map entries and nested list elements.
//!
//! # Update contract
//! The editor never mutates the node it is given. Each frame, every level
//! returns `Option<AttributeNode>`: `Some(next)` when the user edited something
//! at or below it. A parent folds a child's `next` into its own next node via
//! `edit_nested_map_value` / `edit_nested_list_value`, so only the root hands a
//! complete replacement to the caller's `on_update`.
//!
//! # Sections
//! `map` nodes show the flat key/value section and the nested-map section
//! together, over the same entry sequence; `list` nodes likewise show flat
//! elements and nested-list elements. The flat sections can be hidden via
//! [`EditorOptions::show_flat_sections`].
//!
//! # Binary
//! File selection is asynchronous: the editor emits [`PickBinaryEvent`] and the
//! app writes the data URL back later through [`AttributeNode::update_at`].
//!
//! # Usage
//! ```ignore
//! let opts = EditorOptions { root: index, policy, show_flat_sections: true, emitter: &emitter, pending: &pending };
//! render(ui, &document.attributes[index], &opts, |next| updated = Some(next));
//! if let Some(next) = updated {
//!     document.replace(index, next)?;
//! }
//! ```

use eframe::egui::{self, ComboBox, TextEdit, Ui};
use log::{debug, trace, warn};

use super::ae_events::{EntryRemovedEvent, PickBinaryEvent};
use crate::core::event_bus::EventEmitter;
use crate::entities::{
    AttrValue, AttributeNode, DataType, DataUrl, EditError, MapField, NodePath,
    TypeChangePolicy, Via,
};

const KEY_WIDTH: f32 = 120.0;

/// Per-render settings shared by every level of the recursion.
pub struct EditorOptions<'a> {
    /// Index of the root attribute in the document (routes async results).
    pub root: usize,
    pub policy: TypeChangePolicy,
    pub show_flat_sections: bool,
    pub emitter: &'a EventEmitter,
    /// Nodes with a file read in flight.
    pub pending: &'a [NodePath],
}

/// Render the editor for `attribute`. Calls `on_update` with the replacement
/// node when the user changed anything this frame.
pub fn render(
    ui: &mut Ui,
    attribute: &AttributeNode,
    opts: &EditorOptions<'_>,
    mut on_update: impl FnMut(AttributeNode),
) {
    if let Some(next) = show_node(ui, attribute, &NodePath::root(), opts) {
        trace!("Root {} edited -> {}", opts.root, next.summary());
        on_update(next);
    }
}

fn show_node(
    ui: &mut Ui,
    node: &AttributeNode,
    path: &NodePath,
    opts: &EditorOptions<'_>,
) -> Option<AttributeNode> {
    ui.push_id(path, |ui| {
        egui::Frame::group(ui.style())
            .show(ui, |ui| node_body(ui, node, path, opts))
            .inner
    })
    .inner
}

fn node_body(
    ui: &mut Ui,
    node: &AttributeNode,
    path: &NodePath,
    opts: &EditorOptions<'_>,
) -> Option<AttributeNode> {
    let mut next = type_header(ui, node, opts);

    if let Err(e) = node.check_shape() {
        let warn_color = ui.visuals().warn_fg_color;
        ui.horizontal(|ui| {
            ui.colored_label(warn_color, format!("⚠ {e}"));
            if ui
                .small_button("Reset value")
                .on_hover_text("Replace the payload with the default for this type")
                .clicked()
            {
                next = next.take().or_else(|| Some(node.with_default_value()));
            }
        });
    }

    let mut edited = None;
    for section in sections(node.data_type, opts.show_flat_sections) {
        // Every section renders; the first edit of the frame wins
        let result = match section {
            Section::Scalar => scalar_editor(ui, node),
            Section::Binary => binary_editor(ui, node, path, opts),
            Section::FlatMap => flat_map_section(ui, node),
            Section::NestedMap => nested_map_section(ui, node, path, opts),
            Section::FlatList => flat_list_section(ui, node),
            Section::NestedList => nested_list_section(ui, node, path, opts),
        };
        edited = edited.or(result);
    }

    next.or(edited)
}

/// Editor section shown for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Scalar,
    Binary,
    FlatMap,
    NestedMap,
    FlatList,
    NestedList,
}

/// Sections rendered for `data_type`, top to bottom. `map` and `list` show
/// their flat and nested sections together over the same entries.
fn sections(data_type: DataType, show_flat: bool) -> Vec<Section> {
    match data_type {
        DataType::String | DataType::Number | DataType::Boolean | DataType::Null => {
            vec![Section::Scalar]
        }
        DataType::Binary => vec![Section::Binary],
        DataType::Map if show_flat => vec![Section::FlatMap, Section::NestedMap],
        DataType::Map => vec![Section::NestedMap],
        DataType::List if show_flat => vec![Section::FlatList, Section::NestedList],
        DataType::List => vec![Section::NestedList],
    }
}

/// Label + type selector. Any type can switch to any other.
fn type_header(ui: &mut Ui, node: &AttributeNode, opts: &EditorOptions<'_>) -> Option<AttributeNode> {
    let mut next = None;
    ui.horizontal(|ui| {
        ui.strong(node.display_name());
        let mut selected = node.data_type;
        ComboBox::from_id_salt("data_type")
            .selected_text(selected.as_str())
            .show_ui(ui, |ui| {
                for data_type in DataType::ALL {
                    ui.selectable_value(&mut selected, data_type, data_type.as_str());
                }
            });
        if selected != node.data_type {
            debug!(
                "Type of {:?} changed {} -> {} ({:?})",
                node.display_name(),
                node.data_type,
                selected,
                opts.policy
            );
            next = Some(node.with_data_type_policy(selected, opts.policy));
        }
    });
    next
}

fn scalar_editor(ui: &mut Ui, node: &AttributeNode) -> Option<AttributeNode> {
    match node.data_type {
        DataType::String => {
            let mut text = node
                .value
                .as_ref()
                .and_then(AttrValue::as_str)
                .unwrap_or_default()
                .to_string();
            ui.add(TextEdit::singleline(&mut text).hint_text("Value"))
                .changed()
                .then(|| node.with_value(Some(AttrValue::Str(text))))
        }
        DataType::Number => {
            let mut number = match node.value {
                Some(AttrValue::Number(n)) => n,
                _ => 0.0,
            };
            ui.add(egui::DragValue::new(&mut number).speed(0.1))
                .changed()
                .then(|| node.with_value(Some(AttrValue::Number(number))))
        }
        DataType::Boolean => {
            let mut flag = matches!(node.value, Some(AttrValue::Bool(true)));
            ui.checkbox(&mut flag, "")
                .changed()
                .then(|| node.with_value(Some(AttrValue::Bool(flag))))
        }
        DataType::Null => {
            ui.weak("null");
            None
        }
        DataType::Binary | DataType::Map | DataType::List => None,
    }
}

/// File picker row. The pick itself completes in a later frame.
fn binary_editor(
    ui: &mut Ui,
    node: &AttributeNode,
    path: &NodePath,
    opts: &EditorOptions<'_>,
) -> Option<AttributeNode> {
    ui.horizontal(|ui| {
        if ui.button("Choose file…").clicked() {
            debug!("Binary pick requested: root {} {}", opts.root, path);
            opts.emitter.emit(PickBinaryEvent {
                root: opts.root,
                path: path.clone(),
            });
        }
        if opts.pending.contains(path) {
            ui.spinner();
            ui.weak("reading…");
        }
        match node
            .value
            .as_ref()
            .and_then(AttrValue::as_str)
            .and_then(DataUrl::parse)
        {
            Some(url) => {
                ui.label(format!("{} • {} bytes", url.mime(), url.decoded_len()));
                ui.small_button("Clear").clicked().then(|| node.with_value(None))
            }
            None => {
                ui.weak("(no file)");
                None
            }
        }
    })
    .inner
}

fn flat_map_section(ui: &mut Ui, node: &AttributeNode) -> Option<AttributeNode> {
    let mut next = None;
    ui.push_id("flat_map", |ui| {
        for (index, entry) in node.entries().iter().enumerate() {
            ui.horizontal(|ui| {
                let mut key = entry.label().unwrap_or_default().to_string();
                if ui
                    .add(
                        TextEdit::singleline(&mut key)
                            .id_salt(("key", index))
                            .hint_text("Key")
                            .desired_width(KEY_WIDTH),
                    )
                    .changed()
                {
                    next = applied(node.edit_map_entry(index, MapField::Key, &key));
                }
                match entry.text() {
                    Some(text) => {
                        let mut value = text.to_string();
                        if ui
                            .add(
                                TextEdit::singleline(&mut value)
                                    .id_salt(("value", index))
                                    .hint_text("Value"),
                            )
                            .changed()
                        {
                            next = applied(node.edit_map_entry(index, MapField::Value, &value));
                        }
                    }
                    None => {
                        ui.weak(entry.summary());
                    }
                }
            });
        }
        if ui.button("Add Key-Value Pair").clicked() {
            next = Some(node.append_map_entry());
        }
    });
    next
}

fn flat_list_section(ui: &mut Ui, node: &AttributeNode) -> Option<AttributeNode> {
    let mut next = None;
    ui.push_id("flat_list", |ui| {
        for (index, entry) in node.entries().iter().enumerate() {
            match entry.text() {
                Some(text) if entry.label().is_none() => {
                    let mut element = text.to_string();
                    if ui
                        .add(
                            TextEdit::singleline(&mut element)
                                .id_salt(("element", index))
                                .hint_text("Element"),
                        )
                        .changed()
                    {
                        next = applied(node.edit_list_element(index, &element));
                    }
                }
                _ => {
                    ui.weak(format!("[{index}] {}", entry.summary()));
                }
            }
        }
        if ui.button("Add Element").clicked() {
            next = Some(node.append_list_element());
        }
    });
    next
}

fn nested_map_section(
    ui: &mut Ui,
    node: &AttributeNode,
    path: &NodePath,
    opts: &EditorOptions<'_>,
) -> Option<AttributeNode> {
    let mut next = None;
    ui.push_id("nested_map", |ui| {
        for (index, entry) in node.entries().iter().enumerate() {
            ui.horizontal(|ui| {
                let mut key = entry.label().unwrap_or_default().to_string();
                if ui
                    .add(
                        TextEdit::singleline(&mut key)
                            .id_salt(("nested_key", index))
                            .hint_text("Key")
                            .desired_width(KEY_WIDTH),
                    )
                    .changed()
                {
                    next = applied(node.edit_nested_map_key(index, &key));
                }
                if remove_button(ui) {
                    next = removed(node, index, path, opts);
                }
            });
            let child = entry.as_child_node();
            ui.indent(("nested_map_child", index), |ui| {
                if let Some(updated) = show_node(ui, &child, &path.child(index, Via::Map), opts) {
                    next = applied(node.edit_nested_map_value(index, updated));
                }
            });
        }
        if ui.button("Add Nested Map").clicked() {
            next = Some(node.append_nested_map_entry());
        }
    });
    next
}

fn nested_list_section(
    ui: &mut Ui,
    node: &AttributeNode,
    path: &NodePath,
    opts: &EditorOptions<'_>,
) -> Option<AttributeNode> {
    let mut next = None;
    ui.push_id("nested_list", |ui| {
        for (index, entry) in node.entries().iter().enumerate() {
            ui.horizontal(|ui| {
                let mut name = entry.label().unwrap_or_default().to_string();
                if ui
                    .add(
                        TextEdit::singleline(&mut name)
                            .id_salt(("nested_name", index))
                            .hint_text("Name")
                            .desired_width(KEY_WIDTH),
                    )
                    .changed()
                {
                    next = applied(node.edit_nested_list_name(index, &name));
                }
                if remove_button(ui) {
                    next = removed(node, index, path, opts);
                }
            });
            let child = entry.as_child_node();
            ui.indent(("nested_list_child", index), |ui| {
                if let Some(updated) = show_node(ui, &child, &path.child(index, Via::List), opts) {
                    next = applied(node.edit_nested_list_value(index, updated));
                }
            });
        }
        if ui.button("Add Nested List").clicked() {
            next = Some(node.append_nested_list_element());
        }
    });
    next
}

fn remove_button(ui: &mut Ui) -> bool {
    ui.small_button("🗑").on_hover_text("Remove entry").clicked()
}

/// Remove entry `index` and tell the app, so reads under later siblings follow them.
fn removed(
    node: &AttributeNode,
    index: usize,
    path: &NodePath,
    opts: &EditorOptions<'_>,
) -> Option<AttributeNode> {
    let next = applied(node.remove_entry(index))?;
    opts.emitter.emit(EntryRemovedEvent {
        root: opts.root,
        parent: path.clone(),
        index,
    });
    Some(next)
}

fn applied(result: Result<AttributeNode, EditError>) -> Option<AttributeNode> {
    result.map_err(|e| warn!("Edit rejected: {e}")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_and_list_show_both_sections() {
        assert_eq!(
            sections(DataType::Map, true),
            vec![Section::FlatMap, Section::NestedMap]
        );
        assert_eq!(
            sections(DataType::List, true),
            vec![Section::FlatList, Section::NestedList]
        );
    }

    #[test]
    fn test_hidden_flat_sections() {
        assert_eq!(sections(DataType::Map, false), vec![Section::NestedMap]);
        assert_eq!(sections(DataType::List, false), vec![Section::NestedList]);
        // Scalars and binary ignore the setting
        assert_eq!(sections(DataType::Binary, false), vec![Section::Binary]);
        assert_eq!(sections(DataType::Null, true), vec![Section::Scalar]);
    }

    #[test]
    fn test_every_type_has_a_section() {
        for data_type in DataType::ALL {
            assert!(!sections(data_type, false).is_empty(), "{data_type}");
        }
    }
}
