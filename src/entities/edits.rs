//! Edit operations on [`AttributeNode`].
//!
//! Every operation takes `&self` and returns a new node; the receiver is never
//! touched. Untouched entries are cloned as-is, so callers holding the old
//! node keep a consistent snapshot.
//!
//! Appends default a missing (or non-sequence) payload to the empty sequence.
//! Index-based edits require an existing sequence and an in-bounds index.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attr_node::{AttrValue, AttributeNode, DataType, Entry};

/// What happens to the payload when the type changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeChangePolicy {
    /// Payload is carried over verbatim, even if it no longer fits.
    #[default]
    KeepValue,
    /// Payload is replaced with the new type's default.
    ResetValue,
}

/// Field of a flat map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapField {
    Key,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("payload is not a sequence")]
    NotASequence,
    #[error("path does not resolve at depth {depth}")]
    PathNotFound { depth: usize },
}

impl AttributeNode {
    // ========== Whole-node edits ==========

    /// Change type, keeping the payload verbatim.
    pub fn with_data_type(&self, data_type: DataType) -> Self {
        Self {
            data_type,
            ..self.clone()
        }
    }

    /// Change type according to `policy`.
    pub fn with_data_type_policy(&self, data_type: DataType, policy: TypeChangePolicy) -> Self {
        match policy {
            TypeChangePolicy::KeepValue => self.with_data_type(data_type),
            TypeChangePolicy::ResetValue => Self {
                name: self.name.clone(),
                data_type,
                value: data_type.default_value(),
            },
        }
    }

    pub fn with_value(&self, value: Option<AttrValue>) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub fn with_name(&self, name: Option<String>) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    /// Replace the payload with the current type's default.
    pub fn with_default_value(&self) -> Self {
        self.with_value(self.data_type.default_value())
    }

    // ========== Flat map ==========

    /// Append `{key: "", value: ""}`.
    pub fn append_map_entry(&self) -> Self {
        self.appended(Entry::Pair {
            key: String::new(),
            value: String::new(),
        })
    }

    /// Overwrite one field of entry `index`. Writing `Value` turns the entry
    /// into a flat pair; writing `Key` keeps a nested subtree in place.
    pub fn edit_map_entry(&self, index: usize, field: MapField, text: &str) -> Result<Self, EditError> {
        match field {
            MapField::Key => self.replace_entry(index, |entry| keyed(entry, text.to_string())),
            MapField::Value => self.replace_entry(index, |entry| Entry::Pair {
                key: entry.label().unwrap_or_default().to_string(),
                value: text.to_string(),
            }),
        }
    }

    // ========== Flat list ==========

    /// Append an empty string element.
    pub fn append_list_element(&self) -> Self {
        self.appended(Entry::Item(String::new()))
    }

    /// Replace element `index` with a plain string.
    pub fn edit_list_element(&self, index: usize, text: &str) -> Result<Self, EditError> {
        self.replace_entry(index, |_| Entry::Item(text.to_string()))
    }

    // ========== Nested map ==========

    /// Append `{key: "", value: {}}` with an empty anonymous subtree.
    pub fn append_nested_map_entry(&self) -> Self {
        self.appended(Entry::Nested {
            key: String::new(),
            value: Box::new(AttributeNode::default()),
        })
    }

    pub fn edit_nested_map_key(&self, index: usize, key: &str) -> Result<Self, EditError> {
        self.replace_entry(index, |entry| keyed(entry, key.to_string()))
    }

    /// Replace the subtree of entry `index` wholesale, keeping its key.
    pub fn edit_nested_map_value(&self, index: usize, child: AttributeNode) -> Result<Self, EditError> {
        self.replace_entry(index, |entry| Entry::Nested {
            key: entry.label().unwrap_or_default().to_string(),
            value: Box::new(child),
        })
    }

    // ========== Nested list ==========

    /// Append a named element whose subtree is an empty `list`.
    pub fn append_nested_list_element(&self) -> Self {
        self.appended(Entry::NestedList {
            name: String::new(),
            value: Box::new(AttributeNode {
                name: None,
                data_type: DataType::List,
                value: Some(AttrValue::Seq(Vec::new())),
            }),
        })
    }

    pub fn edit_nested_list_name(&self, index: usize, name: &str) -> Result<Self, EditError> {
        self.replace_entry(index, |entry| Entry::NestedList {
            name: name.to_string(),
            value: Box::new(entry.as_child_node().into_owned()),
        })
    }

    /// Replace the subtree of element `index` wholesale, keeping its name.
    /// Unlabeled elements stay unlabeled.
    pub fn edit_nested_list_value(&self, index: usize, child: AttributeNode) -> Result<Self, EditError> {
        self.replace_entry(index, |entry| match entry {
            Entry::Unlabeled { .. } => Entry::Unlabeled {
                value: Box::new(child),
            },
            _ => Entry::NestedList {
                name: entry.label().unwrap_or_default().to_string(),
                value: Box::new(child),
            },
        })
    }

    // ========== Removal ==========

    pub fn remove_entry(&self, index: usize) -> Result<Self, EditError> {
        let entries = self.sequence()?;
        if index >= entries.len() {
            return Err(EditError::IndexOutOfBounds {
                index,
                len: entries.len(),
            });
        }
        let next: Vec<Entry> = entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| e.clone())
            .collect();
        Ok(self.with_value(Some(AttrValue::Seq(next))))
    }

    // ========== Helpers ==========

    fn sequence(&self) -> Result<&[Entry], EditError> {
        self.value
            .as_ref()
            .and_then(AttrValue::as_seq)
            .ok_or(EditError::NotASequence)
    }

    fn appended(&self, entry: Entry) -> Self {
        let mut entries = match &self.value {
            Some(AttrValue::Seq(entries)) => entries.clone(),
            Some(other) => {
                debug!("Append on {} payload, starting a new sequence", other.kind());
                Vec::new()
            }
            None => Vec::new(),
        };
        entries.push(entry);
        self.with_value(Some(AttrValue::Seq(entries)))
    }

    fn replace_entry(
        &self,
        index: usize,
        f: impl FnOnce(&Entry) -> Entry,
    ) -> Result<Self, EditError> {
        let entries = self.sequence()?;
        let Some(target) = entries.get(index) else {
            return Err(EditError::IndexOutOfBounds {
                index,
                len: entries.len(),
            });
        };
        let replacement = f(target);
        let mut next = entries.to_vec();
        next[index] = replacement;
        Ok(self.with_value(Some(AttrValue::Seq(next))))
    }
}

/// Entry with its key overwritten. Subtrees survive; plain items become pairs.
fn keyed(entry: &Entry, key: String) -> Entry {
    match entry {
        Entry::Item(value) | Entry::Pair { value, .. } => Entry::Pair {
            key,
            value: value.clone(),
        },
        Entry::Nested { value, .. }
        | Entry::NestedList { value, .. }
        | Entry::Unlabeled { value } => Entry::Nested {
            key,
            value: value.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> Entry {
        Entry::Pair {
            key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_append_grows_by_one_and_keeps_prefix() {
        let mut node = AttributeNode::new("m", DataType::Map, Some(AttrValue::Seq(vec![])));
        let mut history: Vec<Vec<Entry>> = vec![node.entries().to_vec()];

        for step in 0..6 {
            node = match step % 3 {
                0 => node.append_map_entry(),
                1 => node.append_nested_map_entry(),
                _ => node.append_list_element(),
            };
            let prev = history.last().unwrap();
            assert_eq!(node.entries().len(), prev.len() + 1);
            assert_eq!(&node.entries()[..prev.len()], prev.as_slice());
            history.push(node.entries().to_vec());
        }
    }

    #[test]
    fn test_edit_map_entry_touches_only_target() {
        let original = AttributeNode::new(
            "m",
            DataType::Map,
            Some(AttrValue::Seq(vec![pair("a", "1"), pair("b", "2"), pair("c", "3")])),
        );

        let edited = original.edit_map_entry(1, MapField::Value, "two").unwrap();
        assert_eq!(edited.entries(), &[pair("a", "1"), pair("b", "two"), pair("c", "3")]);

        let edited = edited.edit_map_entry(2, MapField::Key, "z").unwrap();
        assert_eq!(edited.entries(), &[pair("a", "1"), pair("b", "two"), pair("z", "3")]);

        // Input untouched
        assert_eq!(original.entries(), &[pair("a", "1"), pair("b", "2"), pair("c", "3")]);
    }

    #[test]
    fn test_edit_out_of_bounds() {
        let node = AttributeNode::new("m", DataType::Map, None).append_map_entry();
        assert_eq!(
            node.edit_map_entry(3, MapField::Key, "k"),
            Err(EditError::IndexOutOfBounds { index: 3, len: 1 })
        );
        assert_eq!(
            AttributeNode::named("x").edit_list_element(0, "a"),
            Err(EditError::NotASequence)
        );
    }

    #[test]
    fn test_type_switch_preserves_payload() {
        let list = AttributeNode::new("l", DataType::List, None)
            .append_list_element()
            .edit_list_element(0, "keep me")
            .unwrap();
        let before = list.value.clone();

        let as_string = list.with_data_type(DataType::String);
        assert_eq!(as_string.value, before);
        let back = as_string.with_data_type(DataType::List);
        assert_eq!(back.value, before);
        assert_eq!(back, list);
    }

    #[test]
    fn test_type_switch_reset_policy() {
        let list = AttributeNode::new("l", DataType::List, None).append_list_element();
        let reset = list.with_data_type_policy(DataType::Number, TypeChangePolicy::ResetValue);
        assert_eq!(reset.data_type, DataType::Number);
        assert_eq!(reset.value, Some(AttrValue::Number(0.0)));
        assert_eq!(reset.name.as_deref(), Some("l"));

        let kept = list.with_data_type_policy(DataType::Number, TypeChangePolicy::KeepValue);
        assert_eq!(kept.value, list.value);
        assert!(kept.check_shape().is_err());
        assert!(kept.with_default_value().check_shape().is_ok());
    }

    #[test]
    fn test_list_scenario_from_untyped_node() {
        let node = AttributeNode::named("x");
        let node = node.append_list_element().append_list_element();
        assert_eq!(
            node.value,
            Some(AttrValue::Seq(vec![Entry::Item("".into()), Entry::Item("".into())]))
        );
        let node = node.edit_list_element(1, "hello").unwrap();
        assert_eq!(
            node.value,
            Some(AttrValue::Seq(vec![Entry::Item("".into()), Entry::Item("hello".into())]))
        );
        assert_eq!(node.data_type, DataType::String);
    }

    #[test]
    fn test_map_scenario() {
        let node = AttributeNode::new("m", DataType::Map, Some(AttrValue::Seq(vec![])));
        let node = node
            .append_map_entry()
            .edit_map_entry(0, MapField::Key, "k1")
            .and_then(|n| n.edit_map_entry(0, MapField::Value, "v1"))
            .unwrap();
        assert_eq!(node.value, Some(AttrValue::Seq(vec![pair("k1", "v1")])));
    }

    #[test]
    fn test_nested_map_edits() {
        let node = AttributeNode::new("m", DataType::Map, None).append_nested_map_entry();
        assert_eq!(
            node.entries(),
            &[Entry::Nested {
                key: String::new(),
                value: Box::new(AttributeNode::default())
            }]
        );

        let child = AttributeNode::default()
            .with_data_type(DataType::Number)
            .with_value(Some(AttrValue::Number(7.0)));
        let node = node
            .edit_nested_map_key(0, "depth")
            .and_then(|n| n.edit_nested_map_value(0, child.clone()))
            .unwrap();
        assert_eq!(
            node.entries(),
            &[Entry::Nested {
                key: "depth".into(),
                value: Box::new(child)
            }]
        );
    }

    #[test]
    fn test_nested_value_over_flat_pair_keeps_key() {
        let node = AttributeNode::new("m", DataType::Map, Some(AttrValue::Seq(vec![pair("k", "v")])));
        let child = AttributeNode::default().with_value(Some(AttrValue::Str("v2".into())));
        let node = node.edit_nested_map_value(0, child.clone()).unwrap();
        assert_eq!(
            node.entries(),
            &[Entry::Nested {
                key: "k".into(),
                value: Box::new(child)
            }]
        );
    }

    #[test]
    fn test_nested_list_edits() {
        let node = AttributeNode::new("l", DataType::List, None).append_nested_list_element();
        match &node.entries()[0] {
            Entry::NestedList { name, value } => {
                assert!(name.is_empty());
                assert_eq!(value.value, Some(AttrValue::Seq(vec![])));
            }
            other => panic!("unexpected {other:?}"),
        }

        let renamed = node.edit_nested_list_name(0, "inner").unwrap();
        assert_eq!(renamed.entries()[0].label(), Some("inner"));
        assert_eq!(renamed.entries()[0].child(), node.entries()[0].child());

        let child = AttributeNode::default().append_list_element();
        let updated = renamed.edit_nested_list_value(0, child.clone()).unwrap();
        assert_eq!(
            updated.entries(),
            &[Entry::NestedList {
                name: "inner".into(),
                value: Box::new(child)
            }]
        );
    }

    #[test]
    fn test_remove_entry() {
        let node = AttributeNode::new(
            "m",
            DataType::Map,
            Some(AttrValue::Seq(vec![pair("a", "1"), pair("b", "2")])),
        );
        let removed = node.remove_entry(0).unwrap();
        assert_eq!(removed.entries(), &[pair("b", "2")]);
        assert!(node.remove_entry(2).is_err());
    }

    #[test]
    fn test_append_over_scalar_starts_fresh() {
        let node = AttributeNode::new("s", DataType::String, Some(AttrValue::Str("abc".into())));
        let node = node.append_list_element();
        assert_eq!(node.entries(), &[Entry::Item(String::new())]);
    }

    #[test]
    fn test_unlabeled_element_edits() {
        let node = AttributeNode::new(
            "l",
            DataType::List,
            Some(AttrValue::Seq(vec![Entry::Unlabeled {
                value: Box::new(AttributeNode::default()),
            }])),
        );
        let child = AttributeNode::default().with_value(Some(AttrValue::Str("v".into())));

        let edited = node.edit_nested_list_value(0, child.clone()).unwrap();
        assert_eq!(
            edited.entries(),
            &[Entry::Unlabeled {
                value: Box::new(child.clone())
            }]
        );

        let named = edited.edit_nested_list_name(0, "n").unwrap();
        assert_eq!(
            named.entries(),
            &[Entry::NestedList {
                name: "n".into(),
                value: Box::new(child.clone())
            }]
        );

        let keyed = edited.edit_nested_map_key(0, "k").unwrap();
        assert_eq!(
            keyed.entries(),
            &[Entry::Nested {
                key: "k".into(),
                value: Box::new(child)
            }]
        );
    }
}
