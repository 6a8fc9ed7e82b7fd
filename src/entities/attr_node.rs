//! Typed attribute tree.
//!
//! An [`AttributeNode`] is a named, typed value. Map and list payloads are
//! sequences of [`Entry`] items, and nested entries carry whole subtrees, so
//! the structure recurses to any depth.
//!
//! JSON shape:
//! ```json
//! {"name": "tags", "dataType": "map", "value": [{"key": "k1", "value": "v1"}]}
//! ```
//!
//! # Payload vs type
//! `data_type` and `value` are deliberately independent: changing the type does
//! not touch the payload (see [`AttributeNode::with_data_type`]). Use
//! [`AttributeNode::check_shape`] to find out whether a payload still fits.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

use super::data_url::DataUrl;

/// Fixed set of attribute types selectable in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Boolean,
    Null,
    Binary,
    Map,
    List,
}

impl DataType {
    /// All types in selector order.
    pub const ALL: [DataType; 7] = [
        DataType::String,
        DataType::Number,
        DataType::Boolean,
        DataType::Null,
        DataType::Binary,
        DataType::Map,
        DataType::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Null => "null",
            DataType::Binary => "binary",
            DataType::Map => "map",
            DataType::List => "list",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        DataType::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Default payload for a freshly reset node of this type.
    ///
    /// `null` and `binary` have no meaningful empty payload and stay absent.
    pub fn default_value(&self) -> Option<AttrValue> {
        match self {
            DataType::String => Some(AttrValue::Str(String::new())),
            DataType::Number => Some(AttrValue::Number(0.0)),
            DataType::Boolean => Some(AttrValue::Bool(false)),
            DataType::Null | DataType::Binary => None,
            DataType::Map | DataType::List => Some(AttrValue::Seq(Vec::new())),
        }
    }

    /// True for `map` and `list`, whose payload is an entry sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, DataType::Map | DataType::List)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute payload.
///
/// Binary payloads are data-URL strings and therefore live in `Str`.
/// A JSON `null` payload deserializes to an absent value on the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Str(String),
    Seq(Vec<Entry>),
}

impl AttrValue {
    /// Short payload kind used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "boolean",
            AttrValue::Number(_) => "number",
            AttrValue::Str(_) => "string",
            AttrValue::Seq(_) => "sequence",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Entry]> {
        match self {
            AttrValue::Seq(entries) => Some(entries),
            _ => None,
        }
    }

    /// Whether this payload is a valid shape for `data_type`.
    pub fn fits(&self, data_type: DataType) -> bool {
        match (data_type, self) {
            (DataType::String, AttrValue::Str(_)) => true,
            (DataType::Number, AttrValue::Number(_)) => true,
            (DataType::Boolean, AttrValue::Bool(_)) => true,
            (DataType::Binary, AttrValue::Str(s)) => DataUrl::parse(s).is_some(),
            (DataType::Map, AttrValue::Seq(entries)) => entries.iter().all(Entry::is_keyed),
            (DataType::List, AttrValue::Seq(_)) => true,
            _ => false,
        }
    }

    /// One-line human summary, used where a payload can't be edited inline.
    pub fn summary(&self) -> String {
        match self {
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Number(n) => n.to_string(),
            AttrValue::Str(s) => match DataUrl::parse(s) {
                Some(url) => format!("<{} bytes {}>", url.decoded_len(), url.mime()),
                None => format!("{s:?}"),
            },
            AttrValue::Seq(entries) => format!("[{} entries]", entries.len()),
        }
    }
}

/// One element of a map or list payload.
///
/// Variant order matters for untagged deserialization: `Pair` must be tried
/// before `Nested` so `{"key": .., "value": "text"}` stays a flat pair, and
/// `Unlabeled` comes last since it ignores any `key`/`name` field.
///
/// A nested `value` given as a bare JSON array reads as an anonymous `list`
/// node holding those entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// Flat list element.
    Item(String),
    /// Flat map entry.
    Pair { key: String, value: String },
    /// Named nested subtree, created by "Add Nested List".
    NestedList {
        name: String,
        #[serde(deserialize_with = "subtree")]
        value: Box<AttributeNode>,
    },
    /// Keyed nested subtree, created by "Add Nested Map".
    Nested {
        key: String,
        #[serde(deserialize_with = "subtree")]
        value: Box<AttributeNode>,
    },
    /// Nested list element without a label: `{"value": {..}}`.
    Unlabeled {
        #[serde(deserialize_with = "subtree")]
        value: Box<AttributeNode>,
    },
}

/// Nested subtree as written in documents: a node object, or a bare entry array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SubtreeRepr {
    Entries(Vec<Entry>),
    Node(AttributeNode),
}

fn subtree<'de, D>(deserializer: D) -> Result<Box<AttributeNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Box::new(match SubtreeRepr::deserialize(deserializer)? {
        SubtreeRepr::Entries(entries) => AttributeNode {
            name: None,
            data_type: DataType::List,
            value: Some(AttrValue::Seq(entries)),
        },
        SubtreeRepr::Node(node) => node,
    }))
}

impl Entry {
    /// Key (map entries) or name (nested list elements). Plain items have none.
    pub fn label(&self) -> Option<&str> {
        match self {
            Entry::Item(_) | Entry::Unlabeled { .. } => None,
            Entry::Pair { key, .. } | Entry::Nested { key, .. } => Some(key),
            Entry::NestedList { name, .. } => Some(name),
        }
    }

    /// Flat text content, if this entry holds a string rather than a subtree.
    pub fn text(&self) -> Option<&str> {
        match self {
            Entry::Item(s) | Entry::Pair { value: s, .. } => Some(s),
            Entry::Nested { .. } | Entry::NestedList { .. } | Entry::Unlabeled { .. } => None,
        }
    }

    /// Nested subtree, if any.
    pub fn child(&self) -> Option<&AttributeNode> {
        match self {
            Entry::Nested { value, .. }
            | Entry::NestedList { value, .. }
            | Entry::Unlabeled { value } => Some(value),
            Entry::Item(_) | Entry::Pair { .. } => None,
        }
    }

    /// Node shown by the nested editor for this entry.
    ///
    /// Flat entries are lifted into an anonymous node holding their text, so
    /// the nested section can edit any entry regardless of how it was created.
    pub fn as_child_node(&self) -> Cow<'_, AttributeNode> {
        match self {
            Entry::Nested { value, .. }
            | Entry::NestedList { value, .. }
            | Entry::Unlabeled { value } => Cow::Borrowed(value.as_ref()),
            Entry::Item(s) | Entry::Pair { value: s, .. } => Cow::Owned(AttributeNode {
                name: None,
                data_type: DataType::String,
                value: Some(AttrValue::Str(s.clone())),
            }),
        }
    }

    /// Map-compatible entries carry a key.
    pub fn is_keyed(&self) -> bool {
        matches!(self, Entry::Pair { .. } | Entry::Nested { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            Entry::Item(s) | Entry::Pair { value: s, .. } => format!("{s:?}"),
            Entry::Nested { value, .. }
            | Entry::NestedList { value, .. }
            | Entry::Unlabeled { value } => value.summary(),
        }
    }
}

/// Named, typed attribute value. Nested subtrees are anonymous nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttributeNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AttrValue>,
}

/// Payload does not fit the declared type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{data_type} attribute holds a {found} payload")]
    Mismatch {
        data_type: DataType,
        found: &'static str,
    },
}

impl AttributeNode {
    /// Named `string` attribute with no payload.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn new(name: impl Into<String>, data_type: DataType, value: Option<AttrValue>) -> Self {
        Self {
            name: Some(name.into()),
            data_type,
            value,
        }
    }

    /// Label shown in the editor header. Nested subtrees are anonymous and
    /// read as "value".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("value")
    }

    /// Entry sequence of a map/list payload; empty for anything else.
    pub fn entries(&self) -> &[Entry] {
        self.value.as_ref().and_then(AttrValue::as_seq).unwrap_or(&[])
    }

    /// Check that the payload fits `data_type`. An absent payload always fits.
    pub fn check_shape(&self) -> Result<(), ShapeError> {
        match &self.value {
            Some(value) if !value.fits(self.data_type) => Err(ShapeError::Mismatch {
                data_type: self.data_type,
                found: value.kind(),
            }),
            _ => Ok(()),
        }
    }

    pub fn summary(&self) -> String {
        match &self.value {
            Some(value) => format!("{}: {}", self.data_type, value.summary()),
            None => format!("{}: -", self.data_type),
        }
    }
}
