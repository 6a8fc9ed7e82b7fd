//! Document - host-side state holding the root attributes.
//!
//! The editor never owns or deletes nodes; it only reports replacements.
//! Adding, removing and renaming root attributes happens here.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::attr_node::{AttrValue, AttributeNode, DataType};
use super::edits::EditError;
use super::node_path::NodePath;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub attributes: Vec<AttributeNode>,
}

/// On-disk forms accepted by [`Document::from_json`].
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Document(Document),
    Bare(Vec<AttributeNode>),
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small sample used when nothing was loaded yet.
    pub fn sample() -> Self {
        let tags = AttributeNode::new("tags", DataType::Map, Some(AttrValue::Seq(Vec::new())))
            .append_map_entry();
        Self {
            attributes: vec![
                AttributeNode::new("title", DataType::String, Some(AttrValue::Str("untitled".into()))),
                tags,
                AttributeNode::new("items", DataType::List, Some(AttrValue::Seq(Vec::new()))),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AttributeNode> {
        self.attributes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeNode> {
        self.attributes.iter()
    }

    /// Append a new `string` attribute; returns its index.
    pub fn add_attribute(&mut self, name: impl Into<String>) -> usize {
        self.attributes.push(AttributeNode::named(name));
        self.attributes.len() - 1
    }

    /// Name not yet used by a root attribute: `attr`, `attr_1`, `attr_2`, ...
    pub fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.attributes.iter().any(|a| a.name.as_deref() == Some(name));
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{base}_{i}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn remove_attribute(&mut self, index: usize) -> Option<AttributeNode> {
        if index < self.attributes.len() {
            Some(self.attributes.remove(index))
        } else {
            None
        }
    }

    /// Fold a node reported by the editor back into the document.
    pub fn replace(&mut self, index: usize, node: AttributeNode) -> Result<(), EditError> {
        let len = self.attributes.len();
        let slot = self
            .attributes
            .get_mut(index)
            .ok_or(EditError::IndexOutOfBounds { index, len })?;
        *slot = node;
        Ok(())
    }

    /// Replace the node at `path` under root `index` with `f(node)`.
    pub fn update_at<F>(&mut self, index: usize, path: &NodePath, f: F) -> Result<(), EditError>
    where
        F: FnOnce(&AttributeNode) -> AttributeNode,
    {
        let len = self.attributes.len();
        let root = self
            .attributes
            .get(index)
            .ok_or(EditError::IndexOutOfBounds { index, len })?;
        let next = root.update_at(path, f)?;
        debug!("Updated root {} at {}", index, path);
        self.replace(index, next)
    }

    /// Save as pretty JSON.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Serialize document")?;
        fs::write(path, json).with_context(|| format!("Write document {}", path.display()))?;
        info!("Saved {} attributes to {}", self.len(), path.display());
        Ok(())
    }

    /// Load from JSON. Accepts `{"attributes": [...]}` or a bare attribute array.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Read document {}", path.display()))?;
        let file: DocumentFile = serde_json::from_str(&json)
            .with_context(|| format!("Parse document {}", path.display()))?;
        let doc = match file {
            DocumentFile::Document(doc) => doc,
            DocumentFile::Bare(attributes) => Self { attributes },
        };
        info!("Loaded {} attributes from {}", doc.len(), path.display());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MapField, Via};

    #[test]
    fn test_add_remove_replace() {
        let mut doc = Document::new();
        let a = doc.add_attribute("a");
        let b = doc.add_attribute("b");
        assert_eq!((a, b), (0, 1));

        let edited = doc.get(a).unwrap().with_data_type(DataType::Number);
        doc.replace(a, edited).unwrap();
        assert_eq!(doc.get(0).unwrap().data_type, DataType::Number);
        assert!(doc.replace(7, AttributeNode::default()).is_err());

        let removed = doc.remove_attribute(0).unwrap();
        assert_eq!(removed.name.as_deref(), Some("a"));
        assert_eq!(doc.len(), 1);
        assert!(doc.remove_attribute(5).is_none());
    }

    #[test]
    fn test_unique_name() {
        let mut doc = Document::new();
        assert_eq!(doc.unique_name("attr"), "attr");
        doc.add_attribute("attr");
        doc.add_attribute("attr_1");
        assert_eq!(doc.unique_name("attr"), "attr_2");
    }

    #[test]
    fn test_update_at_nested() {
        let mut doc = Document::new();
        let root = AttributeNode::new("m", DataType::Map, None).append_nested_map_entry();
        doc.attributes.push(root);

        let path = NodePath::root().child(0, Via::Map);
        doc.update_at(0, &path, |n| n.with_data_type(DataType::Boolean))
            .unwrap();
        let child = doc.get(0).unwrap().node_at(&path).unwrap();
        assert_eq!(child.data_type, DataType::Boolean);

        assert!(doc.update_at(3, &path, |n| n.clone()).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let mut doc = Document::sample();
        let tags = doc.get(1).unwrap().edit_map_entry(0, MapField::Key, "env").unwrap();
        doc.replace(1, tags).unwrap();
        doc.to_json(&path).unwrap();

        let loaded = Document::from_json(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_from_json_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.json");
        fs::write(&path, r#"[{"name": "flag", "dataType": "boolean", "value": true}]"#).unwrap();

        let doc = Document::from_json(&path).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get(0).unwrap().value, Some(AttrValue::Bool(true)));
    }

    #[test]
    fn test_from_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Document::from_json(dir.path().join("missing.json")).is_err());

        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Document::from_json(&path).is_err());
    }
}
