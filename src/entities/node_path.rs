//! Addressing nested nodes from a root attribute.
//!
//! A [`NodePath`] records, for each level, the entry index and which nested
//! section (map or list) owns the child editor. [`AttributeNode::update_at`]
//! walks the path and rebuilds the spine with the same edits the nested
//! editors use, so a deferred result (e.g. a finished file read) lands exactly
//! as if the editor had reported it in the frame it was requested.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::attr_node::AttributeNode;
use super::edits::EditError;

/// Nested section a child editor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Via {
    Map,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub index: usize,
    pub via: Via,
}

/// Path from a root attribute to a nested node. Empty path = the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<PathStep>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the child editor for entry `index` in the `via` section.
    pub fn child(&self, index: usize, via: Via) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep { index, via });
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with the step at `depth` pointing at `index` instead.
    pub fn with_index_at(&self, depth: usize, index: usize) -> Self {
        let mut steps = self.0.clone();
        if let Some(step) = steps.get_mut(depth) {
            step.index = index;
        }
        Self(steps)
    }

    /// True if `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for step in &self.0 {
            let section = match step.via {
                Via::Map => "map",
                Via::List => "list",
            };
            write!(f, "/{}[{}]", section, step.index)?;
        }
        Ok(())
    }
}

impl AttributeNode {
    /// Node at `path`, as the nested editor would show it.
    pub fn node_at(&self, path: &NodePath) -> Result<AttributeNode, EditError> {
        let mut current = self.clone();
        for (depth, step) in path.steps().iter().enumerate() {
            let entry = current
                .entries()
                .get(step.index)
                .ok_or(EditError::PathNotFound { depth })?;
            let next = entry.as_child_node().into_owned();
            current = next;
        }
        Ok(current)
    }

    /// Return a new root with the node at `path` replaced by `f(node)`.
    pub fn update_at<F>(&self, path: &NodePath, f: F) -> Result<AttributeNode, EditError>
    where
        F: FnOnce(&AttributeNode) -> AttributeNode,
    {
        update_steps(self, path.steps(), 0, f)
    }
}

fn update_steps<F>(
    node: &AttributeNode,
    steps: &[PathStep],
    depth: usize,
    f: F,
) -> Result<AttributeNode, EditError>
where
    F: FnOnce(&AttributeNode) -> AttributeNode,
{
    let Some((step, rest)) = steps.split_first() else {
        return Ok(f(node));
    };
    let entry = node
        .entries()
        .get(step.index)
        .ok_or(EditError::PathNotFound { depth })?;
    let child = update_steps(&entry.as_child_node(), rest, depth + 1, f)?;
    match step.via {
        Via::Map => node.edit_nested_map_value(step.index, child),
        Via::List => node.edit_nested_list_value(step.index, child),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AttrValue, DataType, Entry};

    fn tree() -> AttributeNode {
        // root (map) -> [0] nested map -> (list) -> [0] nested list element
        let leaf_parent = AttributeNode::default()
            .with_data_type(DataType::List)
            .append_nested_list_element();
        AttributeNode::new("root", DataType::Map, None)
            .append_map_entry()
            .append_nested_map_entry()
            .edit_nested_map_key(1, "inner")
            .and_then(|n| n.edit_nested_map_value(1, leaf_parent))
            .unwrap()
    }

    #[test]
    fn test_path_display() {
        let path = NodePath::root().child(1, Via::Map).child(0, Via::List);
        assert_eq!(path.to_string(), "/map[1]/list[0]");
        assert_eq!(NodePath::root().to_string(), "/");
        assert_eq!(path.depth(), 2);
        assert!(path.starts_with(&NodePath::root().child(1, Via::Map)));
        assert!(!NodePath::root().child(0, Via::Map).starts_with(&path));
        assert_eq!(path.with_index_at(0, 0).to_string(), "/map[0]/list[0]");
        assert_eq!(path.with_index_at(5, 0), path);
    }

    #[test]
    fn test_update_at_root() {
        let root = tree();
        let updated = root
            .update_at(&NodePath::root(), |n| n.with_data_type(DataType::List))
            .unwrap();
        assert_eq!(updated.data_type, DataType::List);
        assert_eq!(updated.value, root.value);
    }

    #[test]
    fn test_update_at_matches_callback_chain() {
        let root = tree();
        let path = NodePath::root().child(1, Via::Map).child(0, Via::List);
        let url = "data:text/plain;base64,aGk=".to_string();

        let via_path = root
            .update_at(&path, |n| {
                n.with_data_type(DataType::Binary)
                    .with_value(Some(AttrValue::Str(url.clone())))
            })
            .unwrap();

        // Same edit composed by hand, the way nested editors report upward
        let mid = root.entries()[1].as_child_node().into_owned();
        let leaf = mid.entries()[0].as_child_node().into_owned();
        let leaf = leaf
            .with_data_type(DataType::Binary)
            .with_value(Some(AttrValue::Str(url.clone())));
        let mid = mid.edit_nested_list_value(0, leaf).unwrap();
        let by_hand = root.edit_nested_map_value(1, mid).unwrap();

        assert_eq!(via_path, by_hand);
        assert_eq!(
            via_path.node_at(&path).unwrap().value,
            Some(AttrValue::Str(url))
        );
        // Sibling untouched
        assert_eq!(via_path.entries()[0], root.entries()[0]);
    }

    #[test]
    fn test_update_at_lifts_flat_entry() {
        let root = tree();
        let path = NodePath::root().child(0, Via::Map);
        let updated = root
            .update_at(&path, |n| n.with_value(Some(AttrValue::Str("lifted".into()))))
            .unwrap();
        match &updated.entries()[0] {
            Entry::Nested { key, value } => {
                assert!(key.is_empty());
                assert_eq!(value.value, Some(AttrValue::Str("lifted".into())));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_update_at_missing_path() {
        let root = tree();
        let path = NodePath::root().child(1, Via::Map).child(5, Via::List);
        assert_eq!(
            root.update_at(&path, |n| n.clone()),
            Err(EditError::PathNotFound { depth: 1 })
        );
        assert!(root.node_at(&NodePath::root().child(9, Via::Map)).is_err());
    }
}
