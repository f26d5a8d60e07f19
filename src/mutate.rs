//! Copy-on-write tree mutation.
//!
//! Every operation takes the current snapshot by reference and returns a new
//! tree; the input is never touched. A holder of the previous snapshot keeps
//! a fully valid tree, and a failed locate yields an unchanged copy, so a
//! mutation is atomic from the caller's side.

use crate::locate;
use crate::model::{MapNode, NodeMeta, NodeStatus, NodeType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clone the tree, locate `id` in the clone (visible or hidden), and apply
/// `apply` to it in place. An unmatched id returns the clone unmodified.
pub fn mutate<F>(root: &MapNode, id: &str, apply: F) -> MapNode
where
    F: FnOnce(&mut MapNode),
{
    let mut next = root.clone();
    if let Some(node) = locate::find_mut(&mut next, id) {
        apply(node);
    }
    next
}

/// Mint a node for interactive "add": fresh unique id, placeholder text,
/// default metadata stamped with the current time.
pub fn fresh_node() -> MapNode {
    MapNode {
        id: format!("node-{}", Uuid::new_v4()),
        label: "New Node".to_string(),
        description: "Newly created node.".to_string(),
        metadata: NodeMeta::fresh(),
        children: Vec::new(),
        hidden_children: Vec::new(),
        collapsed: false,
    }
}

/// Append `child` under the node `target_id`. The child lands in whichever
/// list is populated; when that was the hidden list, the whole list is
/// promoted to visible so an explicit structural edit is never invisible.
pub fn add_child(root: &MapNode, target_id: &str, child: MapNode) -> MapNode {
    mutate(root, target_id, |node| {
        if node.hidden_children.is_empty() {
            node.children.push(child);
        } else {
            node.hidden_children.push(child);
            let mut revealed = std::mem::take(&mut node.hidden_children);
            node.children.append(&mut revealed);
            node.collapsed = false;
        }
    })
}

/// Remove the node `id` from the tree, splicing it out of whichever child
/// list holds it. At each level a direct match takes precedence over a
/// deeper one. Returns the new tree and whether anything was removed; the
/// root itself is never a candidate here (callers guard it).
pub fn remove_node(root: &MapNode, id: &str) -> (MapNode, bool) {
    let mut next = root.clone();
    let removed = remove_from(&mut next, id);
    (next, removed)
}

fn remove_from(parent: &mut MapNode, id: &str) -> bool {
    if let Some(i) = parent.children.iter().position(|c| c.id == id) {
        parent.children.remove(i);
        return true;
    }
    if parent.children.iter_mut().any(|c| remove_from(c, id)) {
        return true;
    }
    if let Some(i) = parent.hidden_children.iter().position(|c| c.id == id) {
        parent.hidden_children.remove(i);
        return true;
    }
    parent.hidden_children.iter_mut().any(|c| remove_from(c, id))
}

/// Partial update for a node's editable fields. Fields left `None` are
/// preserved; metadata merges key-wise rather than replacing wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<MetaPatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaPatch {
    #[serde(rename = "type", default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub status: Option<NodeStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created: Option<String>,
}

impl NodePatch {
    pub fn label(label: impl Into<String>) -> Self {
        NodePatch { label: Some(label.into()), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.description.is_none() && self.metadata.is_none()
    }
}

/// Apply a partial patch to the node `id`.
pub fn update_node(root: &MapNode, id: &str, patch: &NodePatch) -> MapNode {
    let patch = patch.clone();
    mutate(root, id, move |node| {
        if let Some(label) = patch.label {
            node.label = label;
        }
        if let Some(description) = patch.description {
            node.description = description;
        }
        if let Some(meta) = patch.metadata {
            if let Some(node_type) = meta.node_type {
                node.metadata.node_type = node_type;
            }
            if let Some(status) = meta.status {
                node.metadata.status = status;
            }
            if let Some(tags) = meta.tags {
                node.metadata.tags = tags;
            }
            if let Some(created) = meta.created {
                node.metadata.created = created;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::{collect_ids, find};

    fn collapse(mut node: MapNode) -> MapNode {
        node.hidden_children = std::mem::take(&mut node.children);
        node.collapsed = true;
        node
    }

    /// root -> { A -> {A1, A2}, B }
    fn sample_tree() -> MapNode {
        MapNode::new("root", "Root", "").with_children(vec![
            MapNode::new("A", "Alpha", "").with_children(vec![
                MapNode::new("A1", "Alpha One", ""),
                MapNode::new("A2", "Alpha Two", ""),
            ]),
            MapNode::new("B", "Beta", ""),
        ])
    }

    #[test]
    fn test_mutate_leaves_original_untouched() {
        let tree = sample_tree();
        let before = tree.clone();

        let next = mutate(&tree, "A1", |n| n.label = "changed".to_string());

        assert_eq!(tree, before, "previous snapshot must be unchanged at every depth");
        assert_eq!(find(&next, "A1").unwrap().label, "changed");
    }

    #[test]
    fn test_mutate_missing_id_is_noop_clone() {
        let tree = sample_tree();
        let next = mutate(&tree, "ghost", |n| n.label = "boo".to_string());
        assert_eq!(next, tree);
    }

    #[test]
    fn test_mutate_reaches_hidden_node() {
        let mut tree = sample_tree();
        tree.children[0] = collapse(tree.children[0].clone());

        let next = mutate(&tree, "A2", |n| n.description = "still here".to_string());
        assert_eq!(find(&next, "A2").unwrap().description, "still here");
        // And the original hidden node is untouched
        assert_eq!(find(&tree, "A2").unwrap().description, "");
    }

    #[test]
    fn test_add_child_to_expanded_node() {
        let tree = sample_tree();
        let next = add_child(&tree, "A", MapNode::new("A3", "Alpha Three", ""));

        let a = find(&next, "A").unwrap();
        assert_eq!(a.children.len(), 3);
        assert!(a.hidden_children.is_empty());
        assert_eq!(a.children[2].id, "A3");
    }

    #[test]
    fn test_add_child_to_leaf_initializes_children() {
        let tree = sample_tree();
        let next = add_child(&tree, "B", MapNode::new("B1", "Beta One", ""));
        let b = find(&next, "B").unwrap();
        assert_eq!(b.children.len(), 1);
        assert!(!b.collapsed);
    }

    #[test]
    fn test_add_child_to_collapsed_node_reveals_it() {
        let mut tree = sample_tree();
        tree.children[0] = collapse(tree.children[0].clone());

        let next = add_child(&tree, "A", MapNode::new("A3", "Alpha Three", ""));
        let a = find(&next, "A").unwrap();

        // The hidden list was promoted wholesale, new child last
        assert!(!a.collapsed);
        assert!(a.hidden_children.is_empty());
        let ids: Vec<_> = a.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn test_remove_node_from_visible_list() {
        let tree = sample_tree();
        let (next, removed) = remove_node(&tree, "A1");
        assert!(removed);
        assert!(find(&next, "A1").is_none());
        assert_eq!(find(&next, "A").unwrap().children.len(), 1);
        // Copy-on-write: the original still has it
        assert!(find(&tree, "A1").is_some());
    }

    #[test]
    fn test_remove_node_from_hidden_list() {
        let mut tree = sample_tree();
        tree.children[0] = collapse(tree.children[0].clone());

        let (next, removed) = remove_node(&tree, "A1");
        assert!(removed);
        let a = find(&next, "A").unwrap();
        assert_eq!(a.hidden_children.len(), 1);
        assert_eq!(a.hidden_children[0].id, "A2");
        assert!(a.collapsed, "removal does not change visibility state");
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let tree = sample_tree();
        let (next, removed) = remove_node(&tree, "ghost");
        assert!(!removed);
        assert_eq!(next, tree);
    }

    #[test]
    fn test_remove_subtree_drops_descendants() {
        let tree = sample_tree();
        let (next, removed) = remove_node(&tree, "A");
        assert!(removed);
        for gone in ["A", "A1", "A2"] {
            assert!(find(&next, gone).is_none(), "{} should be gone", gone);
        }
        assert!(find(&next, "B").is_some());
    }

    #[test]
    fn test_update_node_patch_merges_metadata() {
        let tree = sample_tree();
        let created_before = find(&tree, "B").unwrap().metadata.created.clone();

        let patch = NodePatch {
            label: Some("Beta Prime".to_string()),
            description: None,
            metadata: Some(MetaPatch {
                status: Some(NodeStatus::Completed),
                tags: Some(vec!["done".to_string()]),
                ..Default::default()
            }),
        };
        let next = update_node(&tree, "B", &patch);
        let b = find(&next, "B").unwrap();

        assert_eq!(b.label, "Beta Prime");
        assert_eq!(b.description, "", "unpatched field preserved");
        assert_eq!(b.metadata.status, NodeStatus::Completed);
        assert_eq!(b.metadata.tags, vec!["done".to_string()]);
        // Merge is key-wise: untouched metadata fields survive
        assert_eq!(b.metadata.node_type, NodeType::Concept);
        assert_eq!(b.metadata.created, created_before);
    }

    #[test]
    fn test_fresh_node_ids_are_unique() {
        let mut tree = sample_tree();
        for _ in 0..50 {
            tree = add_child(&tree, "root", fresh_node());
        }
        let ids = collect_ids(&tree);
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }
}
