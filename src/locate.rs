//! Tree locator: id lookup that sees through collapse.
//!
//! Every traversal here inspects both `children` and `hidden_children`, so a
//! node stays addressable no matter how deeply it is buried under collapsed
//! ancestors.

use crate::model::MapNode;
use std::collections::HashSet;

/// Depth-first search for a node by id, visible or hidden. First match wins;
/// ids are unique so the match is well-defined.
pub fn find<'a>(root: &'a MapNode, id: &str) -> Option<&'a MapNode> {
    if root.id == id {
        return Some(root);
    }
    for child in root.children.iter().chain(root.hidden_children.iter()) {
        if let Some(found) = find(child, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable variant of [`find`]. Iterative so the borrow moves cleanly down
/// the tree; visit order is irrelevant because ids are unique.
pub fn find_mut<'a>(root: &'a mut MapNode, id: &str) -> Option<&'a mut MapNode> {
    let mut stack: Vec<&'a mut MapNode> = vec![root];
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter_mut());
        stack.extend(node.hidden_children.iter_mut());
    }
    None
}

pub fn contains(root: &MapNode, id: &str) -> bool {
    find(root, id).is_some()
}

/// All ids in the subtree, hidden nodes included, in depth-first order.
pub fn collect_ids(root: &MapNode) -> Vec<String> {
    let mut ids = Vec::with_capacity(root.subtree_size());
    push_ids(root, &mut ids);
    ids
}

fn push_ids(node: &MapNode, ids: &mut Vec<String>) {
    ids.push(node.id.clone());
    for child in node.children.iter().chain(node.hidden_children.iter()) {
        push_ids(child, ids);
    }
}

/// First id that occurs more than once in the subtree, if any.
pub fn first_duplicate_id(root: &MapNode) -> Option<String> {
    let mut seen = HashSet::new();
    for id in collect_ids(root) {
        if !seen.insert(id.clone()) {
            return Some(id);
        }
    }
    None
}

/// Case-insensitive label substring search over the whole subtree.
/// Returns matches in depth-first order.
pub fn search_labels<'a>(root: &'a MapNode, query: &str) -> Vec<&'a MapNode> {
    let needle = query.to_lowercase();
    let mut hits = Vec::new();
    collect_matches(root, &needle, &mut hits);
    hits
}

fn collect_matches<'a>(node: &'a MapNode, needle: &str, hits: &mut Vec<&'a MapNode>) {
    if node.label.to_lowercase().contains(needle) {
        hits.push(node);
    }
    for child in node.children.iter().chain(node.hidden_children.iter()) {
        collect_matches(child, needle, hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> A (collapsed, hiding A1 and A2) and B (visible)
    fn sample_tree() -> MapNode {
        let mut a = MapNode::new("A", "Alpha", "").with_children(vec![
            MapNode::new("A1", "Alpha One", ""),
            MapNode::new("A2", "Alpha Two", ""),
        ]);
        a.hidden_children = std::mem::take(&mut a.children);
        a.collapsed = true;

        MapNode::new("root", "Root", "").with_children(vec![a, MapNode::new("B", "Beta", "")])
    }

    #[test]
    fn test_find_visible() {
        let tree = sample_tree();
        assert_eq!(find(&tree, "B").map(|n| n.label.as_str()), Some("Beta"));
        assert_eq!(find(&tree, "root").map(|n| n.id.as_str()), Some("root"));
    }

    #[test]
    fn test_find_reaches_hidden() {
        let tree = sample_tree();
        // A1 sits inside a collapsed node and must still be addressable
        assert_eq!(find(&tree, "A1").map(|n| n.label.as_str()), Some("Alpha One"));
    }

    #[test]
    fn test_find_miss_is_none() {
        let tree = sample_tree();
        assert!(find(&tree, "nope").is_none());
        assert!(!contains(&tree, "nope"));
    }

    #[test]
    fn test_find_mut_reaches_hidden() {
        let mut tree = sample_tree();
        find_mut(&mut tree, "A2").unwrap().label = "renamed".to_string();
        assert_eq!(find(&tree, "A2").unwrap().label, "renamed");
    }

    #[test]
    fn test_collect_ids_includes_hidden() {
        let tree = sample_tree();
        let ids = collect_ids(&tree);
        assert_eq!(ids.len(), 5);
        for id in ["root", "A", "A1", "A2", "B"] {
            assert!(ids.iter().any(|i| i == id), "missing {}", id);
        }
    }

    #[test]
    fn test_first_duplicate_id() {
        let mut tree = sample_tree();
        assert_eq!(first_duplicate_id(&tree), None);
        tree.children.push(MapNode::new("A1", "Imposter", ""));
        assert_eq!(first_duplicate_id(&tree), Some("A1".to_string()));
    }

    #[test]
    fn test_search_labels() {
        let tree = sample_tree();
        let hits = search_labels(&tree, "alpha");
        let labels: Vec<_> = hits.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Alpha One", "Alpha Two"]);
        assert!(search_labels(&tree, "gamma").is_empty());
    }
}
