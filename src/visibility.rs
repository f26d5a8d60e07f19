//! Collapse/expand semantics.
//!
//! Each node is a two-state machine: Expanded (`children` populated) or
//! Collapsed (`hidden_children` populated). The helpers here swap between
//! the states; the copy-on-write wrappers delegate to [`crate::mutate`].

use crate::model::MapNode;
use crate::mutate::mutate;

/// Flip one node between Expanded and Collapsed. A node with no children of
/// either kind is left alone.
pub fn toggle_collapse(root: &MapNode, id: &str) -> MapNode {
    mutate(root, id, toggle_in_place)
}

fn toggle_in_place(node: &mut MapNode) {
    if !node.children.is_empty() {
        collapse_in_place(node);
    } else if !node.hidden_children.is_empty() {
        expand_in_place(node);
    }
}

fn collapse_in_place(node: &mut MapNode) {
    node.hidden_children = std::mem::take(&mut node.children);
    node.collapsed = true;
}

/// Reveal a node's hidden children, keeping any already-visible ones first.
fn expand_in_place(node: &mut MapNode) {
    if node.hidden_children.is_empty() {
        return;
    }
    let mut revealed = std::mem::take(&mut node.hidden_children);
    node.children.append(&mut revealed);
    node.collapsed = false;
}

/// Force every node in the subtree rooted at `id` (inclusive) to Expanded.
pub fn expand_all(root: &MapNode, id: &str) -> MapNode {
    mutate(root, id, expand_recursively)
}

fn expand_recursively(node: &mut MapNode) {
    expand_in_place(node);
    for child in node.children.iter_mut() {
        expand_recursively(child);
    }
}

/// Force every strict descendant of `id` to Collapsed. The subtree root
/// itself keeps its state; only what hangs below it folds up.
pub fn collapse_all(root: &MapNode, id: &str) -> MapNode {
    mutate(root, id, |node| collapse_recursively(node, true))
}

fn collapse_recursively(node: &mut MapNode, is_subtree_root: bool) {
    if !is_subtree_root && !node.children.is_empty() {
        collapse_in_place(node);
    }
    // Recurse into whichever list is populated after this level settled
    let targets = if !node.children.is_empty() {
        &mut node.children
    } else {
        &mut node.hidden_children
    };
    for child in targets.iter_mut() {
        collapse_recursively(child, false);
    }
}

/// Initial-load policy: level-1 children of the absolute root stay visible,
/// everything deeper starts Collapsed. Gives a readable first view of a
/// large document.
pub fn collapse_below_first_level(root: &MapNode) -> MapNode {
    let mut next = root.clone();
    for child in next.children.iter_mut() {
        precollapse(child);
    }
    next
}

fn precollapse(node: &mut MapNode) {
    if !node.children.is_empty() {
        collapse_in_place(node);
        for child in node.hidden_children.iter_mut() {
            precollapse(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::find;

    /// root -> { A -> { A1 -> {A1a}, A2 }, B }
    fn sample_tree() -> MapNode {
        MapNode::new("root", "Root", "").with_children(vec![
            MapNode::new("A", "Alpha", "").with_children(vec![
                MapNode::new("A1", "Alpha One", "")
                    .with_children(vec![MapNode::new("A1a", "Deep", "")]),
                MapNode::new("A2", "Alpha Two", ""),
            ]),
            MapNode::new("B", "Beta", ""),
        ])
    }

    fn assert_consistent(node: &MapNode) {
        assert!(node.visibility_consistent(), "inconsistent node {}", node.id);
        for child in node.children.iter().chain(node.hidden_children.iter()) {
            assert_consistent(child);
        }
    }

    #[test]
    fn test_toggle_collapses_then_expands() {
        let tree = sample_tree();

        let collapsed = toggle_collapse(&tree, "A");
        let a = find(&collapsed, "A").unwrap();
        assert!(a.collapsed);
        assert!(a.children.is_empty());
        assert_eq!(a.hidden_children.len(), 2);
        assert_consistent(&collapsed);

        let expanded = toggle_collapse(&collapsed, "A");
        // Round trip restores structure and content exactly
        assert_eq!(expanded, tree);
    }

    #[test]
    fn test_toggle_childless_node_is_noop() {
        let tree = sample_tree();
        let next = toggle_collapse(&tree, "B");
        assert_eq!(next, tree);
    }

    #[test]
    fn test_expand_all_reaches_nested_hidden() {
        let tree = sample_tree();
        let folded = collapse_all(&tree, "root");

        let open = expand_all(&folded, "root");
        assert_eq!(open, tree, "full original descendant set visible again");

        fn no_collapsed(node: &MapNode) {
            assert!(!node.collapsed);
            assert!(node.hidden_children.is_empty());
            for c in &node.children {
                no_collapsed(c);
            }
        }
        no_collapsed(&open);
    }

    #[test]
    fn test_expand_all_scoped_to_subtree() {
        let mut tree = sample_tree();
        // Fold only A1, then unfold the A subtree
        let a = &mut tree.children[0];
        let a1 = &mut a.children[0];
        a1.hidden_children = std::mem::take(&mut a1.children);
        a1.collapsed = true;

        let open = expand_all(&tree, "A");
        let a1 = find(&open, "A1").unwrap();
        assert_eq!(a1.children[0].id, "A1a");
        assert!(!a1.collapsed);
    }

    #[test]
    fn test_collapse_all_spares_subtree_root() {
        let tree = sample_tree();
        let folded = collapse_all(&tree, "root");
        assert_consistent(&folded);

        let root = &folded;
        assert!(!root.collapsed, "subtree root itself is exempt");
        assert_eq!(root.children.len(), 2, "level-1 stays in the visible list");

        fn all_descendants_collapsed(node: &MapNode) {
            for child in node.children.iter().chain(node.hidden_children.iter()) {
                if child.has_children() {
                    assert!(child.collapsed, "{} should be collapsed", child.id);
                }
                all_descendants_collapsed(child);
            }
        }
        all_descendants_collapsed(root);
    }

    #[test]
    fn test_collapse_all_scoped_to_subtree() {
        let mut tree = sample_tree();
        tree.children.push(
            MapNode::new("C", "Gamma", "").with_children(vec![MapNode::new("C1", "Gamma One", "")]),
        );

        let folded = collapse_all(&tree, "A");
        // Outside the A subtree nothing moved
        let c = find(&folded, "C").unwrap();
        assert!(!c.collapsed);
        assert_eq!(c.children.len(), 1);
        // Inside, strict descendants folded but A itself did not
        let a = find(&folded, "A").unwrap();
        assert!(!a.collapsed);
        let a1 = find(&folded, "A1").unwrap();
        assert!(a1.collapsed);
    }

    #[test]
    fn test_collapse_below_first_level() {
        let tree = sample_tree();
        let view = collapse_below_first_level(&tree);
        assert_consistent(&view);

        // Root's direct children remain visible
        assert_eq!(view.children.len(), 2);
        let a = find(&view, "A").unwrap();
        assert!(a.collapsed);
        // Deeper levels are pre-collapsed too, ready for later expansion
        let a1 = find(&view, "A1").unwrap();
        assert!(a1.collapsed);
        // Leaves are untouched
        let b = find(&view, "B").unwrap();
        assert!(!b.collapsed);
    }
}
