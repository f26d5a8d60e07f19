//! Document layer: loading, validating, and exporting whole maps.
//!
//! A document is one JSON-encoded node acting as the absolute root. Loading
//! is the only place malformed input is treated as fatal; once a tree is in
//! memory every operation maintains the invariants itself.

use crate::error::MapError;
use crate::locate;
use crate::model::{MapNode, NodeStatus, NodeType, ROOT_ID};
use std::path::Path;

/// Parse a JSON document and validate it. Missing required fields surface
/// as serde errors; structural problems surface as `Malformed`.
pub fn parse(json: &str) -> Result<MapNode, MapError> {
    let root: MapNode = serde_json::from_str(json)?;
    validate(&root)?;
    Ok(normalize(root))
}

/// Structural validation of a seed document:
/// - the root must carry the `"root"` sentinel id,
/// - ids must be unique across the whole tree, hidden nodes included,
/// - no node may have both child lists populated.
pub fn validate(root: &MapNode) -> Result<(), MapError> {
    if root.id != ROOT_ID {
        return Err(MapError::Malformed(format!(
            "document root must have id \"{}\", found \"{}\"",
            ROOT_ID, root.id
        )));
    }
    if let Some(dup) = locate::first_duplicate_id(root) {
        return Err(MapError::Malformed(format!("duplicate node id \"{}\"", dup)));
    }
    check_exclusivity(root)
}

fn check_exclusivity(node: &MapNode) -> Result<(), MapError> {
    if !node.children.is_empty() && !node.hidden_children.is_empty() {
        return Err(MapError::Malformed(format!(
            "node \"{}\" has both visible and hidden children",
            node.id
        )));
    }
    for child in node.children.iter().chain(node.hidden_children.iter()) {
        check_exclusivity(child)?;
    }
    Ok(())
}

/// Recompute every `collapsed` flag from the child lists. Hand-edited
/// documents drift here; the lists are authoritative, the flag is derived.
fn normalize(mut root: MapNode) -> MapNode {
    normalize_in_place(&mut root);
    root
}

fn normalize_in_place(node: &mut MapNode) {
    node.collapsed = !node.hidden_children.is_empty() && node.children.is_empty();
    for child in node.children.iter_mut().chain(node.hidden_children.iter_mut()) {
        normalize_in_place(child);
    }
}

/// Serialize the entire tree, hidden subtrees included, as pretty JSON.
/// Collapse state is carried along but loses no data.
pub fn export_string(root: &MapNode) -> Result<String, MapError> {
    Ok(serde_json::to_string_pretty(root)?)
}

pub fn load_file(path: &Path) -> Result<MapNode, MapError> {
    let json = std::fs::read_to_string(path)?;
    parse(&json)
}

pub fn save_file(path: &Path, root: &MapNode) -> Result<(), MapError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, export_string(root)?)?;
    Ok(())
}

/// Small seed map for `init`: enough structure to demonstrate collapse,
/// drill, and the node types.
pub fn starter_document() -> MapNode {
    let mut root = MapNode::new(ROOT_ID, "Hub", "The center of this map.");
    root.metadata.node_type = NodeType::Root;
    root.metadata.tags = vec!["origin".to_string()];
    root.with_children(vec![
        MapNode::new("ideas", "Ideas", "Things worth growing.")
            .with_meta(NodeType::Concept, NodeStatus::Active, &["seed"])
            .with_children(vec![
                MapNode::new("ideas-capture", "Capture quickly", "Write first, sort later.")
                    .with_meta(NodeType::Note, NodeStatus::Active, &[]),
                MapNode::new("ideas-prune", "Prune weekly", "Drop what stopped mattering.")
                    .with_meta(NodeType::Task, NodeStatus::Pending, &["habit"]),
            ]),
        MapNode::new("projects", "Projects", "Work in flight.")
            .with_meta(NodeType::Concept, NodeStatus::Active, &[])
            .with_children(vec![
                MapNode::new("projects-current", "Current focus", "One thing at a time.")
                    .with_meta(NodeType::Task, NodeStatus::Active, &["now"]),
                MapNode::new("projects-someday", "Someday", "Parked, not forgotten.")
                    .with_meta(NodeType::Note, NodeStatus::Pending, &[]),
            ]),
        MapNode::new("reference", "Reference", "Stable knowledge.")
            .with_meta(NodeType::Concept, NodeStatus::Active, &["library"]),
    ])
}
