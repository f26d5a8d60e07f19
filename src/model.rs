use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Fixed id of the absolute root node. The root is never deleted and bulk
/// collapse never collapses it onto itself.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Concept,
    Task,
    Note,
    Root,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Concept => "concept",
            NodeType::Task => "task",
            NodeType::Note => "note",
            NodeType::Root => "root",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "concept" => Some(NodeType::Concept),
            "task" => Some(NodeType::Task),
            "note" => Some(NodeType::Note),
            "root" => Some(NodeType::Root),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Completed,
    Pending,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Active => "active",
            NodeStatus::Completed => "completed",
            NodeStatus::Pending => "pending",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(NodeStatus::Active),
            "completed" => Some(NodeStatus::Completed),
            "pending" => Some(NodeStatus::Pending),
            _ => None,
        }
    }
}

/// Per-node metadata carried by the document format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeMeta {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub status: NodeStatus,
    pub tags: Vec<String>,
    pub created: String, // RFC 3339
}

impl NodeMeta {
    /// Default metadata for a freshly created node.
    pub fn fresh() -> Self {
        NodeMeta {
            node_type: NodeType::Concept,
            status: NodeStatus::Active,
            tags: Vec::new(),
            created: now_rfc3339(),
        }
    }
}

// Visibility is encoded as two owned child lists: `children` holds the
// visible subtree, `hidden_children` holds the same nodes while the parent
// is collapsed. At most one of the two is non-empty at any time, and
// `collapsed` is true exactly when `hidden_children` is the populated one.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapNode {
    pub id: String,
    pub label: String,
    pub description: String,
    pub metadata: NodeMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MapNode>,
    #[serde(rename = "hiddenChildren", default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_children: Vec<MapNode>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
}

impl MapNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        MapNode {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            metadata: NodeMeta::fresh(),
            children: Vec::new(),
            hidden_children: Vec::new(),
            collapsed: false,
        }
    }

    pub fn with_meta(mut self, node_type: NodeType, status: NodeStatus, tags: &[&str]) -> Self {
        self.metadata.node_type = node_type;
        self.metadata.status = status;
        self.metadata.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<MapNode>) -> Self {
        self.children = children;
        self
    }

    /// True when the node has children of either kind.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty() || !self.hidden_children.is_empty()
    }

    /// Number of direct children, visible or hidden.
    pub fn direct_child_count(&self) -> usize {
        self.children.len() + self.hidden_children.len()
    }

    /// Total node count of the subtree rooted here, including hidden nodes
    /// and the node itself.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .chain(self.hidden_children.iter())
            .map(MapNode::subtree_size)
            .sum::<usize>()
    }

    /// Structural validity of this node alone: the two child lists are
    /// mutually exclusive and the collapsed flag agrees with them.
    pub fn visibility_consistent(&self) -> bool {
        let dual = !self.children.is_empty() && !self.hidden_children.is_empty();
        let flag_ok = self.collapsed == (!self.hidden_children.is_empty() && self.children.is_empty());
        !dual && flag_ok
    }
}

/// Current time as an RFC 3339 string with millisecond precision, the shape
/// `metadata.created` uses throughout a document.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
