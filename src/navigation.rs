//! Drill-path stack: the trail of focus roots from the absolute root down
//! to the node currently being viewed.

use crate::model::ROOT_ID;
use serde::Serialize;

/// Ordered ids from outermost to current focus root. Always starts at
/// `"root"` and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillPath {
    ids: Vec<String>,
}

impl Default for DrillPath {
    fn default() -> Self {
        Self::new()
    }
}

impl DrillPath {
    pub fn new() -> Self {
        DrillPath { ids: vec![ROOT_ID.to_string()] }
    }

    /// Id of the current focus root (top of the stack).
    pub fn current(&self) -> &str {
        self.ids.last().map(String::as_str).unwrap_or(ROOT_ID)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the view is at the absolute root.
    pub fn is_at_root(&self) -> bool {
        self.ids.len() == 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Push a new focus root (drill-down).
    pub fn push(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Pop the current focus root (drill-up). Refuses to pop the absolute
    /// root; returns whether anything was popped.
    pub fn pop(&mut self) -> bool {
        if self.ids.len() > 1 {
            self.ids.pop();
            true
        } else {
            false
        }
    }

    /// Breadcrumb jump: keep entries `0..=index`, drop the rest. An index
    /// past the end leaves the path alone.
    pub fn truncate_to(&mut self, index: usize) {
        if index + 1 < self.ids.len() {
            self.ids.truncate(index + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_root() {
        let path = DrillPath::new();
        assert_eq!(path.current(), ROOT_ID);
        assert!(path.is_at_root());
        assert_eq!(path.ids(), &[ROOT_ID.to_string()]);
    }

    #[test]
    fn test_push_pop_round_trip() {
        let mut path = DrillPath::new();
        path.push("A");
        path.push("B");
        assert_eq!(path.current(), "B");
        assert!(path.pop());
        assert_eq!(path.current(), "A");
        assert!(path.pop());
        assert_eq!(path.current(), ROOT_ID);
        // The root entry never pops
        assert!(!path.pop());
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_truncate_to_breadcrumb_index() {
        let mut path = DrillPath::new();
        path.push("A");
        path.push("B");
        path.push("C");

        path.truncate_to(1);
        assert_eq!(path.ids(), &[ROOT_ID.to_string(), "A".to_string()]);

        // Jump to home
        path.truncate_to(0);
        assert!(path.is_at_root());

        // Out-of-range index is a no-op
        path.push("D");
        path.truncate_to(9);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_contains() {
        let mut path = DrillPath::new();
        path.push("A");
        assert!(path.contains("A"));
        assert!(path.contains(ROOT_ID));
        assert!(!path.contains("B"));
    }
}
