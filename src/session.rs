//! One editing/navigation session over a map.
//!
//! `MapSession` owns the current tree snapshot plus the UI-facing state that
//! lives outside the tree: the drill path, the selection, and the hover id.
//! Every user event maps to one method; each mutation builds a complete new
//! snapshot through the copy-on-write layer and swaps it in with a single
//! assignment, so a reader of the previous snapshot never sees a half-done
//! edit.

use crate::document;
use crate::error::MapError;
use crate::locate;
use crate::model::{MapNode, ROOT_ID};
use crate::mutate::{self, NodePatch};
use crate::navigation::DrillPath;
use crate::visibility;

pub struct MapSession {
    tree: MapNode,
    drill_path: DrillPath,
    selected: Option<String>,
    hovered: Option<String>,
}

/// One breadcrumb entry, resolved against the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub id: String,
    pub label: String,
}

/// Read-only projection handed to a renderer: the focus root with whatever
/// is currently visible under it, the breadcrumb trail, and the selection.
pub struct MapView<'a> {
    pub focus_root: &'a MapNode,
    pub breadcrumbs: Vec<Crumb>,
    pub selected: Option<&'a MapNode>,
    pub hovered: Option<&'a MapNode>,
}

impl MapSession {
    /// Start a session on a validated document, keeping its visibility
    /// state exactly as stored.
    pub fn new(root: MapNode) -> Result<Self, MapError> {
        document::validate(&root)?;
        Ok(MapSession {
            tree: root,
            drill_path: DrillPath::new(),
            selected: None,
            hovered: None,
        })
    }

    /// Start a browsing session: same as [`new`](Self::new) but applies the
    /// first-load policy (everything below level 1 pre-collapsed) so a large
    /// document opens readable.
    pub fn open(root: MapNode) -> Result<Self, MapError> {
        let mut session = Self::new(root)?;
        session.tree = visibility::collapse_below_first_level(&session.tree);
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Snapshot access
    // ------------------------------------------------------------------

    pub fn tree(&self) -> &MapNode {
        &self.tree
    }

    /// The node currently being viewed: the top of the drill path resolved
    /// against the snapshot. A dangling path id (never reachable through the
    /// delete guard, but defended anyway) falls back to the absolute root.
    pub fn focus_root(&self) -> &MapNode {
        locate::find(&self.tree, self.drill_path.current()).unwrap_or(&self.tree)
    }

    pub fn drill_path(&self) -> &DrillPath {
        &self.drill_path
    }

    /// Selection re-resolved against the current snapshot; a selection whose
    /// node has gone resolves to `None` rather than dangling.
    pub fn selected_node(&self) -> Option<&MapNode> {
        self.selected.as_deref().and_then(|id| locate::find(&self.tree, id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn view(&self) -> MapView<'_> {
        MapView {
            focus_root: self.focus_root(),
            breadcrumbs: self.breadcrumbs(),
            selected: self.selected_node(),
            hovered: self.hovered.as_deref().and_then(|id| locate::find(&self.tree, id)),
        }
    }

    /// Breadcrumb trail with labels resolved per entry; an unresolvable id
    /// shows the id itself.
    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        self.drill_path
            .ids()
            .iter()
            .map(|id| Crumb {
                id: id.clone(),
                label: locate::find(&self.tree, id)
                    .map(|n| n.label.clone())
                    .unwrap_or_else(|| id.clone()),
            })
            .collect()
    }

    pub fn export_json(&self) -> Result<String, MapError> {
        document::export_string(&self.tree)
    }

    // ------------------------------------------------------------------
    // Selection and hover
    // ------------------------------------------------------------------

    /// Click: select the node. Unknown ids are ignored.
    pub fn click(&mut self, id: &str) {
        if locate::contains(&self.tree, id) {
            self.selected = Some(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn hover(&mut self, id: Option<&str>) {
        self.hovered = id.map(str::to_string);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Double-click / drill-down: focus the subtree under `id`. A collapsed
    /// target is expanded first so drilling in always reveals its children.
    /// Unknown ids are ignored (the path must only ever hold live nodes).
    pub fn drill_into(&mut self, id: &str) {
        let Some(target) = locate::find(&self.tree, id) else {
            return;
        };
        if target.collapsed {
            self.tree = visibility::toggle_collapse(&self.tree, id);
        }
        self.drill_path.push(id);
        self.selected = None;
    }

    /// Drill-up: leave the current focus root, expanding it in the parent
    /// view so the place the user came from stays visible. No-op at the
    /// absolute root. Returns whether the view moved.
    pub fn drill_up(&mut self) -> bool {
        if self.drill_path.is_at_root() {
            return false;
        }
        let leaving = self.drill_path.current().to_string();
        let was_collapsed = locate::find(&self.tree, &leaving).map(|n| n.collapsed).unwrap_or(false);
        if was_collapsed {
            self.tree = visibility::toggle_collapse(&self.tree, &leaving);
        }
        self.drill_path.pop()
    }

    /// Breadcrumb jump to `index` in the trail. Pure path truncation, no
    /// visibility side effect.
    pub fn breadcrumb_jump(&mut self, index: usize) {
        self.drill_path.truncate_to(index);
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    pub fn toggle_collapse(&mut self, id: &str) {
        self.tree = visibility::toggle_collapse(&self.tree, id);
    }

    /// Expand every node in the current focus root's subtree.
    pub fn expand_all(&mut self) {
        let focus = self.drill_path.current().to_string();
        self.tree = visibility::expand_all(&self.tree, &focus);
    }

    /// Collapse every strict descendant of the current focus root. Nodes
    /// outside the focused subtree are untouched.
    pub fn collapse_all(&mut self) {
        let focus = self.drill_path.current().to_string();
        self.tree = visibility::collapse_all(&self.tree, &focus);
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// Add a fresh node under the selection, or under the focus root when
    /// nothing is selected. Returns the new node's id.
    pub fn add_node(&mut self) -> String {
        let target = self
            .selected
            .clone()
            .unwrap_or_else(|| self.drill_path.current().to_string());
        self.add_node_under(&target)
    }

    /// Add a fresh node under an explicit parent. Returns the new id; an
    /// unknown parent leaves the tree unchanged but still burns the id.
    pub fn add_node_under(&mut self, parent_id: &str) -> String {
        let child = mutate::fresh_node();
        let id = child.id.clone();
        self.tree = mutate::add_child(&self.tree, parent_id, child);
        id
    }

    /// Delete the node `id`. Rejected (tree untouched) for the root and for
    /// any node on the active drill path; a miss is a quiet no-op. Returns
    /// whether a node was actually removed.
    pub fn delete_node(&mut self, id: &str) -> Result<bool, MapError> {
        if id == ROOT_ID {
            return Err(MapError::DeleteRoot);
        }
        if self.drill_path.contains(id) {
            return Err(MapError::DeleteOnDrillPath(id.to_string()));
        }
        let (next, removed) = mutate::remove_node(&self.tree, id);
        if removed {
            self.tree = next;
            if self.selected.as_deref() == Some(id) {
                self.selected = None;
            }
        }
        Ok(removed)
    }

    /// Delete the currently selected node, if any.
    pub fn delete_selected(&mut self) -> Result<bool, MapError> {
        match self.selected.clone() {
            Some(id) => self.delete_node(&id),
            None => Ok(false),
        }
    }

    /// Apply a partial patch to the node `id`. A miss is a quiet no-op.
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) {
        self.tree = mutate::update_node(&self.tree, id, patch);
    }
}
