//! mycomind: an explorable, editable mind map.
//!
//! The core is a tree state and navigation engine built around progressive
//! disclosure: one owned recursive tree whose nodes collapse and expand, a
//! drill-path stack that lets any node act as a temporary viewing root, and
//! copy-on-write mutations so every edit swaps in a complete new snapshot.
//!
//! Layering, leaves first:
//! - [`model`]: the recursive node and its metadata.
//! - [`locate`]: id lookup that sees through collapsed subtrees.
//! - [`mutate`]: copy-on-write mutation plus structural add/delete/update.
//! - [`visibility`]: collapse/expand, bulk fold/unfold, first-load policy.
//! - [`navigation`]: the drill-path stack.
//! - [`session`]: one session tying snapshot + path + selection together,
//!   exposing the event surface a UI drives.
//! - [`document`]: JSON load/validate/export of whole maps.

pub mod document;
pub mod error;
pub mod locate;
pub mod model;
pub mod mutate;
pub mod navigation;
pub mod session;
pub mod visibility;

pub use error::MapError;
pub use model::{MapNode, NodeMeta, NodeStatus, NodeType, ROOT_ID};
pub use mutate::{MetaPatch, NodePatch};
pub use navigation::DrillPath;
pub use session::{Crumb, MapSession, MapView};
