//! Error taxonomy for the mind map engine.

/// Everything that can go wrong across the engine, document layer, and CLI
/// plumbing. Locator misses inside mutations are deliberately NOT errors;
/// they degrade to no-ops. `NotFound` only surfaces where a caller asked for
/// a node by id and needs to know it is absent.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("cannot delete the root node")]
    DeleteRoot,

    #[error("cannot delete '{0}': it is part of the current navigation path")]
    DeleteOnDrillPath(String),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl MapError {
    /// Rejections are invariant guards: non-fatal, tree left unmodified,
    /// surfaced to the user as a notice rather than a failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, MapError::DeleteRoot | MapError::DeleteOnDrillPath(_))
    }
}
