//! Error types for the B-tree.

use thiserror::Error;

/// Result type alias using [`BTreeError`].
pub type Result<T> = std::result::Result<T, BTreeError>;

/// Errors surfaced by tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BTreeError {
    /// The nodes an insertion needs could not be reserved. The tree is unchanged.
    #[error("unable to reserve {requested} node(s) ({live} live)")]
    ResourceExhaustion { requested: usize, live: usize },

    #[error("duplicate key")]
    DuplicateKey,

    #[error("key not found")]
    KeyNotFound,

    /// Internal corruption detected by [`crate::BTree::validate`].
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
