//! Tree configuration.
//!
//! The branching factor is a compile-time parameter of [`crate::BTree`]; this
//! only covers allocation limits and self-checking.

/// Configuration for a [`crate::BTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of node slots to allocate up front.
    pub initial_nodes: usize,
    /// Hard cap on live nodes. Insertions that would exceed it fail with
    /// [`crate::BTreeError::ResourceExhaustion`].
    pub max_nodes: Option<usize>,
    /// Run [`crate::BTree::validate`] after every mutation and panic on failure.
    pub check_invariants: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_nodes: 0,
            max_nodes: None,
            check_invariants: false,
        }
    }
}

impl Config {
    pub fn with_initial_nodes(mut self, initial_nodes: usize) -> Self {
        self.initial_nodes = initial_nodes;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }
}
