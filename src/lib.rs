//! # mbtree
//!
//! An in-memory B-tree storing an ordered set of unique keys under a
//! caller-supplied comparator.
//!
//! Nodes live in an index-stable arena. Insertion splits full nodes bottom-up
//! and promotes the median; deletion borrows from or merges with siblings
//! along the recorded ancestor path, so every leaf stays at the same depth.
//!
//! ## Example
//!
//! ```rust
//! use mbtree::BTree;
//!
//! let mut tree: BTree<u32> = BTree::new();
//! for key in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.contains(&12));
//! assert_eq!(tree.height(), 2);
//! assert!(tree.remove(&12));
//! assert!(!tree.contains(&12));
//! ```
//!
//! Keys handed to the tree belong to it until they are removed. The
//! destructor callback given to [`BTree::with_comparator`] receives every key
//! that leaves the tree, exactly once.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

mod config;
mod error;
mod insert;
mod node;
mod remove;
mod search;
mod shape;
mod validate;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{BTreeError, Result};
pub use node::NodeId;
pub use search::Location;

use node::NodeArena;

/// Default maximum number of keys per node (a B-tree of order 4).
pub const DEFAULT_MAX_KEYS: usize = 3;

type Comparator<K> = Box<dyn Fn(&K, &K) -> Ordering>;
type Destructor<K> = Box<dyn FnMut(K)>;

/// An ordered set of unique keys backed by a B-tree.
///
/// `M` is the maximum number of keys a node holds before it splits. Every
/// node except the root holds at least [`BTree::MIN_KEYS`] keys.
pub struct BTree<K, const M: usize = DEFAULT_MAX_KEYS> {
    nodes: NodeArena<K>,
    root: Option<NodeId>,
    count: usize,
    compare: Comparator<K>,
    destroy: Destructor<K>,
    config: Config,
}

impl<K: Ord + 'static, const M: usize> BTree<K, M> {
    /// Creates an empty tree ordered by `Ord`. Removed keys are dropped.
    pub fn new() -> Self {
        Self::with_comparator(K::cmp, drop)
    }
}

impl<K, const M: usize> BTree<K, M> {
    pub const MAX_KEYS: usize = M;
    pub const MIN_KEYS: usize = M / 2;

    const VALID_ORDER: () = assert!(M >= 2, "a B-tree node must hold at least two keys");

    /// Creates an empty tree using `compare` for ordering. `destroy` is
    /// called once for every key that permanently leaves the tree.
    pub fn with_comparator(
        compare: impl Fn(&K, &K) -> Ordering + 'static,
        destroy: impl FnMut(K) + 'static,
    ) -> Self {
        Self::with_config(compare, destroy, Config::default())
    }

    pub fn with_config(
        compare: impl Fn(&K, &K) -> Ordering + 'static,
        destroy: impl FnMut(K) + 'static,
        config: Config,
    ) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_ORDER;

        Self {
            nodes: NodeArena::with_capacity(config.initial_nodes, M + 1),
            root: None,
            count: 0,
            compare: Box::new(compare),
            destroy: Box::new(destroy),
            config,
        }
    }

    /// Number of keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of nodes currently in the tree.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.live()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bytes reserved by the node arena, spare nodes included.
    pub fn memory_usage(&self) -> usize {
        self.nodes.memory_usage()
    }

    /// Removes every key, passing each one to the destructor, and releases
    /// all nodes.
    pub fn clear(&mut self) {
        let keys = self.count;
        while self.remove_arbitrary() {}
        debug_assert_eq!(self.nodes.live(), 0);
        if keys > 0 {
            debug!(keys, "tree cleared");
        }
    }

    #[inline]
    fn compare_keys(&self, a: &K, b: &K) -> Ordering {
        (self.compare)(a, b)
    }

    /// Runs the configured self-check after a mutation.
    fn after_mutation(&self) {
        if self.config.check_invariants {
            if let Err(err) = self.validate() {
                panic!("B-tree corrupted: {err}");
            }
        }
    }

    /// Keys in ascending order.
    pub(crate) fn keys_in_order(&self) -> Vec<&K> {
        fn walk<'a, K>(nodes: &'a NodeArena<K>, id: NodeId, out: &mut Vec<&'a K>) {
            let node = nodes.node(id);
            if node.is_leaf() {
                out.extend(node.keys.iter());
                return;
            }
            for (i, &child) in node.children.iter().enumerate() {
                walk(nodes, child, out);
                if let Some(key) = node.keys.get(i) {
                    out.push(key);
                }
            }
        }

        let mut out = Vec::with_capacity(self.count);
        if let Some(root) = self.root {
            walk(&self.nodes, root, &mut out);
        }
        out
    }
}

impl<K: Ord + 'static, const M: usize> Default for BTree<K, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, const M: usize> Drop for BTree<K, M> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: fmt::Debug, const M: usize> fmt::Debug for BTree<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys_in_order()).finish()
    }
}


#[cfg(test)]
mod proptests;
