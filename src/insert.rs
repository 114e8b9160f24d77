//! Insertion: leaf insert followed by bottom-up split-and-promote.

use tracing::{debug, trace, warn};

use crate::error::{BTreeError, Result};
use crate::node::NodeId;
use crate::search::{Descent, Frame};
use crate::BTree;

impl<K, const M: usize> BTree<K, M> {
    /// Inserts `key`. A key equal to one already present is ignored.
    pub fn insert(&mut self, key: K) {
        match self.try_insert(key) {
            Ok(()) => {}
            Err(BTreeError::DuplicateKey) => trace!("duplicate key ignored"),
            Err(err) => warn!(%err, "insert abandoned"),
        }
    }

    /// Inserts `key`, reporting duplicates and allocation failure.
    ///
    /// On error the tree is left exactly as it was and `key` is dropped
    /// without reaching the destructor.
    pub fn try_insert(&mut self, key: K) -> Result<()> {
        let Some(descent) = self.descend(&key) else {
            self.reserve_nodes(1)?;
            self.root = Some(self.nodes.alloc_leaf(key));
            self.count += 1;
            debug!("root leaf created");
            self.after_mutation();
            return Ok(());
        };

        let Descent { path, node, result } = descent;
        let slot = match result {
            Ok(_) => return Err(BTreeError::DuplicateKey),
            Err(slot) => slot,
        };

        // All allocation happens up front so a failure cannot leave a half-split tree.
        self.reserve_nodes(self.nodes_needed(&path, node))?;

        self.nodes.node_mut(node).keys.insert(slot, key);
        self.count += 1;
        self.split_upward(path, node);
        self.after_mutation();
        Ok(())
    }

    /// Nodes an insertion into `leaf` will allocate: one per full node on the
    /// way up, plus a new root if the root itself splits.
    fn nodes_needed(&self, path: &[Frame], leaf: NodeId) -> usize {
        let spine = std::iter::once(leaf).chain(path.iter().rev().map(|frame| frame.node));
        let mut needed = 0;
        for id in spine {
            if self.nodes.node(id).len() < M {
                return needed;
            }
            needed += 1;
        }
        needed + 1
    }

    fn reserve_nodes(&mut self, needed: usize) -> Result<()> {
        if needed == 0 {
            return Ok(());
        }
        let live = self.nodes.live();
        if let Some(max) = self.config.max_nodes {
            if live + needed > max {
                return Err(BTreeError::ResourceExhaustion {
                    requested: needed,
                    live,
                });
            }
        }
        self.nodes.try_reserve(needed)
    }

    /// Splits overflowing nodes from `id` towards the root.
    fn split_upward(&mut self, mut path: Vec<Frame>, mut id: NodeId) {
        while self.nodes.node(id).len() > M {
            let (median, sibling) = self.split(id);
            match path.pop() {
                Some(Frame { node: parent, child }) => {
                    let parent_node = self.nodes.node_mut(parent);
                    parent_node.keys.insert(child, median);
                    parent_node.children.insert(child + 1, sibling);
                    id = parent;
                }
                None => {
                    self.root = Some(self.nodes.alloc_root(median, id, sibling));
                    debug!(height = self.height(), "root split");
                    return;
                }
            }
        }
    }

    /// Moves the upper half of an overflowing node into a new right sibling
    /// and returns the median key with the sibling.
    fn split(&mut self, id: NodeId) -> (K, NodeId) {
        let mid = (M + 1) / 2;
        let sibling = self.nodes.alloc();
        let (node, right) = self.nodes.pair_mut(id, sibling);
        debug_assert_eq!(node.len(), M + 1);

        right.keys.extend(node.keys.drain(mid + 1..));
        if !node.is_leaf() {
            right.children.extend(node.children.drain(mid + 1..));
        }
        let median = node.keys.remove(mid);
        trace!(left = node.len(), right = right.len(), "node split");
        (median, sibling)
    }
}
