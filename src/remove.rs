//! Deletion and rebalancing.
//!
//! A key is removed from its leaf directly, or from an internal node by
//! swapping in its in-order successor from the leftmost leaf of the right
//! subtree. Either way a leaf loses one key, and the ancestor path collected
//! on the way down is then walked back up. Each deficient node is repaired
//! with the first applicable `Rebalance` step; the decision is made by
//! `plan_rebalance` from occupancy alone, then carried out by
//! `apply_rebalance`.

use tracing::{debug, trace};

use crate::error::{BTreeError, Result};
use crate::node::NodeId;
use crate::search::{Descent, Frame};
use crate::BTree;

/// How a deficient node is repaired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rebalance {
    /// The node holds enough keys.
    Keep,
    /// Rotate one key through the parent from the left sibling.
    BorrowLeft,
    /// Rotate one key through the parent from the right sibling.
    BorrowRight,
    /// Fold the node and its separator into the left sibling.
    MergeLeft,
    /// Fold the separator and the right sibling into the node.
    MergeRight,
}

/// Chooses the repair for a node holding `len` keys whose siblings hold
/// `left` and `right` keys. Borrowing is preferred to merging, left to right.
pub(crate) fn plan_rebalance(
    len: usize,
    left: Option<usize>,
    right: Option<usize>,
    min: usize,
) -> Rebalance {
    if len >= min {
        return Rebalance::Keep;
    }
    match (left, right) {
        (Some(l), _) if l > min => Rebalance::BorrowLeft,
        (_, Some(r)) if r > min => Rebalance::BorrowRight,
        (Some(_), _) => Rebalance::MergeLeft,
        (None, Some(_)) => Rebalance::MergeRight,
        // Only the root has no siblings.
        (None, None) => Rebalance::Keep,
    }
}

impl<K, const M: usize> BTree<K, M> {
    /// Removes `key`, handing it to the destructor. Returns `false` if the key
    /// is absent.
    pub fn remove(&mut self, key: &K) -> bool {
        self.try_remove(key).is_ok()
    }

    pub fn try_remove(&mut self, key: &K) -> Result<()> {
        match self.descend(key) {
            Some(Descent {
                path,
                node,
                result: Ok(slot),
            }) => {
                self.remove_at(path, node, slot);
                Ok(())
            }
            _ => Err(BTreeError::KeyNotFound),
        }
    }

    /// Removes the rightmost key of the root node. This is whichever key
    /// happens to sit there, not necessarily the maximum. Returns `false` on
    /// an empty tree.
    pub fn remove_arbitrary(&mut self) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let Some(slot) = self.nodes.node(root).len().checked_sub(1) else {
            return false;
        };
        self.remove_at(Vec::new(), root, slot);
        true
    }

    fn remove_at(&mut self, mut path: Vec<Frame>, id: NodeId, slot: usize) {
        let (key, leaf) = if self.nodes.node(id).is_leaf() {
            (self.nodes.node_mut(id).keys.remove(slot), id)
        } else {
            path.push(Frame {
                node: id,
                child: slot + 1,
            });
            let mut leaf = self.nodes.node(id).children[slot + 1];
            while let Some(&child) = self.nodes.node(leaf).children.first() {
                path.push(Frame { node: leaf, child: 0 });
                leaf = child;
            }
            let successor = self.nodes.node_mut(leaf).keys.remove(0);
            let key = std::mem::replace(&mut self.nodes.node_mut(id).keys[slot], successor);
            (key, leaf)
        };

        self.count -= 1;
        self.rebalance(path, leaf);
        (self.destroy)(key);
        self.after_mutation();
    }

    /// Repairs deficient nodes from `id` up the recorded path, then collapses
    /// an empty root.
    fn rebalance(&mut self, mut path: Vec<Frame>, mut id: NodeId) {
        while let Some(Frame { node: parent, child }) = path.pop() {
            let action = self.plan_at(parent, child);
            if action == Rebalance::Keep {
                break;
            }
            debug_assert_eq!(self.nodes.node(parent).children[child], id);
            self.apply_rebalance(action, parent, child);
            trace!(?action, depth = path.len() + 1, "rebalanced");
            id = parent;
        }
        self.collapse_root();
    }

    fn plan_at(&self, parent: NodeId, child: usize) -> Rebalance {
        let siblings = &self.nodes.node(parent).children;
        let len_of = |id: &NodeId| self.nodes.node(*id).len();
        plan_rebalance(
            self.nodes.node(siblings[child]).len(),
            child.checked_sub(1).map(|i| len_of(&siblings[i])),
            siblings.get(child + 1).map(len_of),
            Self::MIN_KEYS,
        )
    }

    /// Carries out `action` on the `child`-th child of `parent`.
    pub(crate) fn apply_rebalance(&mut self, action: Rebalance, parent: NodeId, child: usize) {
        let node = self.nodes.node(parent).children[child];
        match action {
            Rebalance::Keep => {}
            Rebalance::BorrowLeft => {
                let left = self.nodes.node(parent).children[child - 1];
                let (up, moved) = self.nodes.node_mut(left).pop_back();
                let down = std::mem::replace(&mut self.nodes.node_mut(parent).keys[child - 1], up);
                self.nodes.node_mut(node).push_front(down, moved);
            }
            Rebalance::BorrowRight => {
                let right = self.nodes.node(parent).children[child + 1];
                let (up, moved) = self.nodes.node_mut(right).pop_front();
                let down = std::mem::replace(&mut self.nodes.node_mut(parent).keys[child], up);
                self.nodes.node_mut(node).push_back(down, moved);
            }
            Rebalance::MergeLeft => {
                let left = self.nodes.node(parent).children[child - 1];
                self.merge(parent, child - 1, left, node);
            }
            Rebalance::MergeRight => {
                let right = self.nodes.node(parent).children[child + 1];
                self.merge(parent, child, node, right);
            }
        }
    }

    /// Folds `right` and the parent key separating it from `left` into
    /// `left`, then frees `right`.
    fn merge(&mut self, parent: NodeId, separator: usize, left: NodeId, right: NodeId) {
        let parent_node = self.nodes.node_mut(parent);
        let key = parent_node.keys.remove(separator);
        parent_node.children.remove(separator + 1);

        let (l, r) = self.nodes.pair_mut(left, right);
        l.keys.push(key);
        l.keys.append(&mut r.keys);
        l.children.append(&mut r.children);
        debug_assert!(l.len() <= M);
        self.nodes.free(right);
    }

    /// Replaces a root left without keys by its only child, or empties the
    /// tree if the root was a leaf.
    fn collapse_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let node = self.nodes.node(root);
        if !node.keys.is_empty() {
            return;
        }
        debug_assert!(node.children.len() <= 1);
        self.root = node.children.first().copied();
        self.nodes.free(root);
        debug!(height = self.height(), "root collapsed");
    }
}
