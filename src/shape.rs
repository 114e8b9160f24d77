//! Shape diagnostics.
//!
//! Both queries follow only the leftmost and rightmost children of each node.
//! That is enough because every leaf sits at the same depth.

use crate::node::NodeId;
use crate::BTree;

impl<K, const M: usize> BTree<K, M> {
    /// Number of levels; 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root| self.spine_height(root))
    }

    /// Longest node path through the outer spines: the best
    /// `left height + right height + 1` over the nodes visited.
    pub fn diameter(&self) -> usize {
        let mut best = 0;
        if let Some(root) = self.root {
            self.spine_diameter(root, &mut best);
        }
        best
    }

    fn spine_height(&self, id: NodeId) -> usize {
        let node = self.nodes.node(id);
        match (node.children.first(), node.children.last()) {
            (Some(&left), Some(&right)) => {
                1 + self.spine_height(left).max(self.spine_height(right))
            }
            _ => 1,
        }
    }

    /// Returns the spine height of `id`, updating `best` on the way.
    fn spine_diameter(&self, id: NodeId, best: &mut usize) -> usize {
        let node = self.nodes.node(id);
        let (left, right) = match (node.children.first(), node.children.last()) {
            (Some(&l), Some(&r)) => (self.spine_diameter(l, best), self.spine_diameter(r, best)),
            _ => (0, 0),
        };
        *best = (*best).max(left + right + 1);
        1 + left.max(right)
    }
}
