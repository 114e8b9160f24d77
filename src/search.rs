//! Membership lookup and the shared root-to-node descent.

use crate::node::NodeId;
use crate::BTree;

/// Where a key lives: the owning node and the key's slot in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    node: NodeId,
    slot: usize,
}

impl Location {
    pub fn node(self) -> NodeId {
        self.node
    }

    pub fn slot(self) -> usize {
        self.slot
    }
}

/// A step of a descent: a node and the child index taken from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) node: NodeId,
    pub(crate) child: usize,
}

/// Result of walking from the root towards a key.
pub(crate) struct Descent {
    /// Ancestors of `node`, root first.
    pub(crate) path: Vec<Frame>,
    pub(crate) node: NodeId,
    /// `Ok(slot)` when `node` holds the key, otherwise the insertion slot in
    /// the leaf where the search ended.
    pub(crate) result: Result<usize, usize>,
}

impl<K, const M: usize> BTree<K, M> {
    /// Binary search within one node. `Err(i)` is the first slot whose key is
    /// greater than `key`, which is also the child to descend into.
    #[inline]
    pub(crate) fn search_node(&self, id: NodeId, key: &K) -> Result<usize, usize> {
        self.nodes
            .node(id)
            .keys
            .binary_search_by(|probe| self.compare_keys(probe, key))
    }

    /// Follows one root-to-leaf path, stopping early on an exact match.
    pub(crate) fn descend(&self, key: &K) -> Option<Descent> {
        let mut id = self.root?;
        let mut path = Vec::new();
        loop {
            let result = self.search_node(id, key);
            let node = self.nodes.node(id);
            match result {
                Err(child) if !node.is_leaf() => {
                    path.push(Frame { node: id, child });
                    id = node.children[child];
                }
                _ => {
                    return Some(Descent {
                        path,
                        node: id,
                        result,
                    })
                }
            }
        }
    }

    /// Finds the node and slot holding `key`.
    pub fn locate(&self, key: &K) -> Option<Location> {
        let descent = self.descend(key)?;
        let slot = descent.result.ok()?;
        Some(Location {
            node: descent.node,
            slot,
        })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// The stored key comparing equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.locate(key).and_then(|loc| self.key_at(loc))
    }

    /// The key at `location`, if the location is still in range.
    pub fn key_at(&self, location: Location) -> Option<&K> {
        self.nodes.get(location.node)?.keys.get(location.slot)
    }

    /// Smallest key: the end of the leftmost spine.
    pub fn first(&self) -> Option<&K> {
        let mut node = self.nodes.node(self.root?);
        while let Some(&child) = node.children.first() {
            node = self.nodes.node(child);
        }
        node.keys.first()
    }

    /// Largest key: the end of the rightmost spine.
    pub fn last(&self) -> Option<&K> {
        let mut node = self.nodes.node(self.root?);
        while let Some(&child) = node.children.last() {
            node = self.nodes.node(child);
        }
        node.keys.last()
    }
}
