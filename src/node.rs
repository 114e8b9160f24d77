//! Node store: fixed-capacity nodes kept in an index-stable arena.

use tracing::warn;

use crate::error::{BTreeError, Result};

/// Handle to a node inside a tree's arena.
///
/// Handles are only meaningful for the tree that issued them and are
/// invalidated by any mutation of that tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const MAX_INDEX: usize = u32::MAX as usize;

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A B-tree node.
///
/// Keys are packed and strictly ascending. A leaf has no children; an
/// internal node with `k` keys has `k + 1` children. Buffers are reserved
/// one slot past the node's maximum so that a node can overflow by one key
/// before it is split.
pub(crate) struct Node<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
}

impl<K> Node<K> {
    fn try_with_capacity(key_capacity: usize) -> Option<Self> {
        let mut keys = Vec::new();
        keys.try_reserve_exact(key_capacity).ok()?;
        let mut children = Vec::new();
        children.try_reserve_exact(key_capacity + 1).ok()?;
        Some(Self { keys, children })
    }

    fn with_capacity(key_capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(key_capacity),
            children: Vec::with_capacity(key_capacity + 1),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Removes the last key together with the last child, if any.
    pub(crate) fn pop_back(&mut self) -> (K, Option<NodeId>) {
        let key = self.keys.remove(self.keys.len() - 1);
        (key, self.children.pop())
    }

    /// Removes the first key together with the first child, if any.
    pub(crate) fn pop_front(&mut self) -> (K, Option<NodeId>) {
        let key = self.keys.remove(0);
        let child = (!self.children.is_empty()).then(|| self.children.remove(0));
        (key, child)
    }

    pub(crate) fn push_front(&mut self, key: K, child: Option<NodeId>) {
        self.keys.insert(0, key);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    pub(crate) fn push_back(&mut self, key: K, child: Option<NodeId>) {
        self.keys.push(key);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    fn capacity_bytes(&self) -> usize {
        self.keys.capacity() * std::mem::size_of::<K>()
            + self.children.capacity() * std::mem::size_of::<NodeId>()
    }
}

/// Arena of nodes with a free list of recycled slots.
///
/// Freed nodes keep their buffers, so a slot taken from the free list never
/// touches the allocator. [`NodeArena::try_reserve`] fills the free list
/// ahead of a mutation; this is how allocation failure is detected before
/// the tree is modified.
pub(crate) struct NodeArena<K> {
    nodes: Vec<Node<K>>,
    free: Vec<NodeId>,
    key_capacity: usize,
}

impl<K> NodeArena<K> {
    pub(crate) fn new(key_capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            key_capacity,
        }
    }

    pub(crate) fn with_capacity(initial_nodes: usize, key_capacity: usize) -> Self {
        let mut arena = Self::new(key_capacity);
        if let Err(err) = arena.try_reserve(initial_nodes) {
            warn!(initial_nodes, %err, "could not preallocate node arena");
        }
        arena
    }

    /// Number of nodes currently linked into the tree.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Ensures the next `additional` allocations are served from the free list.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let missing = additional.saturating_sub(self.free.len());
        if missing == 0 {
            return Ok(());
        }

        let live = self.live();
        let exhausted = move || BTreeError::ResourceExhaustion {
            requested: additional,
            live,
        };

        if self.nodes.len() + missing > NodeId::MAX_INDEX {
            return Err(exhausted());
        }
        self.nodes.try_reserve(missing).map_err(|_| exhausted())?;
        self.free
            .try_reserve(self.nodes.len() + missing - self.free.len())
            .map_err(|_| exhausted())?;

        for _ in 0..missing {
            let node = Node::try_with_capacity(self.key_capacity).ok_or_else(exhausted)?;
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(node);
            self.free.push(id);
        }
        Ok(())
    }

    /// Takes an empty node from the free list, growing the arena if it is empty.
    pub(crate) fn alloc(&mut self) -> NodeId {
        if let Some(id) = self.free.pop() {
            debug_assert!(self.node(id).keys.is_empty() && self.node(id).children.is_empty());
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::with_capacity(self.key_capacity));
        id
    }

    pub(crate) fn alloc_leaf(&mut self, key: K) -> NodeId {
        let id = self.alloc();
        self.node_mut(id).keys.push(key);
        id
    }

    /// A 1-key internal node linking two children; used for a new root.
    pub(crate) fn alloc_root(&mut self, key: K, left: NodeId, right: NodeId) -> NodeId {
        let id = self.alloc();
        let node = self.node_mut(id);
        node.keys.push(key);
        node.children.push(left);
        node.children.push(right);
        id
    }

    /// Returns an emptied node to the free list.
    pub(crate) fn free(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        debug_assert!(node.keys.is_empty(), "freed node still holds keys");
        node.keys.clear();
        node.children.clear();
        self.free.push(id);
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id.index())
    }

    /// Mutable access to two distinct nodes at once.
    pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<K>, &mut Node<K>) {
        let (ia, ib) = (a.index(), b.index());
        assert_ne!(ia, ib, "pair_mut on a single node");
        if ia < ib {
            let (lo, hi) = self.nodes.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = self.nodes.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        }
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node<K>>()
            + self.nodes.iter().map(Node::capacity_bytes).sum::<usize>()
            + self.free.capacity() * std::mem::size_of::<NodeId>()
    }
}
