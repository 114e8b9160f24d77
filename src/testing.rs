//! Shared helpers for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{BTree, Config, NodeId};

/// Installs a fmt subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A self-checking `u32` tree whose destructor records every key it receives.
pub(crate) fn tracked<const M: usize>() -> (BTree<u32, M>, Rc<RefCell<Vec<u32>>>) {
    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&destroyed);
    let tree: BTree<u32, M> = BTree::with_config(
        u32::cmp,
        move |key| sink.borrow_mut().push(key),
        Config::default().with_invariant_checks(true),
    );
    (tree, destroyed)
}

/// Node keys level by level, left to right.
pub(crate) fn levels<K: Clone, const M: usize>(t: &BTree<K, M>) -> Vec<Vec<Vec<K>>> {
    let mut out = Vec::new();
    let mut level: Vec<NodeId> = t.root.into_iter().collect();
    while !level.is_empty() {
        out.push(
            level
                .iter()
                .map(|&id| t.nodes.node(id).keys.clone())
                .collect(),
        );
        level = level
            .iter()
            .flat_map(|&id| t.nodes.node(id).children.iter().copied())
            .collect();
    }
    out
}
