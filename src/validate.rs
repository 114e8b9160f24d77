//! Structural self-check.

use std::cmp::Ordering;

use crate::error::{BTreeError, Result};
use crate::node::NodeId;
use crate::BTree;

fn violation<T>(msg: String) -> Result<T> {
    Err(BTreeError::InvariantViolation(msg))
}

#[derive(Default)]
struct Walk {
    keys: usize,
    nodes: usize,
    leaf_depth: Option<usize>,
}

impl<K, const M: usize> BTree<K, M> {
    /// Checks ordering, occupancy, child counts, leaf depth and the key and
    /// node counters.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.count != 0 || self.nodes.live() != 0 {
                return violation(format!(
                    "empty tree reports {} keys in {} nodes",
                    self.count,
                    self.nodes.live()
                ));
            }
            return Ok(());
        };

        let mut walk = Walk::default();
        self.validate_node(root, 0, None, None, &mut walk)?;

        if walk.keys != self.count {
            return violation(format!("{} reachable keys, len() is {}", walk.keys, self.count));
        }
        if walk.nodes != self.nodes.live() {
            return violation(format!(
                "{} reachable nodes, {} allocated",
                walk.nodes,
                self.nodes.live()
            ));
        }
        Ok(())
    }

    fn validate_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        walk: &mut Walk,
    ) -> Result<()> {
        let node = self.nodes.node(id);
        let n = node.len();
        walk.keys += n;
        walk.nodes += 1;

        if n > M {
            return violation(format!("{id:?} holds {n} keys, max is {M}"));
        }
        if depth == 0 && n == 0 {
            return violation("root holds no keys".to_string());
        }
        if depth > 0 && n < Self::MIN_KEYS {
            return violation(format!(
                "{id:?} at depth {depth} holds {n} keys, min is {}",
                Self::MIN_KEYS
            ));
        }

        for (i, pair) in node.keys.windows(2).enumerate() {
            if self.compare_keys(&pair[0], &pair[1]) != Ordering::Less {
                return violation(format!("{id:?} keys {i} and {} out of order", i + 1));
            }
        }
        if let (Some(lower), Some(first)) = (lower, node.keys.first()) {
            if self.compare_keys(lower, first) != Ordering::Less {
                return violation(format!("{id:?} first key not above parent separator"));
            }
        }
        if let (Some(upper), Some(last)) = (upper, node.keys.last()) {
            if self.compare_keys(last, upper) != Ordering::Less {
                return violation(format!("{id:?} last key not below parent separator"));
            }
        }

        if node.is_leaf() {
            match walk.leaf_depth {
                None => walk.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return violation(format!(
                        "leaf {id:?} at depth {depth}, other leaves at {expected}"
                    ));
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if node.children.len() != n + 1 {
            return violation(format!(
                "{id:?} has {n} keys but {} children",
                node.children.len()
            ));
        }
        for (i, &child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { node.keys.get(i - 1) };
            let hi = if i == n { upper } else { node.keys.get(i) };
            self.validate_node(child, depth + 1, lo, hi, walk)?;
        }
        Ok(())
    }
}
