use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u16..512")] u16),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0u16..512")] u16),
    #[proptest(weight = 1)]
    RemoveArbitrary,
    #[proptest(weight = 1)]
    Contains(#[proptest(strategy = "0u16..512")] u16),
}

fn tracked_tree<const M: usize>() -> (BTree<u16, M>, Rc<RefCell<Vec<u16>>>) {
    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&destroyed);
    let tree: BTree<u16, M> = BTree::with_comparator(u16::cmp, move |k| sink.borrow_mut().push(k));
    (tree, destroyed)
}

fn keys<const M: usize>(t: &BTree<u16, M>) -> Vec<u16> {
    t.keys_in_order().into_iter().copied().collect()
}

/// Applies `ops` to a tree and to a `BTreeSet`, checking they agree and that
/// the tree is valid after every step.
fn run_model<const M: usize>(ops: Vec<Op>) -> std::result::Result<(), TestCaseError> {
    let (mut t, destroyed) = tracked_tree::<M>();
    let mut m: BTreeSet<u16> = BTreeSet::new();
    let mut evicted: Vec<u16> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(k) => {
                let height = t.height();
                let fresh = m.insert(k);
                prop_assert_eq!(t.try_insert(k).is_ok(), fresh);
                if !fresh {
                    prop_assert_eq!(t.height(), height);
                }
            }
            Op::Remove(k) => {
                let present = m.remove(&k);
                prop_assert_eq!(t.remove(&k), present);
                if present {
                    evicted.push(k);
                }
            }
            Op::RemoveArbitrary => {
                let root_last = t
                    .root
                    .and_then(|root| t.nodes.node(root).keys.last().copied());
                prop_assert_eq!(t.remove_arbitrary(), root_last.is_some());
                if let Some(k) = root_last {
                    prop_assert!(m.remove(&k));
                    evicted.push(k);
                }
            }
            Op::Contains(k) => {
                prop_assert_eq!(t.contains(&k), m.contains(&k));
            }
        }

        prop_assert_eq!(t.len(), m.len());
        if let Err(err) = t.validate() {
            return Err(TestCaseError::fail(err.to_string()));
        }
    }

    prop_assert_eq!(keys(&t), m.iter().copied().collect::<Vec<_>>());
    prop_assert_eq!(&*destroyed.borrow(), &evicted);

    let remaining = t.len();
    drop(t);
    prop_assert_eq!(destroyed.borrow().len(), evicted.len() + remaining);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_model_order_3(ops in prop::collection::vec(any::<Op>(), 0..=600)) {
        run_model::<3>(ops)?;
    }

    #[test]
    fn prop_model_order_2(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        run_model::<2>(ops)?;
    }

    #[test]
    fn prop_model_order_6(ops in prop::collection::vec(any::<Op>(), 0..=600)) {
        run_model::<6>(ops)?;
    }

    #[test]
    fn prop_duplicate_insert_keeps_shape(
        keys in prop::collection::btree_set(0u16..1000, 1..200),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut t, _) = tracked_tree::<3>();
        for &k in &keys {
            t.insert(k);
        }
        let dup = *pick.get(&keys.iter().copied().collect::<Vec<_>>());
        let before = (t.len(), t.node_count(), t.height(), t.diameter());
        prop_assert_eq!(t.try_insert(dup), Err(BTreeError::DuplicateKey));
        t.insert(dup);
        prop_assert_eq!((t.len(), t.node_count(), t.height(), t.diameter()), before);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u16> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let (mut t, destroyed) = tracked_tree::<3>();
        for k in perm {
            t.insert(k);
            t.validate().unwrap();
        }
        assert_eq!(self::keys(&t), keys);
        assert!(destroyed.borrow().is_empty());
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u16> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let (mut t, destroyed) = tracked_tree::<3>();
        for &k in &keys {
            t.insert(k);
        }

        for k in perm.iter() {
            assert!(t.remove(k));
            t.validate().unwrap();
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.node_count(), 0);
        assert!(t.root.is_none());
        assert_eq!(*destroyed.borrow(), perm);
    });
}
