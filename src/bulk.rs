use std::rc::Rc;

use crate::hasher::Hasher;
use crate::node::{build_inner, Node};
use crate::tree::Tree;
use crate::{Error, Key, Value};

/// Builds a perfectly balanced tree from `pairs` in a single post-order
/// pass (C6), rejecting duplicate keys (bulk build assumes a fresh
/// dataset, unlike `insert`, which updates in place — see the design
/// notes on why the two diverge).
pub(crate) fn build(mut pairs: Vec<(Key, Value)>, hasher: &Hasher) -> Result<Tree, Error> {
    tracing::debug!(pairs = pairs.len(), "bulk building tree");

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    for w in pairs.windows(2) {
        if w[0].0 == w[1].0 {
            return Err(Error::DuplicateKey {
                key: w[0].0.clone(),
            });
        }
    }

    let size = pairs.len();
    let root = if pairs.is_empty() {
        None
    } else {
        Some(build_range(&pairs, hasher))
    };

    Ok(Tree::from_parts(size, root, hasher.clone()))
}

/// Recursively splits `range` at its midpoint, producing a leaf for a
/// single-element range and an inner node whose search key is the
/// maximum key of its (left) half otherwise.
fn build_range(range: &[(Key, Value)], hasher: &Hasher) -> Rc<Node> {
    if range.len() == 1 {
        let (key, value) = range[0].clone();
        return Node::leaf(key, value, hasher);
    }

    let pivot = range.len() / 2;
    let (left_range, right_range) = range.split_at(pivot);

    let left = build_range(left_range, hasher);
    let right = build_range(right_range, hasher);
    let search_key = left_range
        .last()
        .expect("left half of a >=2 element range is never empty")
        .0
        .clone();

    Rc::new(Node::Inner(build_inner(left, right, search_key, hasher)))
}
