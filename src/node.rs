use std::rc::Rc;

use crate::hasher::{Digest, Hasher};
use crate::{Key, Value};

/// A height-0 node holding a key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Leaf {
    pub(crate) key: Key,
    pub(crate) value: Value,
    pub(crate) key_hash: Digest,
}

/// A height-\>=1 routing node with exactly two children (I6).
#[derive(Debug, Clone)]
pub(crate) struct Inner {
    pub(crate) left: Rc<Node>,
    pub(crate) right: Rc<Node>,
    pub(crate) search_key: Key,
    pub(crate) key_hash: Digest,
    pub(crate) height: u32,
}

/// A node of the tree: a leaf or an inner routing node sharing a common
/// header of `key_hash` / `search_key` / `height` (I1-I7).
///
/// Nodes are immutable; every mutation builds new nodes along the
/// affected root-to-leaf path and shares the rest via `Rc`, giving every
/// prior tree value a consistent, independently readable snapshot.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf(Leaf),
    Inner(Inner),
}

impl Node {
    pub(crate) fn leaf(key: Key, value: Value, hasher: &Hasher) -> Rc<Node> {
        let key_hash = hasher.hash(&key);

        Rc::new(Node::Leaf(Leaf {
            key,
            value,
            key_hash,
        }))
    }

    pub(crate) fn height(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Inner(i) => i.height,
        }
    }

    pub(crate) fn key_hash(&self) -> &str {
        match self {
            Node::Leaf(l) => &l.key_hash,
            Node::Inner(i) => &i.key_hash,
        }
    }

    pub(crate) fn as_inner(&self) -> Option<&Inner> {
        match self {
            Node::Leaf(_) => None,
            Node::Inner(i) => Some(i),
        }
    }

    /// The maximum leaf key anywhere in this subtree (not to be confused
    /// with `search_key`, which is only the max of the *left* half of an
    /// inner node).
    pub(crate) fn subtree_max_key(&self) -> &Key {
        match self {
            Node::Leaf(l) => &l.key,
            Node::Inner(i) => i.right.subtree_max_key(),
        }
    }
}

/// The Merkle updater (C5): rebuilds an inner node's `key_hash` and
/// `height` from its current children. Used as the finalizer on every
/// node produced by insert, delete, and each side of a rotation, fusing
/// the balance pass and the hash pass into a single traversal (see the
/// design notes on rotation + rehash coupling).
pub(crate) fn build_inner(left: Rc<Node>, right: Rc<Node>, search_key: Key, hasher: &Hasher) -> Inner {
    let key_hash = hasher.concat(left.key_hash(), right.key_hash());
    let height = 1 + left.height().max(right.height());

    Inner {
        left,
        right,
        search_key,
        key_hash,
        height,
    }
}

pub(crate) fn finalize_inner(
    left: Rc<Node>,
    right: Rc<Node>,
    search_key: Key,
    hasher: &Hasher,
) -> Rc<Node> {
    Rc::new(Node::Inner(build_inner(left, right, search_key, hasher)))
}
