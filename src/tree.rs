use std::rc::Rc;

use crate::avl::rebalance;
use crate::hasher::Hasher;
use crate::node::{build_inner, finalize_inner, Node};
use crate::{Error, Key, Value};

/// An ordered, self-balancing AVL key/value tree whose root hash commits
/// to its full contents.
///
/// `Tree` is a plain value: every mutation returns a new `Tree`, and any
/// previously obtained `Tree` remains a valid, independently readable
/// snapshot (subtrees untouched by a mutation are shared, not copied).
#[derive(Debug, Clone)]
pub struct Tree {
    size: usize,
    root: Option<Rc<Node>>,
    hasher: Hasher,
}

enum Grown {
    Inserted(Rc<Node>),
    Replaced(Rc<Node>),
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty tree, hashed with the default algorithm ([`crate::HashAlgorithm::Sha256`]).
    pub fn new() -> Self {
        Self::new_with_hasher(Hasher::default())
    }

    /// An empty tree hashed with the given [`Hasher`].
    pub fn new_with_hasher(hasher: Hasher) -> Self {
        Self {
            size: 0,
            root: None,
            hasher,
        }
    }

    /// Builds a tree from `pairs` in `O(n)` post-build hashing (C6),
    /// using the default hasher. Duplicate keys are rejected.
    pub fn new_from_pairs<K, V, I>(pairs: I) -> Result<Self, Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new_from_pairs_with_hasher(pairs, Hasher::default())
    }

    /// As [`Tree::new_from_pairs`], with an explicit [`Hasher`].
    pub fn new_from_pairs_with_hasher<K, V, I>(pairs: I, hasher: Hasher) -> Result<Self, Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_vec(), v.as_ref().to_vec()))
            .collect();

        crate::bulk::build(pairs, &hasher)
    }

    pub(crate) fn from_parts(size: usize, root: Option<Rc<Node>>, hasher: Hasher) -> Self {
        Self { size, root, hasher }
    }

    pub(crate) fn root_node(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// The [`Hasher`] this tree was constructed with.
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// The number of leaves in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The root's `key_hash`, or `None` for an empty tree.
    pub fn root_hash(&self) -> Option<&str> {
        self.root.as_deref().map(Node::key_hash)
    }

    /// The keys in the tree, in in-order traversal order.
    ///
    /// Since the BST property (I1) holds after every public operation,
    /// this traversal always comes out sorted; callers that only care
    /// about the set of keys should still prefer comparing as a set, since
    /// that is the only guarantee spelled out for implementations that
    /// choose a different in-order strategy.
    pub fn keys(&self) -> Vec<Key> {
        let mut out = Vec::with_capacity(self.size);

        if let Some(root) = &self.root {
            collect_keys(root, &mut out);
        }

        out
    }

    /// Looks up the value associated with `key`.
    pub fn lookup<K: AsRef<[u8]>>(&self, key: K) -> Result<&Value, Error> {
        let key = key.as_ref();

        self.root
            .as_deref()
            .and_then(|root| lookup_node(root, key))
            .ok_or_else(|| Error::KeyNotFound { key: key.to_vec() })
    }

    /// Inserts or updates `key` with `value`.
    ///
    /// If `key` already exists, its value is replaced in place (no
    /// structural change, since node hashes depend only on keys). If
    /// `key` is new, a leaf is inserted and the tree is rebalanced and
    /// rehashed along the ancestor path.
    pub fn insert<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let key = key.as_ref().to_vec();
        let value = value.as_ref().to_vec();

        tracing::debug!(key = %String::from_utf8_lossy(&key), "inserting key");

        let grown = match &self.root {
            None => Grown::Inserted(Node::leaf(key, value, &self.hasher)),
            Some(root) => insert_node(root, key, value, &self.hasher),
        };

        match grown {
            Grown::Inserted(root) => {
                self.size += 1;
                self.root = Some(root);
            }
            Grown::Replaced(root) => {
                self.root = Some(root);
            }
        }

        self
    }

    /// Removes `key`.
    ///
    /// Removing a leaf also removes its parent inner node (I6 forbids a
    /// one-child inner node); the deleted leaf's sibling is promoted into
    /// the grandparent's slot. No rotation is performed (§4.3); only
    /// heights, hashes, and affected `search_key`s are recomputed on the
    /// way back up.
    pub fn delete<K: AsRef<[u8]>>(mut self, key: K) -> Result<Self, Error> {
        let key = key.as_ref();

        tracing::debug!(key = %String::from_utf8_lossy(key), "deleting key");

        let root = self
            .root
            .as_ref()
            .ok_or_else(|| Error::KeyNotFound { key: key.to_vec() })?;

        let mut predecessor: Option<Key> = None;

        match delete_node(root, key, &self.hasher, &mut predecessor)? {
            DeleteStep::Removed => {
                self.root = None;
            }
            DeleteStep::Updated(new_root) => {
                self.root = Some(new_root);
            }
        }

        self.size -= 1;

        Ok(self)
    }
}

fn collect_keys(node: &Node, out: &mut Vec<Key>) {
    match node {
        Node::Leaf(l) => out.push(l.key.clone()),
        Node::Inner(i) => {
            collect_keys(&i.left, out);
            collect_keys(&i.right, out);
        }
    }
}

fn lookup_node<'a>(node: &'a Node, key: &[u8]) -> Option<&'a Value> {
    match node {
        Node::Leaf(l) => (l.key == key).then_some(&l.value),
        Node::Inner(i) => {
            if key <= i.search_key.as_slice() {
                lookup_node(&i.left, key)
            } else {
                lookup_node(&i.right, key)
            }
        }
    }
}

fn insert_node(node: &Rc<Node>, key: Key, value: Value, hasher: &Hasher) -> Grown {
    match node.as_ref() {
        Node::Leaf(leaf) => {
            if leaf.key == key {
                return Grown::Replaced(Node::leaf(key, value, hasher));
            }

            let new_leaf = Node::leaf(key.clone(), value, hasher);
            let (left, right, search_key) = if key < leaf.key {
                (new_leaf, node.clone(), key)
            } else {
                (node.clone(), new_leaf, leaf.key.clone())
            };

            Grown::Inserted(finalize_inner(left, right, search_key, hasher))
        }
        Node::Inner(inner) => {
            let go_left = key.as_slice() <= inner.search_key.as_slice();
            let child = if go_left { &inner.left } else { &inner.right };

            match insert_node(child, key, value, hasher) {
                Grown::Replaced(new_child) => {
                    let (left, right) = if go_left {
                        (new_child, inner.right.clone())
                    } else {
                        (inner.left.clone(), new_child)
                    };

                    // search_key and height are unchanged: only a leaf's
                    // value changed, and key_hash depends only on keys.
                    Grown::Replaced(finalize_inner(
                        left,
                        right,
                        inner.search_key.clone(),
                        hasher,
                    ))
                }
                Grown::Inserted(new_child) => {
                    let (left, right) = if go_left {
                        (new_child, inner.right.clone())
                    } else {
                        (inner.left.clone(), new_child)
                    };

                    // A newly inserted key is always routed so it cannot
                    // exceed an ancestor's search_key (it goes left only
                    // when key <= search_key), so search_key never
                    // changes here; rotations below may still rewrite it.
                    let rebuilt = build_inner(left, right, inner.search_key.clone(), hasher);

                    Grown::Inserted(rebalance(rebuilt, hasher))
                }
            }
        }
    }
}

enum DeleteStep {
    Removed,
    Updated(Rc<Node>),
}

fn delete_node(
    node: &Rc<Node>,
    key: &[u8],
    hasher: &Hasher,
    predecessor: &mut Option<Key>,
) -> Result<DeleteStep, Error> {
    match node.as_ref() {
        Node::Leaf(leaf) => {
            if leaf.key == key {
                Ok(DeleteStep::Removed)
            } else {
                Err(Error::KeyNotFound { key: key.to_vec() })
            }
        }
        Node::Inner(inner) => {
            let go_left = key <= inner.search_key.as_slice();

            if go_left {
                match delete_node(&inner.left, key, hasher, predecessor)? {
                    DeleteStep::Removed => Ok(DeleteStep::Updated(inner.right.clone())),
                    DeleteStep::Updated(new_left) => {
                        let search_key = if inner.search_key.as_slice() == key {
                            predecessor.clone().expect(
                                "a deleted key equal to an ancestor's search_key must have a \
                                 tracked predecessor",
                            )
                        } else {
                            inner.search_key.clone()
                        };

                        Ok(DeleteStep::Updated(finalize_inner(
                            new_left,
                            inner.right.clone(),
                            search_key,
                            hasher,
                        )))
                    }
                }
            } else {
                *predecessor = Some(inner.search_key.clone());

                match delete_node(&inner.right, key, hasher, predecessor)? {
                    DeleteStep::Removed => Ok(DeleteStep::Updated(inner.left.clone())),
                    DeleteStep::Updated(new_right) => Ok(DeleteStep::Updated(finalize_inner(
                        inner.left.clone(),
                        new_right,
                        inner.search_key.clone(),
                        hasher,
                    ))),
                }
            }
        }
    }
}
