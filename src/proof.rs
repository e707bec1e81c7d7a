use serde::{Deserialize, Serialize};

use crate::hasher::{Digest, Hasher};
use crate::node::Node;
use crate::tree::Tree;
use crate::Key;

/// Which side of the fold a sibling hash sits on, when reconstructing a
/// root hash from a leaf during [`Proof::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The sibling is the left child; the accumulator is the right child.
    SiblingOnLeft,
    /// The sibling is the right child; the accumulator is the left child.
    SiblingOnRight,
}

/// One step of an audit proof: a sibling's hash and which side it sits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofEntry {
    /// The sibling's `key_hash`.
    pub sibling_hash: Digest,
    /// The sibling's side relative to the path being proven.
    pub side: Side,
}

/// An audit proof (C7): a key and the leaf-first list of sibling hashes
/// needed to reconstruct a root hash from that key's leaf.
///
/// `path = None` marks an empty tree (always fails to verify). `path =
/// Some(vec![])` marks a single-leaf tree (verifies iff the root hash is
/// `H(key)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// The key this proof is for.
    pub key: Key,
    /// The sibling path, leaf-first, or `None` for an empty tree.
    pub path: Option<Vec<ProofEntry>>,
}

impl Proof {
    /// Verifies this proof against `root_hash`, using the default hasher
    /// ([`crate::HashAlgorithm::Sha256`]).
    pub fn verify(&self, root_hash: &str) -> bool {
        self.verify_with(root_hash, &Hasher::default())
    }

    /// Verifies this proof against `root_hash` using the given [`Hasher`]
    /// (which must match the one the tree that produced this proof was
    /// built with).
    pub fn verify_with(&self, root_hash: &str, hasher: &Hasher) -> bool {
        let path = match &self.path {
            Some(path) => path,
            None => {
                tracing::warn!("verifying a proof with no path (empty-tree marker); always false");
                return false;
            }
        };

        let mut acc = hasher.hash(&self.key);

        for entry in path {
            acc = match entry.side {
                Side::SiblingOnRight => hasher.concat(&acc, &entry.sibling_hash),
                Side::SiblingOnLeft => hasher.concat(&entry.sibling_hash, &acc),
            };
        }

        acc == root_hash
    }
}

impl Tree {
    /// Generates an audit proof for `key`.
    ///
    /// The proof is generated by descent (root-to-leaf) and stored
    /// leaf-first (the order [`Proof::verify`] consumes it in): at each
    /// inner node the traversal continues toward `key` and records the
    /// *other* child's hash, annotated with which side that other child
    /// is on.
    pub fn audit<K: AsRef<[u8]>>(&self, key: K) -> Proof {
        let key = key.as_ref().to_vec();

        let path = self.root_node().map(|root| {
            let mut path = Vec::new();
            descend(root, &key, &mut path);
            path.reverse();
            path
        });

        Proof { key, path }
    }
}

#[cfg(test)]
mod tests {
    use crate::Tree;

    #[test]
    fn proof_for_missing_key_still_verifies_a_present_neighbor() {
        let tree = Tree::new()
            .insert("a", b"1".to_vec())
            .insert("b", b"2".to_vec())
            .insert("c", b"3".to_vec());

        let root = tree.root_hash().unwrap().to_string();
        let proof = tree.audit("b");

        assert!(proof.verify(&root));
    }

    #[test]
    fn tampered_sibling_hash_fails_verification() {
        let tree = Tree::new()
            .insert("a", b"1".to_vec())
            .insert("b", b"2".to_vec());

        let root = tree.root_hash().unwrap().to_string();
        let mut proof = tree.audit("a");

        if let Some(path) = &mut proof.path {
            if let Some(entry) = path.first_mut() {
                entry.sibling_hash.replace_range(0..2, "ff");
            }
        }

        assert!(!proof.verify(&root));
    }

    #[test]
    fn wrong_key_fails_verification_even_with_a_valid_path() {
        let tree = Tree::new().insert("a", b"1".to_vec());
        let root = tree.root_hash().unwrap().to_string();

        let mut proof = tree.audit("a");
        proof.key = b"z".to_vec();

        assert!(!proof.verify(&root));
    }
}

fn descend(node: &Node, key: &[u8], path: &mut Vec<ProofEntry>) {
    if let Node::Inner(inner) = node {
        if key <= inner.search_key.as_slice() {
            path.push(ProofEntry {
                sibling_hash: inner.right.key_hash().to_string(),
                side: Side::SiblingOnRight,
            });
            descend(&inner.left, key, path);
        } else {
            path.push(ProofEntry {
                sibling_hash: inner.left.key_hash().to_string(),
                side: Side::SiblingOnLeft,
            });
            descend(&inner.right, key, path);
        }
    }
}
