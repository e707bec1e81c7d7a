use std::rc::Rc;

use crate::hasher::Hasher;
use crate::node::{finalize_inner, Inner, Node};

fn delta(i: &Inner) -> i64 {
    i.left.height() as i64 - i.right.height() as i64
}

/// Right-rotate at `z`, whose left child is `y` (Left-Left / Left-Right
/// cases). `y` becomes the new subtree root; `y`'s old right child
/// becomes `z`'s new left child.
///
/// `y.search_key` is preserved: it already equals the max of its
/// original left subtree, which remains `y`'s left subtree after the
/// rotation. `z`'s new search key becomes the max key of its new left
/// subtree (the subtree that was `y.right` before the rotation).
fn rotate_right(z: &Inner, hasher: &Hasher) -> Rc<Node> {
    let y = z
        .left
        .as_inner()
        .expect("rotate_right requires an inner left child");

    let new_z_search_key = y.right.subtree_max_key().clone();
    let new_z = finalize_inner(y.right.clone(), z.right.clone(), new_z_search_key, hasher);

    finalize_inner(y.left.clone(), new_z, y.search_key.clone(), hasher)
}

/// Mirror of [`rotate_right`] (Right-Right / Right-Left cases).
fn rotate_left(z: &Inner, hasher: &Hasher) -> Rc<Node> {
    let y = z
        .right
        .as_inner()
        .expect("rotate_left requires an inner right child");

    let new_z_search_key = z.left.subtree_max_key().clone();
    let new_z = finalize_inner(z.left.clone(), y.left.clone(), new_z_search_key, hasher);

    finalize_inner(new_z, y.right.clone(), y.search_key.clone(), hasher)
}

/// Restores the AVL property (I4) at `node` after a single insertion grew
/// one of its children by at most one level, selecting among the four
/// rotation cases by comparing subtree heights (equivalent to comparing
/// the inserted key against the heavier child's search key, since at
/// most one child changed height).
///
/// Deletion never calls this (§4.3: no rotation on delete).
pub(crate) fn rebalance(node: Inner, hasher: &Hasher) -> Rc<Node> {
    let d = delta(&node);

    if d > 1 {
        let left = node.left.as_inner().expect("left-heavy node has inner left child");

        if left.left.height() >= left.right.height() {
            tracing::trace!(search_key = ?node.search_key, "left-left rotation");
            rotate_right(&node, hasher)
        } else {
            tracing::trace!(search_key = ?node.search_key, "left-right rotation");
            let new_left = rotate_left(left, hasher);
            let node = Inner {
                left: new_left,
                ..node
            };
            rotate_right(&node, hasher)
        }
    } else if d < -1 {
        let right = node
            .right
            .as_inner()
            .expect("right-heavy node has inner right child");

        if right.right.height() >= right.left.height() {
            tracing::trace!(search_key = ?node.search_key, "right-right rotation");
            rotate_left(&node, hasher)
        } else {
            tracing::trace!(search_key = ?node.search_key, "right-left rotation");
            let new_right = rotate_right(right, hasher);
            let node = Inner {
                right: new_right,
                ..node
            };
            rotate_left(&node, hasher)
        }
    } else {
        Rc::new(Node::Inner(node))
    }
}
