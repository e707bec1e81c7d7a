use thiserror::Error;

use crate::Key;

/// Errors surfaced at the public API of the tree.
///
/// Internal invariant violations (I1-I7 in the design doc) are programmer
/// errors and are not represented here; they panic instead of being
/// recovered, matching the propagation policy of the spec this crate
/// implements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `lookup`/`delete` on a key that is not present in the tree.
    #[error("key `{}` not found", String::from_utf8_lossy(key))]
    KeyNotFound {
        /// The key that was looked up.
        key: Key,
    },

    /// `new_from_pairs` saw the same key more than once.
    #[error("duplicate key `{}` in bulk build", String::from_utf8_lossy(key))]
    DuplicateKey {
        /// The key that appeared more than once.
        key: Key,
    },

    /// A user-supplied hash function did not return a lowercase-hex digest
    /// string.
    #[error("hash function did not return a valid lowercase-hex digest string")]
    InvalidHashFunction,
}
