#![doc = include_str!("../README.md")]

mod avl;
mod bulk;
mod error;
mod hasher;
mod node;
mod proof;
mod tree;

pub use error::Error;
pub use hasher::{HashAlgorithm, Hasher};
pub use proof::{Proof, ProofEntry, Side};
pub use tree::Tree;

/// An ordered byte string used as a tree key.
pub type Key = Vec<u8>;

/// An opaque, unhashed payload associated with a key.
pub type Value = Vec<u8>;
