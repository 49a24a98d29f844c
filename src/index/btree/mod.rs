//! B-tree index implementation.
//!
//! A classic CLRS B-tree with minimum degree 10 stored one node per block.
//! Inserts split full nodes on the way down, so a split never has to
//! propagate back up the tree.
//!
//! - [`BTreeIndex`] - Open handle: create/open, search, insert
//! - [`Iter`] - Lazy in-order traversal
//! - [`TreeShape`] - Result of a full structural check

mod allocator;
mod check;
mod insert;
mod iter;
mod tree;

pub use check::TreeShape;
pub use insert::InsertOutcome;
pub use iter::Iter;
pub use tree::{BTreeIndex, SearchHit};
