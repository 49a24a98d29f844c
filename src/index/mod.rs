//! Index structures.
//!
//! - [`btree`] - Disk-resident B-tree of `u64` keys to `u64` values

pub mod btree;

pub use btree::{BTreeIndex, InsertOutcome, Iter, SearchHit, TreeShape};
