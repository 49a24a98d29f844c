//! Block types and codecs.
//!
//! This module contains:
//! - [`Block`] - The raw 512-byte data container
//! - [`Header`] - Codec for block 0 (magic, root, next free block)
//! - [`Node`] - Codec and in-memory form of a B-tree node block

#[allow(clippy::module_inception)]
mod block;
mod header;
mod node;

pub use block::Block;
pub use header::Header;
pub use node::{Node, NodeKind};
