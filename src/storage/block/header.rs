//! Header block codec.
//!
//! Block 0 of every index file is a [`Header`] identifying the file and
//! recording where the tree starts and where the next node goes.

use crate::common::config::MAGIC;
use crate::common::{BlockId, Error, Result};

use super::Block;

/// Contents of block 0.
///
/// # Layout (big-endian, rest of the block zero)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       8     magic ("4348PRJ3")
/// 8       8     root block id (0 = empty tree)
/// 16      8     next free block id
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Root node of the tree, or `BlockId::NULL` when the tree is empty.
    pub root: BlockId,
    /// First block id that has never been handed out.
    pub next_free: BlockId,
}

impl Header {
    pub const OFFSET_MAGIC: usize = 0;
    pub const OFFSET_ROOT: usize = 8;
    pub const OFFSET_NEXT_FREE: usize = 16;

    /// Header of a freshly created index: no root, next block is 1.
    pub fn empty() -> Self {
        Self {
            root: BlockId::NULL,
            next_free: BlockId::new(1),
        }
    }

    /// Whether the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Serialize into a block.
    pub fn encode(&self) -> Block {
        let mut block = Block::new();
        block.as_mut_slice()[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + MAGIC.len()]
            .copy_from_slice(&MAGIC);
        block.write_u64(Self::OFFSET_ROOT, self.root.0);
        block.write_u64(Self::OFFSET_NEXT_FREE, self.next_free.0);
        block
    }

    /// Deserialize from a block.
    ///
    /// # Errors
    /// Returns `Error::BadMagic` if the first 8 bytes are not the magic tag.
    pub fn decode(block: &Block) -> Result<Self> {
        let mut found = [0u8; 8];
        found.copy_from_slice(&block.as_slice()[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + 8]);
        if found != MAGIC {
            return Err(Error::BadMagic { found });
        }

        Ok(Self {
            root: BlockId::new(block.read_u64(Self::OFFSET_ROOT)),
            next_free: BlockId::new(block.read_u64(Self::OFFSET_NEXT_FREE)),
        })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::empty()
    }
}
