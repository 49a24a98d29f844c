//! Block identifier type.

use std::fmt;

use super::config::BLOCK_SIZE;

/// Identifies a 512-byte block in the index file.
///
/// Block ids double as on-disk pointers: a node's children and parent are
/// stored as block ids, and block N lives at byte offset `N × BLOCK_SIZE`.
/// Block 0 is the header, so id 0 also serves as the "no block" sentinel.
///
/// # Example
/// ```
/// use blockdex::BlockId;
///
/// let id = BlockId::new(3);
/// assert!(!id.is_null());
/// assert_eq!(id.offset(), 1536);
/// assert!(BlockId::NULL.is_null());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl BlockId {
    /// The header block; also "no block" in parent/child/root slots.
    pub const NULL: BlockId = BlockId(0);

    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u64) -> Self {
        BlockId(id)
    }

    /// Whether this id is the null sentinel.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Byte offset of this block in the file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0 * BLOCK_SIZE as u64
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}
