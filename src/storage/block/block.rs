//! Block - the fundamental 512-byte unit of storage.
//!
//! A [`Block`] is a raw byte array that serves as the unit of I/O between
//! the index file and memory. Header and node codecs read and write their
//! fields through the big-endian accessors here.

use crate::common::config::BLOCK_SIZE;

/// A block of data (512 bytes).
///
/// All multi-byte integers in the index format are big-endian `u64`, so
/// the only typed accessors are [`Block::read_u64`] and [`Block::write_u64`].
///
/// # Example
/// ```
/// use blockdex::storage::block::Block;
///
/// let mut block = Block::new();
/// block.write_u64(8, 0x0102);
/// assert_eq!(block.as_slice()[15], 0x02);
/// assert_eq!(block.read_u64(8), 0x0102);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    data: [u8; BLOCK_SIZE],
}

impl Block {
    /// Create a new zeroed block.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; BLOCK_SIZE],
        }
    }

    /// Get immutable slice of block data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of block data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read a big-endian `u64` at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + 8 > BLOCK_SIZE`.
    #[inline]
    pub fn read_u64(&self, offset: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[offset..offset + 8]);
        u64::from_be_bytes(bytes)
    }

    /// Write a big-endian `u64` at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + 8 > BLOCK_SIZE`.
    #[inline]
    pub fn write_u64(&mut self, offset: usize, value: u64) {
        self.data[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
    }

    /// Get the size of a block.
    #[inline]
    pub const fn size() -> usize {
        BLOCK_SIZE
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        f.debug_struct("Block").field("used_bytes", &used).finish()
    }
}
