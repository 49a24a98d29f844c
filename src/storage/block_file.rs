//! Block File - low-level file I/O for index blocks.
//!
//! The [`BlockFile`] handles all direct file operations:
//! - Creating and opening the index file
//! - Reading and writing whole 512-byte blocks
//! - Flushing written blocks to stable storage

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::config::BLOCK_SIZE;
use crate::common::{BlockId, Error, Result};
use crate::storage::block::Block;

/// Manages block I/O for a single index file.
///
/// # File Layout
/// The index is stored as a single file with blocks laid out sequentially:
/// ```text
/// ┌──────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0  │ Block 1 │ Block 2 │  ...    │ Block N │
/// │ (header) │ (node)  │ (node)  │         │ (node)  │
/// └──────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      512     1024     ...    N×512
/// ```
///
/// # Allocation
/// `BlockFile` does not hand out block ids; the header's next-free counter
/// does. Writing past the current end extends the file.
///
/// # Durability
/// Writes are not synced individually. Callers group the writes of one
/// operation and call [`BlockFile::sync`] once at the end.
pub struct BlockFile {
    file: File,
    path: PathBuf,
    /// Number of whole blocks in the file.
    block_count: u64,
}

impl BlockFile {
    /// Create a new, empty index file.
    ///
    /// # Errors
    /// Returns `Error::AlreadyExists` if the file already exists. An existing
    /// file is never opened for writing, so it is left untouched.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_path_buf()),
                _ => Error::Io(err),
            })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            block_count: 0,
        })
    }

    /// Open an existing index file.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the file doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
                _ => Error::Io(err),
            })?;

        let file_size = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            block_count: file_size / BLOCK_SIZE as u64,
        })
    }

    /// Read a block from disk.
    ///
    /// # Errors
    /// Returns `Error::TruncatedBlock` if fewer than 512 bytes are available
    /// at the block's offset.
    pub fn read_block(&mut self, block_id: BlockId) -> Result<Block> {
        self.file.seek(SeekFrom::Start(block_id.offset()))?;

        let mut block = Block::new();
        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match self.file.read(&mut block.as_mut_slice()[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }

        if filled < BLOCK_SIZE {
            return Err(Error::TruncatedBlock {
                block: block_id.0,
                len: filled,
            });
        }

        tracing::trace!("read {}", block_id);
        Ok(block)
    }

    /// Write a block to disk, extending the file if needed.
    pub fn write_block(&mut self, block_id: BlockId, block: &Block) -> Result<()> {
        self.file.seek(SeekFrom::Start(block_id.offset()))?;
        self.file.write_all(block.as_slice())?;

        self.block_count = self.block_count.max(block_id.0 + 1);
        tracing::trace!("wrote {}", block_id);
        Ok(())
    }

    /// Flush all written blocks to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Path this file was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of whole blocks in the file.
    #[inline]
    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    /// Get the total size of the file in bytes, counting whole blocks.
    #[inline]
    pub fn file_size(&self) -> u64 {
        self.block_count * BLOCK_SIZE as u64
    }
}
