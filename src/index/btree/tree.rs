//! The [`BTreeIndex`] handle: lifecycle, node I/O and search.

use std::fmt;
use std::path::Path;

use crate::cache::{IndexStats, NodeCache};
use crate::common::{BlockId, Error, IndexOptions, Result};
use crate::storage::block::{Header, Node};
use crate::storage::BlockFile;

use super::allocator::BlockAllocator;
use super::iter::Iter;

/// Deepest tree any descent will follow before declaring the file corrupt.
///
/// With at least 10 children per internal node, 2^64 block ids cannot
/// support a legitimate tree anywhere near this tall, so reaching it means
/// the child pointers form a cycle.
pub(crate) const MAX_HEIGHT: usize = 64;

/// Where a key was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// The node holding the key.
    pub node: Node,
    /// Position of the key within `node`.
    pub index: usize,
}

impl SearchHit {
    pub fn key(&self) -> u64 {
        self.node.keys()[self.index]
    }

    pub fn value(&self) -> u64 {
        self.node.values()[self.index]
    }
}

/// An open B-tree index file.
///
/// # Architecture
/// ```text
/// ┌────────────────────────────────────────────────────────┐
/// │                      BTreeIndex                        │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │
/// │  │    header    │  │  IndexStats  │  │ IndexOptions │  │
/// │  │ root, next   │  │   counters   │  │ cache size   │  │
/// │  └──────────────┘  └──────────────┘  └──────────────┘  │
/// │            │  per operation: NodeCache (FIFO)          │
/// │            ▼                                           │
/// │  ┌──────────────────────────────────────────────────┐  │
/// │  │ BlockFile: [hdr][node][node][node] ... 512 B each │  │
/// │  └──────────────────────────────────────────────────┘  │
/// └────────────────────────────────────────────────────────┘
/// ```
///
/// Every operation takes `&mut self`, so one handle runs one operation at
/// a time. The format assumes a single process owns the file.
///
/// # Usage
/// ```no_run
/// use blockdex::BTreeIndex;
///
/// let mut index = BTreeIndex::create("numbers.idx")?;
/// index.insert(42, 100)?;
/// assert_eq!(index.get(42)?, Some(100));
/// # Ok::<(), blockdex::Error>(())
/// ```
pub struct BTreeIndex {
    file: BlockFile,
    header: Header,
    options: IndexOptions,
    stats: IndexStats,
}

impl fmt::Debug for BTreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTreeIndex")
            .field("path", &self.file.path())
            .field("header", &self.header)
            .field("options", &self.options)
            .finish()
    }
}

impl BTreeIndex {
    /// Create a new index file holding an empty tree.
    ///
    /// # Errors
    /// Returns `Error::AlreadyExists` if the file exists; it is not modified.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_options(path, IndexOptions::default())
    }

    pub fn create_with_options<P: AsRef<Path>>(path: P, options: IndexOptions) -> Result<Self> {
        let mut file = BlockFile::create(path)?;
        let header = Header::empty();
        file.write_block(BlockId::NULL, &header.encode())?;
        file.sync()?;

        tracing::debug!("created index {}", file.path().display());
        Ok(Self {
            file,
            header,
            options,
            stats: IndexStats::new(),
        })
    }

    /// Open an existing index file.
    ///
    /// # Errors
    /// - `Error::NotFound` if the file doesn't exist
    /// - `Error::TruncatedBlock` if it is shorter than one block
    /// - `Error::BadMagic` if block 0 is not an index header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, IndexOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(path: P, options: IndexOptions) -> Result<Self> {
        let mut file = BlockFile::open(path)?;
        let header = Header::decode(&file.read_block(BlockId::NULL)?)?;

        tracing::debug!(
            "opened index {} (root {}, next free {})",
            file.path().display(),
            header.root.0,
            header.next_free.0
        );
        Ok(Self {
            file,
            header,
            options,
            stats: IndexStats::new(),
        })
    }

    // ========================================================================
    // Public API: Lookup
    // ========================================================================

    /// Find the node and slot holding `key`.
    ///
    /// Returns `Ok(None)` for an empty tree or an absent key.
    pub fn search(&mut self, key: u64) -> Result<Option<SearchHit>> {
        let mut cache = self.new_cache();
        self.search_in(&mut cache, key)
    }

    /// Look up the value stored under `key`.
    pub fn get(&mut self, key: u64) -> Result<Option<u64>> {
        Ok(self.search(key)?.map(|hit| hit.value()))
    }

    /// Iterate over all pairs in ascending key order.
    ///
    /// Blocks are read lazily as the iterator advances. Each call starts a
    /// fresh traversal from the current root.
    pub fn iter(&mut self) -> Iter<'_> {
        let root = self.header.root;
        Iter::new(self, root)
    }

    // ========================================================================
    // Public API: Info
    // ========================================================================

    /// The header as of the last committed operation.
    #[inline]
    pub fn header(&self) -> Header {
        self.header
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    #[inline]
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    #[inline]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    // ========================================================================
    // Internal: Search and node I/O
    // ========================================================================

    pub(super) fn new_cache(&self) -> NodeCache {
        NodeCache::new(self.options.cache_capacity)
    }

    pub(super) fn search_in(&mut self, cache: &mut NodeCache, key: u64) -> Result<Option<SearchHit>> {
        let mut block_id = self.header.root;
        if block_id.is_null() {
            return Ok(None);
        }

        for _ in 0..MAX_HEIGHT {
            let node = self.read_node(cache, block_id, self.header.next_free)?;
            match node.find(key) {
                Ok(index) => return Ok(Some(SearchHit { node, index })),
                Err(index) => match node.child(index) {
                    Some(child) => block_id = child,
                    None => return Ok(None),
                },
            }
        }
        Err(Error::corrupt(block_id.0, "search path deeper than any valid tree"))
    }

    /// Read a node, going through `cache`.
    ///
    /// `next_free` bounds the valid ids: the committed header's value for
    /// reads, the allocator's for reads made while an insert is running.
    pub(super) fn read_node(
        &mut self,
        cache: &mut NodeCache,
        block_id: BlockId,
        next_free: BlockId,
    ) -> Result<Node> {
        if let Some(node) = cache.get(block_id) {
            IndexStats::bump(&self.stats.cache_hits);
            return Ok(node);
        }

        IndexStats::bump(&self.stats.cache_misses);
        let node = self.load_node_below(block_id, next_free)?;
        cache.put(node.clone());
        Ok(node)
    }

    /// Read a committed node straight from the file.
    pub(super) fn load_node(&mut self, block_id: BlockId) -> Result<Node> {
        self.load_node_below(block_id, self.header.next_free)
    }

    fn load_node_below(&mut self, block_id: BlockId, next_free: BlockId) -> Result<Node> {
        if block_id.is_null() || block_id >= next_free {
            return Err(Error::corrupt(
                block_id.0,
                format!("pointer outside allocated blocks 1..{}", next_free.0),
            ));
        }
        let block = self.file.read_block(block_id)?;
        IndexStats::bump(&self.stats.blocks_read);
        Node::decode(block_id, &block)
    }

    /// Persist a node and refresh its cached copy.
    pub(super) fn write_node(&mut self, cache: &mut NodeCache, node: &Node) -> Result<()> {
        self.file.write_block(node.block_id(), &node.encode())?;
        IndexStats::bump(&self.stats.blocks_written);
        cache.put(node.clone());
        Ok(())
    }

    /// Write the header if this operation changed it, then sync.
    pub(super) fn commit(&mut self, alloc: BlockAllocator) -> Result<()> {
        if alloc.is_dirty() {
            let header = alloc.header();
            self.file.write_block(BlockId::NULL, &header.encode())?;
            IndexStats::bump(&self.stats.blocks_written);
            tracing::debug!(
                "committed header: root {}, next free {} ({} blocks allocated)",
                header.root.0,
                header.next_free.0,
                alloc.allocated()
            );
            self.header = header;
        }
        self.file.sync()
    }
}
