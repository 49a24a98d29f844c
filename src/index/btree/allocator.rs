//! Block allocation for a single insert.
//!
//! Every block an insert needs (a new root, a sibling at any depth) comes
//! from one [`BlockAllocator`] threaded through the whole operation. The
//! resulting header is written once, after all node writes are done.

use crate::common::BlockId;
use crate::storage::block::Header;

pub(crate) struct BlockAllocator {
    start: Header,
    current: Header,
}

impl BlockAllocator {
    pub(crate) fn new(header: Header) -> Self {
        Self {
            start: header,
            current: header,
        }
    }

    /// Hand out the next unused block id.
    pub(crate) fn allocate(&mut self) -> BlockId {
        let id = self.current.next_free;
        self.current.next_free = BlockId::new(id.0 + 1);
        id
    }

    /// First id not yet handed out; every id below it is a written node.
    pub(crate) fn next_free(&self) -> BlockId {
        self.current.next_free
    }

    pub(crate) fn set_root(&mut self, root: BlockId) {
        self.current.root = root;
    }

    /// Number of blocks handed out so far.
    pub(crate) fn allocated(&self) -> u64 {
        self.current.next_free.0 - self.start.next_free.0
    }

    /// Whether the header needs rewriting.
    pub(crate) fn is_dirty(&self) -> bool {
        self.current != self.start
    }

    pub(crate) fn header(&self) -> Header {
        self.current
    }
}
