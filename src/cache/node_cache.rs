//! FIFO (First-In-First-Out) node cache.
//!
//! Holds decoded copies of nodes visited during one operation, so that a
//! node read on the way down (or just rewritten by a split) is not read
//! from disk a second time.

use std::collections::{HashMap, VecDeque};

use crate::common::BlockId;
use crate::storage::block::Node;

/// A bounded cache of decoded nodes with FIFO eviction.
///
/// When full, inserting a block id that is not cached evicts the entry that
/// was inserted earliest. Lookups do not change eviction order, and
/// re-inserting a cached id replaces the node in place without moving it to
/// the back of the queue.
///
/// # Example
/// ```
/// use blockdex::cache::NodeCache;
/// use blockdex::storage::block::Node;
/// use blockdex::BlockId;
///
/// let mut cache = NodeCache::new(2);
/// cache.put(Node::leaf(BlockId::new(1), BlockId::NULL));
/// cache.put(Node::leaf(BlockId::new(2), BlockId::NULL));
/// cache.put(Node::leaf(BlockId::new(3), BlockId::NULL));
///
/// assert!(cache.get(BlockId::new(1)).is_none());
/// assert!(cache.get(BlockId::new(3)).is_some());
/// ```
#[derive(Debug)]
pub struct NodeCache {
    capacity: usize,

    /// Cached nodes by block id.
    entries: HashMap<BlockId, Node>,

    /// Block ids in insertion order (front = oldest).
    queue: VecDeque<BlockId>,
}

impl NodeCache {
    /// Create an empty cache holding at most `capacity` nodes.
    ///
    /// A capacity of 0 caches nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Look up a node by block id.
    pub fn get(&self, block_id: BlockId) -> Option<Node> {
        self.entries.get(&block_id).cloned()
    }

    /// Insert or replace a node.
    ///
    /// Returns the block id that was evicted to make room, if any.
    pub fn put(&mut self, node: Node) -> Option<BlockId> {
        if self.capacity == 0 {
            return None;
        }

        let block_id = node.block_id();
        if let Some(slot) = self.entries.get_mut(&block_id) {
            *slot = node;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        self.queue.push_back(block_id);
        self.entries.insert(block_id, node);
        evicted
    }

    /// Drop a node from the cache, returning it if it was present.
    pub fn remove(&mut self, block_id: BlockId) -> Option<Node> {
        let node = self.entries.remove(&block_id)?;
        self.queue.retain(|&id| id != block_id);
        Some(node)
    }

    /// Drop every cached node.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.queue.clear();
    }

    #[inline]
    pub fn contains(&self, block_id: BlockId) -> bool {
        self.entries.contains_key(&block_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove the oldest entry.
    fn evict(&mut self) -> Option<BlockId> {
        let victim = self.queue.pop_front()?;
        self.entries.remove(&victim);
        tracing::trace!("node cache evicted {}", victim);
        Some(victim)
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new(crate::common::config::DEFAULT_NODE_CACHE_CAPACITY)
    }
}
