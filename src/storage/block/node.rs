//! B-tree node block codec.
//!
//! On disk a node has no leaf flag: it is a leaf iff every child slot is
//! zero. In memory the distinction is carried by [`NodeKind`], so a leaf
//! cannot hold a child pointer and an internal node always has exactly one
//! more child than it has keys once it is persisted.

use crate::common::config::{MAX_CHILDREN, MAX_KEYS, MIN_DEGREE, MIN_KEYS};
use crate::common::{BlockId, Error, Result};

use super::Block;

/// Leaf or internal, with the child pointers of the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Internal { children: Vec<BlockId> },
}

/// A decoded B-tree node.
///
/// # Layout (big-endian, rest of the block zero)
/// ```text
/// Offset  Size     Field
/// ------  -------  -----
/// 0       8        block id
/// 8       8        parent block id (0 for the root)
/// 16      8        number of keys
/// 24      19 × 8   keys
/// 176     19 × 8   values
/// 328     20 × 8   children (all zero for a leaf)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) block_id: BlockId,
    pub(crate) parent: BlockId,
    pub(crate) keys: Vec<u64>,
    pub(crate) values: Vec<u64>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub const OFFSET_BLOCK_ID: usize = 0;
    pub const OFFSET_PARENT: usize = 8;
    pub const OFFSET_NUM_KEYS: usize = 16;
    pub const OFFSET_KEYS: usize = 24;
    pub const OFFSET_VALUES: usize = Self::OFFSET_KEYS + MAX_KEYS * 8;
    pub const OFFSET_CHILDREN: usize = Self::OFFSET_VALUES + MAX_KEYS * 8;

    /// Create an empty leaf.
    pub fn leaf(block_id: BlockId, parent: BlockId) -> Self {
        Self {
            block_id,
            parent,
            keys: Vec::with_capacity(MAX_KEYS),
            values: Vec::with_capacity(MAX_KEYS),
            kind: NodeKind::Leaf,
        }
    }

    /// Create an internal node with no keys and a single child.
    ///
    /// This is the shape of a new root just before its only child is split.
    pub fn internal(block_id: BlockId, parent: BlockId, first_child: BlockId) -> Self {
        let mut children = Vec::with_capacity(MAX_CHILDREN);
        children.push(first_child);
        Self {
            block_id,
            parent,
            keys: Vec::with_capacity(MAX_KEYS),
            values: Vec::with_capacity(MAX_KEYS),
            kind: NodeKind::Internal { children },
        }
    }

    #[inline]
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    #[inline]
    pub fn parent(&self) -> BlockId {
        self.parent
    }

    #[inline]
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    #[inline]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Child pointers; empty for a leaf.
    #[inline]
    pub fn children(&self) -> &[BlockId] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Internal { children } => children,
        }
    }

    /// The `index`-th child, or `None` for a leaf or an out-of-range index.
    #[inline]
    pub fn child(&self, index: usize) -> Option<BlockId> {
        self.children().get(index).copied()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() >= MAX_KEYS
    }

    /// Locate `key` in this node.
    ///
    /// `Ok(i)` means `keys[i] == key`. `Err(i)` gives the first index with
    /// `key < keys[i]`, which is both the insertion point and the child to
    /// descend into.
    #[inline]
    pub fn find(&self, key: u64) -> std::result::Result<usize, usize> {
        self.keys.binary_search(&key)
    }

    pub(crate) fn set_parent(&mut self, parent: BlockId) {
        self.parent = parent;
    }

    /// Overwrite the value at `index`, returning the old one.
    pub(crate) fn set_value(&mut self, index: usize, value: u64) -> u64 {
        std::mem::replace(&mut self.values[index], value)
    }

    /// Insert a key/value pair into a leaf at `index`.
    pub(crate) fn insert_entry(&mut self, index: usize, key: u64, value: u64) -> Result<()> {
        if !self.is_leaf() {
            return Err(Error::corrupt(self.block_id.0, "entry insert into internal node"));
        }
        if self.is_full() {
            return Err(Error::corrupt(self.block_id.0, "entry insert into full node"));
        }
        self.keys.insert(index, key);
        self.values.insert(index, value);
        Ok(())
    }

    /// Insert a separator promoted from child `index`, with `right` as the
    /// new child immediately after it.
    pub(crate) fn insert_separator(
        &mut self,
        index: usize,
        key: u64,
        value: u64,
        right: BlockId,
    ) -> Result<()> {
        if self.is_full() {
            return Err(Error::corrupt(self.block_id.0, "separator insert into full node"));
        }
        match &mut self.kind {
            NodeKind::Leaf => Err(Error::corrupt(self.block_id.0, "separator insert into leaf")),
            NodeKind::Internal { children } => {
                self.keys.insert(index, key);
                self.values.insert(index, value);
                children.insert(index + 1, right);
                Ok(())
            }
        }
    }

    /// Split a full node around its median.
    ///
    /// `self` keeps the first `t - 1` keys (and `t` children). The upper
    /// `t - 1` keys (and `t` children) move into a new sibling at
    /// `sibling_id` sharing this node's parent. Returns the median
    /// key/value and the sibling.
    pub(crate) fn split(&mut self, sibling_id: BlockId) -> Result<(u64, u64, Node)> {
        if self.len() != MAX_KEYS {
            return Err(Error::corrupt(self.block_id.0, "split of a node that is not full"));
        }

        let upper_keys = self.keys.split_off(MIN_DEGREE);
        let upper_values = self.values.split_off(MIN_DEGREE);
        let median_key = self.keys[MIN_KEYS];
        let median_value = self.values[MIN_KEYS];
        self.keys.truncate(MIN_KEYS);
        self.values.truncate(MIN_KEYS);

        let kind = match &mut self.kind {
            NodeKind::Leaf => NodeKind::Leaf,
            NodeKind::Internal { children } => NodeKind::Internal {
                children: children.split_off(MIN_DEGREE),
            },
        };

        let sibling = Node {
            block_id: sibling_id,
            parent: self.parent,
            keys: upper_keys,
            values: upper_values,
            kind,
        };
        Ok((median_key, median_value, sibling))
    }

    /// Serialize into a block.
    ///
    /// Unused key, value and child slots are left zero.
    pub fn encode(&self) -> Block {
        let mut block = Block::new();
        block.write_u64(Self::OFFSET_BLOCK_ID, self.block_id.0);
        block.write_u64(Self::OFFSET_PARENT, self.parent.0);
        block.write_u64(Self::OFFSET_NUM_KEYS, self.keys.len() as u64);

        for (i, (&key, &value)) in self.keys.iter().zip(&self.values).enumerate() {
            block.write_u64(Self::OFFSET_KEYS + i * 8, key);
            block.write_u64(Self::OFFSET_VALUES + i * 8, value);
        }
        for (i, child) in self.children().iter().enumerate() {
            block.write_u64(Self::OFFSET_CHILDREN + i * 8, child.0);
        }
        block
    }

    /// Deserialize the node stored in block `expected`.
    ///
    /// # Errors
    /// Returns `Error::CorruptNode` if the block does not identify itself
    /// as `expected`, holds more than 19 keys, has keys out of order, or has
    /// a child region that is neither all zero nor exactly `num_keys + 1`
    /// leading non-zero slots.
    pub fn decode(expected: BlockId, block: &Block) -> Result<Self> {
        let block_id = BlockId::new(block.read_u64(Self::OFFSET_BLOCK_ID));
        if block_id != expected {
            return Err(Error::corrupt(
                expected.0,
                format!("block claims to be {}", block_id.0),
            ));
        }

        let num_keys = block.read_u64(Self::OFFSET_NUM_KEYS);
        if num_keys > MAX_KEYS as u64 {
            return Err(Error::corrupt(expected.0, format!("{num_keys} keys")));
        }
        let num_keys = num_keys as usize;

        let keys: Vec<u64> = (0..num_keys)
            .map(|i| block.read_u64(Self::OFFSET_KEYS + i * 8))
            .collect();
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::corrupt(expected.0, "keys are not strictly ascending"));
        }
        let values = (0..num_keys)
            .map(|i| block.read_u64(Self::OFFSET_VALUES + i * 8))
            .collect();

        let slots: Vec<BlockId> = (0..MAX_CHILDREN)
            .map(|i| BlockId::new(block.read_u64(Self::OFFSET_CHILDREN + i * 8)))
            .collect();
        let kind = if slots.iter().all(BlockId::is_null) {
            NodeKind::Leaf
        } else {
            let (live, rest) = slots.split_at(num_keys + 1);
            if live.iter().any(BlockId::is_null) || !rest.iter().all(BlockId::is_null) {
                return Err(Error::corrupt(
                    expected.0,
                    format!("child slots do not match {num_keys} keys"),
                ));
            }
            NodeKind::Internal {
                children: live.to_vec(),
            }
        };

        Ok(Self {
            block_id,
            parent: BlockId::new(block.read_u64(Self::OFFSET_PARENT)),
            keys,
            values,
            kind,
        })
    }
}
