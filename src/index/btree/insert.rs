//! Insertion with preemptive splitting.

use crate::cache::{IndexStats, NodeCache};
use crate::common::{BlockId, Result};
use crate::storage::block::{Node, NodeKind};

use super::allocator::BlockAllocator;
use super::tree::{BTreeIndex, MAX_HEIGHT};

/// What an insert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was new.
    Inserted,
    /// The key existed; its value was overwritten.
    Updated { previous: u64 },
}

impl BTreeIndex {
    /// Insert `key` with `value`, or overwrite the value if `key` exists.
    ///
    /// # Allocation
    /// All blocks allocated by this call (a new root, siblings from splits
    /// at any depth) come from one counter, and the header is written once
    /// at the end. A failure part-way leaves earlier node writes in place;
    /// there is no rollback.
    pub fn insert(&mut self, key: u64, value: u64) -> Result<InsertOutcome> {
        let mut cache = self.new_cache();
        let mut alloc = BlockAllocator::new(self.header());

        let root_id = self.header().root;
        if root_id.is_null() {
            let block_id = alloc.allocate();
            let mut root = Node::leaf(block_id, BlockId::NULL);
            root.insert_entry(0, key, value)?;
            self.write_node(&mut cache, &root)?;
            alloc.set_root(block_id);
            self.commit(alloc)?;
            return Ok(InsertOutcome::Inserted);
        }

        if let Some(hit) = self.search_in(&mut cache, key)? {
            let mut node = hit.node;
            let previous = node.set_value(hit.index, value);
            self.write_node(&mut cache, &node)?;
            self.commit(alloc)?;
            return Ok(InsertOutcome::Updated { previous });
        }

        let mut root = self.read_node(&mut cache, root_id, alloc.next_free())?;
        if root.is_full() {
            let new_root_id = alloc.allocate();
            let mut new_root = Node::internal(new_root_id, BlockId::NULL, root_id);
            root.set_parent(new_root_id);
            self.split_child(&mut cache, &mut alloc, &mut new_root, 0, root)?;
            alloc.set_root(new_root_id);
            tracing::debug!("root split: new root {}", new_root_id);
            root = new_root;
        }

        let outcome = self.insert_non_full(&mut cache, &mut alloc, root, key, value)?;
        self.commit(alloc)?;
        Ok(outcome)
    }

    /// Insert into the subtree rooted at `node`, which must not be full.
    ///
    /// Any full child on the path is split before it is entered, so the
    /// node finally receiving the key always has room.
    fn insert_non_full(
        &mut self,
        cache: &mut NodeCache,
        alloc: &mut BlockAllocator,
        mut node: Node,
        key: u64,
        value: u64,
    ) -> Result<InsertOutcome> {
        for _ in 0..MAX_HEIGHT {
            let index = match node.find(key) {
                Ok(index) => {
                    let previous = node.set_value(index, value);
                    self.write_node(cache, &node)?;
                    return Ok(InsertOutcome::Updated { previous });
                }
                Err(index) => index,
            };

            let child_id = match node.kind() {
                NodeKind::Leaf => {
                    node.insert_entry(index, key, value)?;
                    self.write_node(cache, &node)?;
                    return Ok(InsertOutcome::Inserted);
                }
                NodeKind::Internal { children } => children[index],
            };

            let child = self.read_node(cache, child_id, alloc.next_free())?;
            node = if child.is_full() {
                let (left, right) = self.split_child(cache, alloc, &mut node, index, child)?;
                // The promoted median now sits at `index`
                match key.cmp(&node.keys()[index]) {
                    std::cmp::Ordering::Less => left,
                    std::cmp::Ordering::Greater => right,
                    std::cmp::Ordering::Equal => node,
                }
            } else {
                child
            };
        }
        Err(crate::common::Error::corrupt(
            node.block_id().0,
            "insert path deeper than any valid tree",
        ))
    }

    /// Split the full `child`, which sits at `index` under `parent`.
    ///
    /// Writes the child, its new sibling, every grandchild that moved to
    /// the sibling (their parent pointer changes) and the parent. Returns
    /// the two halves, left then right.
    fn split_child(
        &mut self,
        cache: &mut NodeCache,
        alloc: &mut BlockAllocator,
        parent: &mut Node,
        index: usize,
        mut child: Node,
    ) -> Result<(Node, Node)> {
        let sibling_id = alloc.allocate();
        let (key, value, mut sibling) = child.split(sibling_id)?;
        child.set_parent(parent.block_id());
        sibling.set_parent(parent.block_id());

        for &moved in sibling.children() {
            let mut grandchild = self.read_node(cache, moved, alloc.next_free())?;
            grandchild.set_parent(sibling_id);
            self.write_node(cache, &grandchild)?;
        }

        parent.insert_separator(index, key, value, sibling_id)?;

        self.write_node(cache, &child)?;
        self.write_node(cache, &sibling)?;
        self.write_node(cache, parent)?;

        IndexStats::bump(&self.stats().splits);
        tracing::debug!(
            "split {} at key {}: sibling {}, parent {}",
            child.block_id(),
            key,
            sibling_id,
            parent.block_id()
        );
        Ok((child, sibling))
    }
}
