//! Full-tree structural verification.

use crate::common::config::MIN_KEYS;
use crate::common::{BlockId, Error, Result};

use super::tree::{BTreeIndex, MAX_HEIGHT};

/// Summary of a verified tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeShape {
    /// Levels from root to leaves; 0 for an empty tree.
    pub height: usize,
    /// Number of nodes reachable from the root.
    pub nodes: u64,
    /// Number of keys stored.
    pub keys: u64,
}

/// Open key interval a subtree must fall within.
#[derive(Clone, Copy)]
struct Bounds {
    lower: Option<u64>,
    upper: Option<u64>,
}

impl Bounds {
    fn contains(&self, key: u64) -> bool {
        self.lower.map_or(true, |lower| key > lower) && self.upper.map_or(true, |upper| key < upper)
    }
}

struct Walk {
    shape: TreeShape,
    leaf_depth: Option<usize>,
}

impl BTreeIndex {
    /// Walk the whole tree and verify its structure.
    ///
    /// # Checks
    /// - Every child pointer lies in `1..next_free`
    /// - Each node's parent pointer names the node that points to it
    /// - Keys are ascending and within the separators above them
    /// - Non-root nodes hold at least 9 keys; the root holds at least one
    /// - All leaves are at the same depth
    ///
    /// # Errors
    /// Returns `Error::CorruptNode` naming the first offending block.
    pub fn check(&mut self) -> Result<TreeShape> {
        let root = self.header().root;
        if root.is_null() {
            return Ok(TreeShape::default());
        }

        let mut walk = Walk {
            shape: TreeShape::default(),
            leaf_depth: None,
        };
        let bounds = Bounds {
            lower: None,
            upper: None,
        };
        self.check_node(root, BlockId::NULL, bounds, 1, &mut walk)?;
        Ok(walk.shape)
    }

    fn check_node(
        &mut self,
        block_id: BlockId,
        parent: BlockId,
        bounds: Bounds,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<()> {
        if depth > MAX_HEIGHT {
            return Err(Error::corrupt(block_id.0, "tree deeper than any valid tree"));
        }

        let node = self.load_node(block_id)?;
        if node.parent() != parent {
            return Err(Error::corrupt(
                block_id.0,
                format!("parent is {}, expected {}", node.parent().0, parent.0),
            ));
        }
        if node.is_empty() {
            return Err(Error::corrupt(block_id.0, "node has no keys"));
        }
        if !parent.is_null() && node.len() < MIN_KEYS {
            return Err(Error::corrupt(
                block_id.0,
                format!("{} keys, minimum is {MIN_KEYS}", node.len()),
            ));
        }
        if let Some(&key) = node.keys().iter().find(|&&key| !bounds.contains(key)) {
            return Err(Error::corrupt(
                block_id.0,
                format!("key {key} outside its separators"),
            ));
        }

        walk.shape.nodes += 1;
        walk.shape.keys += node.len() as u64;

        if node.is_leaf() {
            match walk.leaf_depth {
                None => walk.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(Error::corrupt(
                        block_id.0,
                        format!("leaf at depth {depth}, others at {expected}"),
                    ));
                }
                Some(_) => {}
            }
            walk.shape.height = walk.shape.height.max(depth);
            return Ok(());
        }

        let keys = node.keys();
        for (i, &child) in node.children().iter().enumerate() {
            let child_bounds = Bounds {
                lower: if i == 0 { bounds.lower } else { Some(keys[i - 1]) },
                upper: if i == keys.len() { bounds.upper } else { Some(keys[i]) },
            };
            self.check_node(child, block_id, child_bounds, depth + 1, walk)?;
        }
        Ok(())
    }
}
