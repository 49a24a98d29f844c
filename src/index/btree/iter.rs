//! Lazy in-order traversal.

use crate::common::{BlockId, Error, Result};
use crate::storage::block::Node;

use super::tree::{BTreeIndex, MAX_HEIGHT};

/// A node on the traversal stack and the next key slot to emit from it.
struct Cursor {
    node: Node,
    slot: usize,
}

/// Ascending iterator over `(key, value)` pairs.
///
/// Holds at most one node per tree level. Each item is a `Result` because
/// advancing may read a block; after an error the iterator is exhausted.
///
/// # Example
/// ```no_run
/// use blockdex::BTreeIndex;
///
/// let mut index = BTreeIndex::open("numbers.idx")?;
/// for entry in index.iter() {
///     let (key, value) = entry?;
///     println!("{key}: {value}");
/// }
/// # Ok::<(), blockdex::Error>(())
/// ```
pub struct Iter<'a> {
    index: &'a mut BTreeIndex,
    stack: Vec<Cursor>,
    /// Root still to be entered on the first call to `next`.
    pending: Option<BlockId>,
}

impl<'a> Iter<'a> {
    pub(super) fn new(index: &'a mut BTreeIndex, root: BlockId) -> Self {
        Self {
            index,
            stack: Vec::new(),
            pending: (!root.is_null()).then_some(root),
        }
    }

    /// Push `block_id` and its leftmost descendants down to a leaf.
    fn descend(&mut self, mut block_id: BlockId) -> Result<()> {
        loop {
            if self.stack.len() >= MAX_HEIGHT {
                return Err(Error::corrupt(block_id.0, "traversal deeper than any valid tree"));
            }
            let node = self.index.load_node(block_id)?;
            let leftmost = node.child(0);
            self.stack.push(Cursor { node, slot: 0 });
            match leftmost {
                Some(child) => block_id = child,
                None => return Ok(()),
            }
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<(u64, u64)>> {
        self.stack.clear();
        self.pending = None;
        Some(Err(err))
    }
}

impl Iterator for Iter<'_> {
    type Item = Result<(u64, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.pending.take() {
            if let Err(err) = self.descend(root) {
                return self.fail(err);
            }
        }

        loop {
            let cursor = self.stack.last_mut()?;
            if cursor.slot < cursor.node.len() {
                let slot = cursor.slot;
                cursor.slot += 1;
                let entry = (cursor.node.keys()[slot], cursor.node.values()[slot]);

                // Everything right of this key comes before the next one
                if let Some(child) = cursor.node.child(slot + 1) {
                    if let Err(err) = self.descend(child) {
                        return self.fail(err);
                    }
                }
                return Some(Ok(entry));
            }
            self.stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_index() -> (BTreeIndex, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let index = BTreeIndex::create(dir.path().join("test.idx")).unwrap();
        (index, dir)
    }

    #[test]
    fn test_iter_empty() {
        let (mut index, _dir) = create_index();
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn test_iter_single_leaf() {
        let (mut index, _dir) = create_index();
        for key in [3, 1, 2] {
            index.insert(key, key * 10).unwrap();
        }

        let entries: Vec<(u64, u64)> = index.iter().collect::<Result<_>>().unwrap();
        assert_eq!(entries, vec![(1, 10), (2, 20), (3, 30)]);
    }

    #[test]
    fn test_iter_multi_level_is_sorted() {
        let (mut index, _dir) = create_index();
        // Interleave so splits happen in the middle of nodes too
        let keys: Vec<u64> = (0..500u64).map(|i| (i * 7919) % 500).collect();
        for &key in &keys {
            index.insert(key, key + 1).unwrap();
        }

        let entries: Vec<(u64, u64)> = index.iter().collect::<Result<_>>().unwrap();
        assert_eq!(entries.len(), 500);
        for (i, &(key, value)) in entries.iter().enumerate() {
            assert_eq!(key, i as u64);
            assert_eq!(value, key + 1);
        }
    }

    #[test]
    fn test_iter_is_restartable() {
        let (mut index, _dir) = create_index();
        for key in 0..50 {
            index.insert(key, key).unwrap();
        }

        let first: Vec<_> = index.iter().take(5).collect::<Result<Vec<_>>>().unwrap();
        let again: Vec<_> = index.iter().take(5).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first, again);
        assert_eq!(first[0], (0, 0));
    }

    #[test]
    fn test_iter_stops_after_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");
        {
            let mut index = BTreeIndex::create(&path).unwrap();
            for key in 0..40 {
                index.insert(key, key).unwrap();
            }
        }

        // Corrupt the leftmost leaf's self id
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[512..520].copy_from_slice(&99u64.to_be_bytes());
        std::fs::write(&path, &bytes).unwrap();

        let mut index = BTreeIndex::open(&path).unwrap();
        let mut iter = index.iter();
        assert!(matches!(iter.next(), Some(Err(Error::CorruptNode { .. }))));
        assert!(iter.next().is_none());
    }
}
