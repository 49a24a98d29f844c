//! Integration tests for the B-tree index.
//!
//! These drive the public API end to end against real files and inspect the
//! resulting bytes where the layout matters.

use std::collections::BTreeMap;

use blockdex::common::config::{MAGIC, MAX_KEYS};
use blockdex::{BTreeIndex, BlockId, Error, ErrorKind, IndexOptions, InsertOutcome, BLOCK_SIZE};
use proptest::prelude::*;
use tempfile::tempdir;

fn create_index() -> (BTreeIndex, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let index = BTreeIndex::create(dir.path().join("test.idx")).unwrap();
    (index, dir)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_be_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

// ============================================
// Header and file layout
// ============================================

#[test]
fn test_create_writes_empty_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    BTreeIndex::create(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), BLOCK_SIZE);
    assert_eq!(&bytes[0..8], &MAGIC);
    assert_eq!(read_u64(&bytes, 8), 0);
    assert_eq!(read_u64(&bytes, 16), 1);
    assert!(bytes[24..].iter().all(|&b| b == 0));
}

#[test]
fn test_create_refuses_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    let mut index = BTreeIndex::create(&path).unwrap();
    index.insert(1, 1).unwrap();
    drop(index);
    let before = std::fs::read(&path).unwrap();

    let err = BTreeIndex::create(&path).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_open_rejects_bad_magic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    std::fs::write(&path, vec![0x41u8; BLOCK_SIZE]).unwrap();

    let err = BTreeIndex::open(&path).unwrap_err();
    assert!(matches!(err, Error::BadMagic { .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_open_rejects_truncated_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    std::fs::write(&path, MAGIC).unwrap();

    let err = BTreeIndex::open(&path).unwrap_err();
    assert!(matches!(err, Error::TruncatedBlock { block: 0, .. }));
}

#[test]
fn test_open_missing_file() {
    let dir = tempdir().unwrap();
    let err = BTreeIndex::open(dir.path().join("nope.db")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_file_size_tracks_next_free() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    let mut index = BTreeIndex::create(&path).unwrap();
    for key in 0..300u64 {
        index.insert(key * 3, key).unwrap();
    }

    let next_free = index.header().next_free.0;
    let shape = index.check().unwrap();
    // No deletes, so every allocated block is a live node
    assert_eq!(next_free, shape.nodes + 1);
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        next_free * BLOCK_SIZE as u64
    );
}

// ============================================
// Splits
// ============================================

/// The twentieth distinct key splits the root exactly once.
#[test]
fn test_root_splits_once_at_twenty_keys() {
    let (mut index, _dir) = create_index();
    let mut keys: Vec<u64> = vec![5, 3, 8, 1, 4, 7, 9, 2, 6, 0];
    keys.extend(10..20);

    for &key in &keys[..MAX_KEYS] {
        index.insert(key, key * 100).unwrap();
    }
    assert_eq!(index.check().unwrap().height, 1);
    assert_eq!(index.stats().snapshot().splits, 0);

    index.insert(keys[MAX_KEYS], 0).unwrap();
    let shape = index.check().unwrap();
    assert_eq!(shape.height, 2);
    assert_eq!(shape.nodes, 3);
    assert_eq!(index.stats().snapshot().splits, 1);
    assert_eq!(index.header().next_free, BlockId::new(4));
}

#[test]
fn test_split_root_layout_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    let mut index = BTreeIndex::create(&path).unwrap();
    for key in 0..20u64 {
        index.insert(key, key + 1000).unwrap();
    }
    drop(index);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(read_u64(&bytes, 8), 2);

    let root = &bytes[2 * BLOCK_SIZE..3 * BLOCK_SIZE];
    assert_eq!(read_u64(root, 0), 2);
    assert_eq!(read_u64(root, 8), 0);
    assert_eq!(read_u64(root, 16), 1);
    assert_eq!(read_u64(root, 24), 9);
    assert_eq!(read_u64(root, 176), 1009);
    // children region starts after 19 keys and 19 values
    assert_eq!(read_u64(root, 328), 1);
    assert_eq!(read_u64(root, 336), 3);

    let left = &bytes[BLOCK_SIZE..2 * BLOCK_SIZE];
    assert_eq!(read_u64(left, 8), 2);
    assert_eq!(read_u64(left, 16), 9);
    assert!(left[328..488].iter().all(|&b| b == 0));
}

// ============================================
// Lookups and updates
// ============================================

#[test]
fn test_insert_then_search() {
    let (mut index, _dir) = create_index();
    index.insert(42, 100).unwrap();

    let hit = index.search(42).unwrap().unwrap();
    assert_eq!(hit.key(), 42);
    assert_eq!(hit.value(), 100);
    assert!(index.search(41).unwrap().is_none());
}

#[test]
fn test_search_empty_index() {
    let (mut index, _dir) = create_index();
    assert!(index.is_empty());
    assert_eq!(index.get(0).unwrap(), None);
    assert_eq!(index.stats().snapshot().blocks_read, 0);
}

#[test]
fn test_update_does_not_allocate() {
    let (mut index, _dir) = create_index();
    for key in 0..100u64 {
        index.insert(key, key).unwrap();
    }
    let header = index.header();

    for key in 0..100u64 {
        assert_eq!(
            index.insert(key, key * 2).unwrap(),
            InsertOutcome::Updated { previous: key }
        );
    }
    assert_eq!(index.header(), header);
    assert_eq!(index.check().unwrap().keys, 100);
    assert_eq!(index.get(77).unwrap(), Some(154));
}

#[test]
fn test_extreme_keys_and_values() {
    let (mut index, _dir) = create_index();
    index.insert(u64::MAX, u64::MAX).unwrap();
    index.insert(0, 0).unwrap();

    assert_eq!(index.get(u64::MAX).unwrap(), Some(u64::MAX));
    assert_eq!(index.get(0).unwrap(), Some(0));
    let entries: Vec<_> = index.iter().collect::<blockdex::Result<_>>().unwrap();
    assert_eq!(entries, vec![(0, 0), (u64::MAX, u64::MAX)]);
}

// ============================================
// Persistence
// ============================================

#[test]
fn test_reopen_preserves_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");

    {
        let mut index = BTreeIndex::create(&path).unwrap();
        for key in (0..1_000u64).rev() {
            index.insert(key, key ^ 0xFF).unwrap();
        }
    }

    let mut index = BTreeIndex::open(&path).unwrap();
    let shape = index.check().unwrap();
    assert_eq!(shape.keys, 1_000);
    for key in [0, 1, 499, 998, 999] {
        assert_eq!(index.get(key).unwrap(), Some(key ^ 0xFF));
    }
    assert_eq!(index.get(1_000).unwrap(), None);
}

#[test]
fn test_cache_capacity_does_not_change_results() {
    let dir = tempdir().unwrap();
    let keys: Vec<u64> = (0..400u64).map(|i| (i * 37) % 401).collect();

    let mut listings = Vec::new();
    for capacity in [0, 1, 3, 16] {
        let path = dir.path().join(format!("cap{capacity}.db"));
        let options = IndexOptions::default().with_cache_capacity(capacity);
        let mut index = BTreeIndex::create_with_options(&path, options).unwrap();
        for &key in &keys {
            index.insert(key, key + 7).unwrap();
        }
        drop(index);

        // Same sequence of operations gives the same bytes
        listings.push(std::fs::read(&path).unwrap());
    }
    assert!(listings.windows(2).all(|pair| pair[0] == pair[1]));
}

// ============================================
// Property-based invariants
// ============================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every inserted key is retrievable with its last value, iteration is
    /// ascending and the structure checks out.
    #[test]
    fn prop_matches_btreemap(pairs in proptest::collection::vec((0u64..2_000, any::<u64>()), 1..300)) {
        let (mut index, _dir) = create_index();
        let mut model = BTreeMap::new();

        for &(key, value) in &pairs {
            let outcome = index.insert(key, value).unwrap();
            match model.insert(key, value) {
                Some(previous) => prop_assert_eq!(outcome, InsertOutcome::Updated { previous }),
                None => prop_assert_eq!(outcome, InsertOutcome::Inserted),
            }
        }

        let shape = index.check().unwrap();
        prop_assert_eq!(shape.keys, model.len() as u64);
        prop_assert_eq!(index.header().next_free.0, shape.nodes + 1);

        let entries: Vec<(u64, u64)> = index.iter().collect::<blockdex::Result<_>>().unwrap();
        let expected: Vec<(u64, u64)> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(entries, expected);

        for (&key, &value) in &model {
            prop_assert_eq!(index.get(key).unwrap(), Some(value));
        }
    }
}
