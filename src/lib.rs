//! blockdex - A single-file, disk-resident B-tree index of `u64` keys to `u64` values.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            blockdex                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │       Commands (commands.rs, bulk.rs, main.rs)           │   │
//! │  │   create | insert | search | load | print | extract      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree/)                  │   │
//! │  │   search, preemptive-split insert, in-order iteration    │   │
//! │  │        BlockAllocator: one header commit per insert      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Node Cache (cache/)                      │   │
//! │  │     FIFO, 3 nodes, fresh per operation + IndexStats      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │         BlockFile + Block + Header + Node codec          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # File Layout
//! Block 0 holds the header (magic `4348PRJ3`, root id, next free id).
//! Every other block holds one node. All integers are big-endian `u64`.
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, config)
//! - [`storage`] - Block I/O and the on-disk formats
//! - [`cache`] - Per-operation node cache and I/O statistics
//! - [`index`] - The B-tree engine
//! - [`bulk`] - CSV load and export
//! - [`commands`] - One function per command-line subcommand
//!
//! # Quick Start
//! ```no_run
//! use blockdex::BTreeIndex;
//!
//! let mut index = BTreeIndex::create("numbers.idx")?;
//! index.insert(15, 100)?;
//! assert_eq!(index.get(15)?, Some(100));
//! # Ok::<(), blockdex::Error>(())
//! ```

pub mod bulk;
pub mod cache;
pub mod commands;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::BLOCK_SIZE;
pub use common::{BlockId, Error, ErrorKind, IndexOptions, Result};

pub use bulk::LoadSummary;
pub use cache::{IndexStats, NodeCache, StatsSnapshot};
pub use index::{BTreeIndex, InsertOutcome, Iter, SearchHit, TreeShape};
pub use storage::block::{Block, Header, Node, NodeKind};
pub use storage::BlockFile;
