//! Per-operation node caching.
//!
//! Each top-level engine operation builds a fresh [`NodeCache`] and drops
//! it when done, so nothing is memoized across calls. [`IndexStats`] lives
//! on the index handle and accumulates over the handle's lifetime.
//!
//! # Components
//! - [`NodeCache`] - Bounded FIFO map from block id to decoded node
//! - [`IndexStats`] - Cache and block I/O counters

mod node_cache;
mod stats;

pub use node_cache::NodeCache;
pub use stats::{IndexStats, StatsSnapshot};
