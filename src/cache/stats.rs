//! Index statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by an open index.
///
/// Counters use `Ordering::Relaxed`; each is independent and only read
/// for reporting.
///
/// # Example
/// ```
/// use blockdex::IndexStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IndexStats::new();
/// stats.cache_hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().cache_hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Node lookups served by the per-operation cache.
    pub cache_hits: AtomicU64,

    /// Node lookups that had to read a block.
    pub cache_misses: AtomicU64,

    /// Blocks read from the file.
    pub blocks_read: AtomicU64,

    /// Blocks written to the file, header included.
    pub blocks_written: AtomicU64,

    /// Node splits performed by inserts.
    pub splits: AtomicU64,
}

impl IndexStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.blocks_read.store(0, Ordering::Relaxed);
        self.blocks_written.store(0, Ordering::Relaxed);
        self.splits.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub blocks_read: u64,
    pub blocks_written: u64,
    pub splits: u64,
}

impl StatsSnapshot {
    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, writes: {}, splits: {}, cache hits: {}, misses: {}, hit_rate: {:.2}% }}",
            self.blocks_read,
            self.blocks_written,
            self.splits,
            self.cache_hits,
            self.cache_misses,
            self.hit_rate() * 100.0
        )
    }
}
