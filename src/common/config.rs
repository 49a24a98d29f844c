//! Format constants and runtime options for blockdex.

use std::env;

/// Size of a block in bytes.
///
/// Every block in the index file, header included, is exactly this size.
/// Block N is located at file offset `N × BLOCK_SIZE`.
pub const BLOCK_SIZE: usize = 512;

/// Tag stored in the first 8 bytes of block 0.
pub const MAGIC: [u8; 8] = *b"4348PRJ3";

/// Minimum degree `t` of the tree.
///
/// # Bounds
/// - Non-root nodes hold between `t - 1 = 9` and `2t - 1 = 19` keys
/// - Internal nodes have between `t = 10` and `2t = 20` children
/// - The root is exempt from the lower bounds
pub const MIN_DEGREE: usize = 10;

/// Maximum number of keys in a node (`2t - 1`).
pub const MAX_KEYS: usize = 2 * MIN_DEGREE - 1;

/// Minimum number of keys in a non-root node (`t - 1`).
pub const MIN_KEYS: usize = MIN_DEGREE - 1;

/// Maximum number of children of an internal node (`2t`).
pub const MAX_CHILDREN: usize = 2 * MIN_DEGREE;

/// Node cache capacity used when nothing else is configured.
pub const DEFAULT_NODE_CACHE_CAPACITY: usize = 3;

/// Environment variable that overrides the node cache capacity.
pub const NODE_CACHE_CAPACITY_ENV: &str = "BLOCKDEX_NODE_CACHE_CAPACITY";

/// Runtime knobs for an open index.
///
/// The on-disk format is fixed, so the only tunable is how many decoded
/// nodes a single operation keeps around.
///
/// # Example
/// ```
/// use blockdex::IndexOptions;
///
/// let options = IndexOptions::default().with_cache_capacity(8);
/// assert_eq!(options.cache_capacity, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Capacity of the per-operation node cache. Zero disables caching.
    pub cache_capacity: usize,
}

impl IndexOptions {
    /// Build options from the environment, falling back to defaults.
    ///
    /// An unparsable `BLOCKDEX_NODE_CACHE_CAPACITY` is ignored with a warning.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(raw) = env::var(NODE_CACHE_CAPACITY_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => options.cache_capacity = capacity,
                Err(err) => tracing::warn!(
                    "ignoring {NODE_CACHE_CAPACITY_ENV}={raw:?}: {err}"
                ),
            }
        }
        options
    }

    /// Set the node cache capacity.
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_NODE_CACHE_CAPACITY,
        }
    }
}
