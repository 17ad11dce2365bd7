//! Memoisation of parent block to child block range lookups.

use core::{future::Future, num::NonZeroUsize};
use lru::LruCache;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Default number of ranges kept by a [`BlockRangeCache`].
pub const DEFAULT_BLOCK_RANGE_CACHE_SIZE: usize = 1024;

/// Key of a cached range: the chain the range lives on, and the parent block it maps.
pub type BlockRangeKey = (u64, u64);

/// A block range, both ends inclusive.
pub type BlockRange = (u64, u64);

/// A concurrent cache of the block ranges an Arbitrum chain produced at a given parent block.
///
/// Lookups are single-flight: concurrent callers asking for the same key wait for the first
/// computation instead of starting their own. Failed computations are not cached.
#[derive(Debug, Clone)]
pub struct BlockRangeCache {
    entries: Arc<Mutex<LruCache<BlockRangeKey, Arc<OnceCell<BlockRange>>>>>,
}

impl Default for BlockRangeCache {
    fn default() -> Self {
        Self::new(
            NonZeroUsize::new(DEFAULT_BLOCK_RANGE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
        )
    }
}

impl BlockRangeCache {
    /// Creates a cache holding up to `capacity` ranges.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { entries: Arc::new(Mutex::new(LruCache::new(capacity))) }
    }

    /// Returns the cached range for `key`, computing it with `init` if absent.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: BlockRangeKey,
        init: F,
    ) -> Result<BlockRange, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BlockRange, E>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.get_or_insert(key, || Arc::new(OnceCell::new())).clone()
        };
        if let Some(range) = cell.get() {
            tracing::trace!(target: "block_range_cache", chain = key.0, block = key.1, "cache hit");
            return Ok(*range);
        }
        cell.get_or_try_init(init).await.copied()
    }

    /// Returns the cached range for `key` without computing it.
    pub async fn get(&self, key: BlockRangeKey) -> Option<BlockRange> {
        let mut entries = self.entries.lock().await;
        entries.get(&key).and_then(|cell| cell.get().copied())
    }
}
