//! Recency source: picks the least-recently-used block that may be evicted.
//!
//! Eligibility depends on one policy axis, whether the tier being evicted is
//! the last one. Eviction from a non-last tier demotes a block, so its data
//! survives; eviction from the last tier destroys it.

use std::collections::HashSet;

use crate::config::EvictionConfig;
use crate::tier::block::{BlockId, BlockMeta};
use crate::tier::dir::StorageDir;

/// Supplies victims to the planner, oldest first.
pub trait RecencySource {
    /// Return the eligible block in directory `dir` with the oldest access
    /// time, skipping anything in `excluded` or `pinned`. None when no
    /// eligible block remains.
    fn oldest_evictable(
        &self,
        dir: usize,
        excluded: &HashSet<BlockId>,
        pinned: &HashSet<BlockId>,
        is_last_tier: bool,
    ) -> Option<BlockId>;
}

/// Decides whether a single block may be evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityPolicy {
    /// Refuse to evict blocks from the last tier that have not been persisted.
    pub protect_unpersisted_in_last_tier: bool,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            protect_unpersisted_in_last_tier: true,
        }
    }
}

impl From<&EvictionConfig> for EligibilityPolicy {
    fn from(config: &EvictionConfig) -> Self {
        Self {
            protect_unpersisted_in_last_tier: config.protect_unpersisted_in_last_tier,
        }
    }
}

impl EligibilityPolicy {
    pub fn is_evictable(
        &self,
        block: &BlockMeta,
        pinned: &HashSet<BlockId>,
        is_last_tier: bool,
    ) -> bool {
        if pinned.contains(&block.id) || block.is_locked() {
            return false;
        }
        if is_last_tier && self.protect_unpersisted_in_last_tier {
            return block.persisted;
        }
        true
    }
}

/// LRU recency source over a tier's directory inventories.
pub struct LruRecency<'a> {
    dirs: &'a [StorageDir],
    policy: EligibilityPolicy,
}

impl<'a> LruRecency<'a> {
    pub fn new(dirs: &'a [StorageDir], policy: EligibilityPolicy) -> Self {
        Self { dirs, policy }
    }
}

impl RecencySource for LruRecency<'_> {
    fn oldest_evictable(
        &self,
        dir: usize,
        excluded: &HashSet<BlockId>,
        pinned: &HashSet<BlockId>,
        is_last_tier: bool,
    ) -> Option<BlockId> {
        let dir = self.dirs.get(dir)?;

        // Ties on access time go to the smaller id so plans are reproducible.
        dir.blocks()
            .filter(|b| !excluded.contains(&b.id))
            .filter(|b| self.policy.is_evictable(b, pinned, is_last_tier))
            .min_by_key(|b| (b.last_access_ms, b.id))
            .map(|b| b.id)
    }
}
