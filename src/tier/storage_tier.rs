//! A storage tier: the directories of one tier plus the policy used to
//! evict from them.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::tier::block::{BlockId, Tier};
use crate::tier::dir::{DirectoryView, StorageDir};
use crate::tier::planner::{EvictionPlan, EvictionPlanner, Result};
use crate::tier::recency::{EligibilityPolicy, LruRecency};

#[derive(Debug)]
pub struct StorageTier {
    tier: Tier,
    dirs: Vec<StorageDir>,
    last_tier: bool,
    policy: EligibilityPolicy,
}

impl StorageTier {
    pub fn new(
        tier: Tier,
        dirs: Vec<StorageDir>,
        last_tier: bool,
        policy: EligibilityPolicy,
    ) -> Self {
        Self {
            tier,
            dirs,
            last_tier,
            policy,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Whether this is the lowest tier of the hierarchy.
    pub fn is_last_tier(&self) -> bool {
        self.last_tier
    }

    pub fn dirs(&self) -> &[StorageDir] {
        &self.dirs
    }

    pub fn dir(&self, index: usize) -> Option<&StorageDir> {
        self.dirs.get(index)
    }

    pub fn dir_mut(&mut self, index: usize) -> Option<&mut StorageDir> {
        self.dirs.get_mut(index)
    }

    pub fn total_capacity(&self) -> u64 {
        self.dirs
            .iter()
            .map(|d| d.capacity())
            .fold(0, u64::saturating_add)
    }

    pub fn total_available(&self) -> u64 {
        self.dirs
            .iter()
            .map(|d| d.available())
            .fold(0, u64::saturating_add)
    }

    /// Plan room for `request_size` bytes in one of this tier's directories,
    /// evicting least-recently-used blocks as needed.
    pub fn plan_eviction(
        &self,
        request_size: u64,
        pinned: &HashSet<BlockId>,
    ) -> Result<EvictionPlan> {
        debug!(
            tier = %self.tier,
            request_size,
            pinned = pinned.len(),
            last_tier = self.last_tier,
            "Planning eviction"
        );
        let recency = LruRecency::new(&self.dirs, self.policy);
        EvictionPlanner::new(&self.dirs, &recency).plan(request_size, pinned, self.last_tier)
    }
}

/// Thread-safe wrapper around a tier.
pub type SharedTier = Arc<RwLock<StorageTier>>;

pub fn new_shared_tier(tier: StorageTier) -> SharedTier {
    Arc::new(RwLock::new(tier))
}

/// Plan an eviction while holding the tier's write lock, so no read, write or
/// other eviction can change the directories while the plan is built.
pub async fn plan_eviction_locked(
    tier: &SharedTier,
    request_size: u64,
    pinned: &HashSet<BlockId>,
) -> Result<EvictionPlan> {
    let guard = tier.write().await;
    guard.plan_eviction(request_size, pinned)
}
