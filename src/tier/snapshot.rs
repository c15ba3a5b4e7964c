//! Serialized snapshot of one tier's directory inventories.
//!
//! Lets a tier be reconstructed from JSON, for dry-run planning and tests.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::tier::block::{BlockMeta, Tier};
use crate::tier::dir::StorageDir;
use crate::tier::storage_tier::StorageTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirSnapshot {
    pub path: PathBuf,
    pub capacity: u64,
    #[serde(default)]
    pub blocks: Vec<BlockMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSnapshot {
    pub tier: Tier,
    pub dirs: Vec<DirSnapshot>,
}

impl TierSnapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading tier snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("parsing tier snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    /// Rebuild the tier, with last-tier status and eviction policy taken from
    /// the configuration.
    pub fn into_storage_tier(self, config: &Config) -> anyhow::Result<StorageTier> {
        let mut dirs = Vec::with_capacity(self.dirs.len());
        for snapshot in self.dirs {
            let mut dir = StorageDir::new(snapshot.path, snapshot.capacity);
            for block in snapshot.blocks {
                dir.add_block(block)
                    .with_context(|| format!("loading directory {}", dir.path().display()))?;
            }
            dirs.push(dir);
        }

        Ok(StorageTier::new(
            self.tier,
            dirs,
            config.tiers.is_last(self.tier),
            config.eviction.policy(),
        ))
    }
}
