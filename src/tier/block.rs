//! Block and tier types.
//!
//! A block is the unit of eviction. Each block lives in exactly one storage
//! directory of one tier and carries the metadata the LRU scan needs.

use serde::{Deserialize, Serialize};

/// Identifies a storage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Tier 0: memory (hot).
    Mem,
    /// Tier 1: SSD (warm).
    Ssd,
    /// Tier 2: HDD (cold).
    Hdd,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Mem => write!(f, "MEM"),
            Tier::Ssd => write!(f, "SSD"),
            Tier::Hdd => write!(f, "HDD"),
        }
    }
}

/// Unique identifier for a block.
pub type BlockId = u64;

/// Metadata for one resident block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Unique identifier for this block.
    pub id: BlockId,

    /// Size of the block in bytes.
    pub size: u64,

    /// Timestamp of last access, in milliseconds.
    pub last_access_ms: u64,

    /// Whether the block has been checkpointed to the under storage.
    #[serde(default)]
    pub persisted: bool,

    /// Number of readers currently holding the block.
    #[serde(default)]
    pub lock_count: u32,
}

impl BlockMeta {
    pub fn new(id: BlockId, size: u64, last_access_ms: u64) -> Self {
        Self {
            id,
            size,
            last_access_ms,
            persisted: false,
            lock_count: 0,
        }
    }

    /// Mark the block as persisted.
    pub fn persisted(mut self) -> Self {
        self.persisted = true;
        self
    }

    /// Record an access at `now_ms`.
    ///
    /// Access times never move backwards, so a late-arriving older timestamp
    /// leaves the block's recency unchanged.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_access_ms = self.last_access_ms.max(now_ms);
    }

    /// Whether a reader currently holds this block.
    pub fn is_locked(&self) -> bool {
        self.lock_count > 0
    }
}
