//! Storage directories.
//!
//! [`DirectoryView`] is the read-only surface the planner consumes.
//! [`StorageDir`] is the in-memory inventory a worker keeps for each
//! directory of a tier, and implements that view.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tier::block::{BlockId, BlockMeta};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Block {0} already resident")]
    DuplicateBlock(BlockId),

    #[error("Block {0} not resident")]
    UnknownBlock(BlockId),

    #[error("Not enough space for block {block_id}: need {size} bytes, {available} available")]
    NoSpace {
        block_id: BlockId,
        size: u64,
        available: u64,
    },

    #[error("Block {0} is not locked")]
    NotLocked(BlockId),
}

/// Read-only view of one storage directory.
pub trait DirectoryView {
    /// Total bytes this directory can ever hold.
    fn capacity(&self) -> u64;

    /// Bytes currently free.
    fn available(&self) -> u64;

    /// Size of a resident block, or None if the block is not in this directory.
    fn block_size(&self, block_id: BlockId) -> Option<u64>;
}

/// In-memory inventory of a single storage directory.
#[derive(Debug, Clone)]
pub struct StorageDir {
    path: PathBuf,
    capacity: u64,
    used: u64,
    blocks: HashMap<BlockId, BlockMeta>,
}

impl StorageDir {
    /// Create an empty directory with the given capacity in bytes.
    pub fn new(path: impl Into<PathBuf>, capacity: u64) -> Self {
        Self {
            path: path.into(),
            capacity,
            used: 0,
            blocks: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes occupied by resident blocks.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Register a block, reserving its size.
    pub fn add_block(&mut self, block: BlockMeta) -> Result<(), InventoryError> {
        if self.blocks.contains_key(&block.id) {
            return Err(InventoryError::DuplicateBlock(block.id));
        }
        let available = self.available();
        if block.size > available {
            return Err(InventoryError::NoSpace {
                block_id: block.id,
                size: block.size,
                available,
            });
        }

        self.used += block.size;
        self.blocks.insert(block.id, block);
        Ok(())
    }

    /// Remove a block, releasing its space.
    pub fn remove_block(&mut self, block_id: BlockId) -> Result<BlockMeta, InventoryError> {
        let block = self
            .blocks
            .remove(&block_id)
            .ok_or(InventoryError::UnknownBlock(block_id))?;
        self.used = self.used.saturating_sub(block.size);
        Ok(block)
    }

    /// Record an access to a block.
    pub fn touch_block(&mut self, block_id: BlockId, now_ms: u64) -> Result<(), InventoryError> {
        self.block_mut(block_id)?.touch(now_ms);
        Ok(())
    }

    /// Take a reader lock on a block; locked blocks are never evicted.
    pub fn lock_block(&mut self, block_id: BlockId) -> Result<(), InventoryError> {
        let block = self.block_mut(block_id)?;
        block.lock_count += 1;
        Ok(())
    }

    /// Release a reader lock taken with [`StorageDir::lock_block`].
    pub fn unlock_block(&mut self, block_id: BlockId) -> Result<(), InventoryError> {
        let block = self.block_mut(block_id)?;
        if block.lock_count == 0 {
            return Err(InventoryError::NotLocked(block_id));
        }
        block.lock_count -= 1;
        Ok(())
    }

    pub fn block(&self, block_id: BlockId) -> Option<&BlockMeta> {
        self.blocks.get(&block_id)
    }

    /// All resident blocks, in no particular order.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockMeta> {
        self.blocks.values()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn block_mut(&mut self, block_id: BlockId) -> Result<&mut BlockMeta, InventoryError> {
        self.blocks
            .get_mut(&block_id)
            .ok_or(InventoryError::UnknownBlock(block_id))
    }
}

impl DirectoryView for StorageDir {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn available(&self) -> u64 {
        self.capacity.saturating_sub(self.used)
    }

    fn block_size(&self, block_id: BlockId) -> Option<u64> {
        self.blocks.get(&block_id).map(|b| b.size)
    }
}
