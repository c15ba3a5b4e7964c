//! Eviction planner: decides where an allocation goes and what must be
//! evicted from that directory to make room.
//!
//! The planner is greedy per directory. It commits to the directory with the
//! most free space and pulls victims from it, oldest first, until the request
//! fits. If the directory runs out of eligible victims first, it is dropped for
//! the rest of the call and the next-best directory is tried. A single plan
//! never spans directories.
//!
//! Planning is a pure read of the directory views. Callers must keep the tier
//! from being mutated for the whole call (see
//! [`plan_eviction_locked`](crate::tier::storage_tier::plan_eviction_locked)).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::tier::block::BlockId;
use crate::tier::dir::DirectoryView;
use crate::tier::recency::RecencySource;
use crate::tier::selector::select_directory;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("No directory among {dirs} can hold {request_size} bytes")]
    InsufficientCapacity { request_size: u64, dirs: usize },

    #[error("Block {block_id} selected in directory {dir} has no known size")]
    UnknownBlock { dir: usize, block_id: BlockId },
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// One block proposed for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionCandidate {
    pub dir: usize,
    pub block_id: BlockId,
    pub size: u64,
}

/// The chosen directory and the blocks to evict from it, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionPlan {
    pub dir: usize,
    pub candidates: Vec<EvictionCandidate>,
}

impl EvictionPlan {
    /// Total bytes freed by executing the plan.
    pub fn bytes_to_evict(&self) -> u64 {
        self.candidates
            .iter()
            .map(|c| c.size)
            .fold(0, u64::saturating_add)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.candidates.iter().map(|c| c.block_id)
    }

    /// Whether the allocation fits without evicting anything.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Plans evictions over one tier's directories.
pub struct EvictionPlanner<'a, D, R> {
    dirs: &'a [D],
    recency: &'a R,
}

impl<'a, D, R> EvictionPlanner<'a, D, R>
where
    D: DirectoryView,
    R: RecencySource,
{
    pub fn new(dirs: &'a [D], recency: &'a R) -> Self {
        Self { dirs, recency }
    }

    /// Find a directory that can hold `request_size` bytes and the blocks to
    /// evict from it.
    ///
    /// Fails with [`PlanError::InsufficientCapacity`] when no directory can be
    /// made to fit, and with [`PlanError::UnknownBlock`] if the recency source
    /// names a block the directory cannot size.
    pub fn plan(
        &self,
        request_size: u64,
        pinned: &HashSet<BlockId>,
        is_last_tier: bool,
    ) -> Result<EvictionPlan> {
        let mut ignored = HashSet::new();

        while let Some(dir) = select_directory(self.dirs, request_size, &ignored) {
            debug!(dir, request_size, "Selected directory");

            match self.plan_in_dir(dir, request_size, pinned, is_last_tier)? {
                Some(plan) => {
                    info!(
                        dir,
                        request_size,
                        candidates = plan.candidates.len(),
                        bytes_to_evict = plan.bytes_to_evict(),
                        "Eviction plan ready"
                    );
                    return Ok(plan);
                }
                None => {
                    ignored.insert(dir);
                }
            }
        }

        warn!(
            request_size,
            dirs = self.dirs.len(),
            "No directory can satisfy request"
        );
        Err(PlanError::InsufficientCapacity {
            request_size,
            dirs: self.dirs.len(),
        })
    }

    /// Collect victims from a single directory. Returns None if the directory
    /// cannot be made to fit.
    fn plan_in_dir(
        &self,
        dir: usize,
        request_size: u64,
        pinned: &HashSet<BlockId>,
        is_last_tier: bool,
    ) -> Result<Option<EvictionPlan>> {
        let view = &self.dirs[dir];
        let available = view.available();

        let mut excluded = HashSet::new();
        let mut candidates = Vec::new();
        let mut size_to_evict: u64 = 0;

        while size_to_evict.saturating_add(available) < request_size {
            let Some(block_id) = self
                .recency
                .oldest_evictable(dir, &excluded, pinned, is_last_tier)
            else {
                break;
            };

            let size = view.block_size(block_id).ok_or_else(|| {
                error!(dir, block_id, "Recency source returned a block with no known size");
                PlanError::UnknownBlock { dir, block_id }
            })?;

            size_to_evict = size_to_evict.saturating_add(size);
            candidates.push(EvictionCandidate {
                dir,
                block_id,
                size,
            });
            excluded.insert(block_id);

            debug!(dir, block_id, size, freed = size_to_evict, "Selected victim");
        }

        if size_to_evict.saturating_add(available) < request_size {
            warn!(
                dir,
                request_size,
                available,
                freed = size_to_evict,
                "Directory cannot be made to fit, trying next"
            );
            return Ok(None);
        }

        Ok(Some(EvictionPlan { dir, candidates }))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// A directory with fixed accounting and an explicit oldest-first order.
    struct TestDir {
        capacity: u64,
        available: u64,
        order: Vec<(BlockId, u64)>,
    }

    impl DirectoryView for TestDir {
        fn capacity(&self) -> u64 {
            self.capacity
        }

        fn available(&self) -> u64 {
            self.available
        }

        fn block_size(&self, block_id: BlockId) -> Option<u64> {
            self.order
                .iter()
                .find(|(id, _)| *id == block_id)
                .map(|(_, size)| *size)
        }
    }

    /// Walks each directory's order and records every lookup.
    struct OrderedRecency<'a> {
        dirs: &'a [TestDir],
        calls: RefCell<Vec<usize>>,
        extra: HashMap<usize, BlockId>,
    }

    impl<'a> OrderedRecency<'a> {
        fn new(dirs: &'a [TestDir]) -> Self {
            Self {
                dirs,
                calls: RefCell::new(Vec::new()),
                extra: HashMap::new(),
            }
        }
    }

    impl RecencySource for OrderedRecency<'_> {
        fn oldest_evictable(
            &self,
            dir: usize,
            excluded: &HashSet<BlockId>,
            pinned: &HashSet<BlockId>,
            _is_last_tier: bool,
        ) -> Option<BlockId> {
            self.calls.borrow_mut().push(dir);
            if let Some(&ghost) = self.extra.get(&dir) {
                return Some(ghost);
            }
            self.dirs[dir]
                .order
                .iter()
                .map(|(id, _)| *id)
                .find(|id| !excluded.contains(id) && !pinned.contains(id))
        }
    }

    fn example_dirs() -> Vec<TestDir> {
        vec![
            TestDir {
                capacity: 100,
                available: 10,
                order: vec![(1, 20), (2, 30), (3, 10)],
            },
            TestDir {
                capacity: 50,
                available: 40,
                order: vec![(4, 10)],
            },
        ]
    }

    #[test]
    fn test_evicts_oldest_until_fit() {
        let dirs = example_dirs();
        let recency = OrderedRecency::new(&dirs);
        let planner = EvictionPlanner::new(&dirs, &recency);

        let plan = planner.plan(60, &HashSet::new(), false).unwrap();
        assert_eq!(plan.dir, 0);
        assert_eq!(plan.block_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(plan.bytes_to_evict(), 50);
    }

    #[test]
    fn test_pinned_block_makes_directory_infeasible() {
        let dirs = example_dirs();
        let recency = OrderedRecency::new(&dirs);
        let planner = EvictionPlanner::new(&dirs, &recency);

        let pinned: HashSet<_> = [1].into_iter().collect();
        let err = planner.plan(60, &pinned, false).unwrap_err();
        assert_eq!(
            err,
            PlanError::InsufficientCapacity {
                request_size: 60,
                dirs: 2,
            }
        );
    }

    #[test]
    fn test_falls_back_to_next_directory() {
        let dirs = vec![
            TestDir {
                capacity: 100,
                available: 50,
                order: vec![(1, 5)],
            },
            TestDir {
                capacity: 100,
                available: 30,
                order: vec![(2, 40), (3, 40)],
            },
        ];
        let recency = OrderedRecency::new(&dirs);
        let planner = EvictionPlanner::new(&dirs, &recency);

        let plan = planner.plan(70, &HashSet::new(), false).unwrap();
        assert_eq!(plan.dir, 1);
        assert_eq!(plan.block_ids().collect::<Vec<_>>(), vec![2]);
        assert!(plan.candidates.iter().all(|c| c.dir == 1));

        // Directory 0 is given up once and never revisited.
        assert_eq!(*recency.calls.borrow(), vec![0, 0, 1]);
    }

    #[test]
    fn test_room_already_available() {
        let dirs = example_dirs();
        let recency = OrderedRecency::new(&dirs);
        let planner = EvictionPlanner::new(&dirs, &recency);

        let plan = planner.plan(40, &HashSet::new(), false).unwrap();
        assert_eq!(plan.dir, 1);
        assert!(plan.is_empty());
        assert!(recency.calls.borrow().is_empty());
    }

    #[test]
    fn test_oversized_request_skips_recency() {
        let dirs = example_dirs();
        let recency = OrderedRecency::new(&dirs);
        let planner = EvictionPlanner::new(&dirs, &recency);

        assert!(matches!(
            planner.plan(101, &HashSet::new(), false),
            Err(PlanError::InsufficientCapacity { .. })
        ));
        assert!(recency.calls.borrow().is_empty());
    }

    #[test]
    fn test_unknown_block_aborts() {
        let dirs = example_dirs();
        let mut recency = OrderedRecency::new(&dirs);
        recency.extra.insert(0, 99);
        let planner = EvictionPlanner::new(&dirs, &recency);

        assert_eq!(
            planner.plan(60, &HashSet::new(), false),
            Err(PlanError::UnknownBlock { dir: 0, block_id: 99 })
        );
        assert_eq!(recency.calls.borrow().len(), 1);
    }

    #[test]
    fn test_zero_request_is_empty_plan() {
        let dirs = example_dirs();
        let recency = OrderedRecency::new(&dirs);
        let planner = EvictionPlanner::new(&dirs, &recency);

        let plan = planner.plan(0, &HashSet::new(), false).unwrap();
        assert_eq!(plan.dir, 1);
        assert!(plan.is_empty());
    }
}
