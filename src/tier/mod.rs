//! Eviction planning for one storage tier.
//!
//! - [`block`]: Tier and block metadata
//! - [`dir`]: Directory view and in-memory directory inventory
//! - [`recency`]: LRU victim source and eligibility policy
//! - [`selector`]: Picks the directory with the most free space
//! - [`planner`]: Builds eviction plans
//! - [`storage_tier`]: A tier's directories plus locking for callers
//! - [`snapshot`]: JSON snapshots of a tier

pub mod block;
pub mod dir;
pub mod planner;
pub mod recency;
pub mod selector;
pub mod snapshot;
pub mod storage_tier;
