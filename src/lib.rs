//! tier-evict: eviction planning for tiered block storage.
//!
//! Given the directories of one storage tier, a requested amount of free
//! space and a set of pinned blocks, decides which directory receives the
//! data and which least-recently-used blocks must leave it first.

pub mod config;
pub mod tier;
