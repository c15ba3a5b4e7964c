//! Runtime configuration for tier-evict.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! The tier hierarchy and eviction eligibility knobs live here.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::tier::block::Tier;
use crate::tier::recency::EligibilityPolicy;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "tier-evict", about = "Dry-run eviction planner for a storage tier")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Path to the tier snapshot (JSON).
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Bytes of free space to make room for.
    #[arg(short, long)]
    pub request_size: u64,

    /// Block that must not be evicted (repeatable).
    #[arg(short, long = "pin")]
    pub pins: Vec<u64>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tier hierarchy.
    #[serde(default)]
    pub tiers: TierConfig,

    /// Eviction policy tuning.
    #[serde(default)]
    pub eviction: EvictionConfig,
}

/// Tier hierarchy, fastest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Tiers present on this worker, ordered from fastest to slowest.
    pub levels: Vec<Tier>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            levels: vec![Tier::Mem, Tier::Ssd, Tier::Hdd],
        }
    }
}

impl TierConfig {
    /// Whether `tier` is the lowest configured tier.
    pub fn is_last(&self, tier: Tier) -> bool {
        self.levels.last() == Some(&tier)
    }
}

/// Eviction eligibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvictionConfig {
    /// Never evict unpersisted blocks from the last tier, where eviction
    /// deletes the only copy.
    pub protect_unpersisted_in_last_tier: bool,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            protect_unpersisted_in_last_tier: true,
        }
    }
}

impl EvictionConfig {
    pub fn policy(&self) -> EligibilityPolicy {
        EligibilityPolicy::from(self)
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}
