//! tier-evict: dry-run eviction planner.
//!
//! Loads a tier snapshot, plans room for a request and prints the plan as
//! JSON. Nothing is evicted.

use std::collections::HashSet;

use clap::Parser;
use tracing::info;

use tier_evict::config::{Cli, Config};
use tier_evict::tier::snapshot::TierSnapshot;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging. Logs go to stderr so stdout stays JSON.
    let filter = if cli.verbose {
        "tier_evict=debug"
    } else {
        "tier_evict=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("tier-evict v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration and the tier to plan against.
    let config = Config::load(&cli.config)?;
    let tier = TierSnapshot::load(&cli.snapshot)?.into_storage_tier(&config)?;

    info!(
        tier = %tier.tier(),
        dirs = tier.dirs().len(),
        capacity = tier.total_capacity(),
        available = tier.total_available(),
        last_tier = tier.is_last_tier(),
        "Tier loaded"
    );

    let pinned: HashSet<u64> = cli.pins.into_iter().collect();
    let plan = tier.plan_eviction(cli.request_size, &pinned)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
