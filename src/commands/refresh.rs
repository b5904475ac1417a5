//! Refresh command implementation.

use anyhow::Result;

use crate::cmd_abstraction::RealCommandExecutor;
use crate::config::Paths;
use crate::lock::LockGuard;
use crate::pipeline::{self, RefreshMode};

/// Run a refresh, incremental by default.
pub async fn run(full: bool, paths: &Paths) -> Result<()> {
    super::check_root()?;
    paths.bootstrap()?;
    let _lock = LockGuard::acquire(paths)?;

    let mode = if full {
        RefreshMode::Full
    } else {
        RefreshMode::Incremental
    };

    let executor = RealCommandExecutor::new();
    let snapshot = pipeline::run_refresh(mode, paths, &executor).await?;

    println!(
        "Blocklist updated: {} IPv4, {} IPv6, {} total ranges",
        snapshot.ipv4_count, snapshot.ipv6_count, snapshot.total_count
    );
    Ok(())
}
