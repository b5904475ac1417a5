//! The feed-aggregation pipeline and snapshot reconciliation.
//!
//! Control flow: poll every source of the active profile, parse each
//! payload on the blocking pool, union and collapse per family, reconcile
//! against the previous snapshot, regenerate artifacts, reload firewalld,
//! and persist the new snapshot.

use anyhow::{Context, Result};
use ipnet::{Ipv4Net, Ipv6Net};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use tracing::{debug, error, info};

use crate::activator::reload_firewalld;
use crate::aggregator::{collapse_v4, collapse_v6};
use crate::artifacts;
use crate::cmd_abstraction::CommandExecutor;
use crate::config::Paths;
use crate::fetcher::{Fetcher, SourceResult};
use crate::parser::{parse_result, ParsedRanges};
use crate::profiles::Profile;
use crate::state::Snapshot;

/// How a refresh reconciles against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Keep previous ranges; append only newly seen ones.
    Incremental,
    /// Discard the previous snapshot and rebuild from scratch.
    Full,
}

/// Run a refresh end to end.
pub async fn run_refresh(
    mode: RefreshMode,
    paths: &Paths,
    executor: &dyn CommandExecutor,
) -> Result<Snapshot> {
    let previous = Snapshot::load(paths);
    let profile = match &previous {
        Some(snapshot) => snapshot.profile,
        None => {
            info!("No set profile found, falling back to default");
            Profile::default()
        }
    };

    let fetched = poll_and_parse(profile).await?;
    let ipv4 = collapse_v4(&fetched.ipv4);
    let ipv6 = collapse_v6(&fetched.ipv6);
    info!(
        "Collapsed to {} IPv4 and {} IPv6 ranges",
        ipv4.len(),
        ipv6.len()
    );

    reconcile_and_apply(mode, ipv4, ipv6, profile, previous, paths, executor)
}

/// Fetch all sources of `profile` and parse the payloads concurrently.
async fn poll_and_parse(profile: Profile) -> Result<ParsedRanges> {
    info!("Polling sources for profile '{}'...", profile);
    let fetcher = Fetcher::new()?;
    let results = fetcher.fetch_all(profile.sources()).await;
    parse_results(results).await
}

/// Parse fetched payloads on the blocking pool and merge them.
///
/// Fatal only when not a single source yielded a parseable range; prior
/// state is untouched in that case, because nothing downstream runs.
pub async fn parse_results(results: Vec<SourceResult>) -> Result<ParsedRanges> {
    info!("Parsing feed data...");
    let mut workers = Vec::with_capacity(results.len());
    for result in results {
        workers.push(tokio::task::spawn_blocking(move || parse_result(&result)));
    }

    let mut merged = ParsedRanges::default();
    for worker in workers {
        merged.extend(worker.await.context("parse worker panicked")?);
    }

    if merged.is_empty() {
        error!("Failed to receive any valid response from any source");
        anyhow::bail!("no source yielded any usable data; aborting");
    }
    Ok(merged)
}

/// Reconcile collapsed range sets against the previous snapshot, regenerate
/// artifacts, trigger activation, and persist the result.
///
/// Activation failure is reported but the snapshot is still written; the
/// configuration on disk is already correct at that point.
pub fn reconcile_and_apply(
    mode: RefreshMode,
    new_v4: BTreeSet<Ipv4Net>,
    new_v6: BTreeSet<Ipv6Net>,
    profile: Profile,
    previous: Option<Snapshot>,
    paths: &Paths,
    executor: &dyn CommandExecutor,
) -> Result<Snapshot> {
    let can_append = paths.ipset_v4().exists() && paths.ipset_v6().exists();
    let snapshot = match (mode, previous) {
        (RefreshMode::Incremental, Some(prev)) if can_append => {
            let add_v4: BTreeSet<Ipv4Net> = new_v4.difference(&prev.ipv4).copied().collect();
            let add_v6: BTreeSet<Ipv6Net> = new_v6.difference(&prev.ipv6).copied().collect();
            artifacts::append_entries(paths, &add_v4, &add_v6)?;

            let merged_v4: BTreeSet<Ipv4Net> = prev.ipv4.union(&new_v4).copied().collect();
            let merged_v6: BTreeSet<Ipv6Net> = prev.ipv6.union(&new_v6).copied().collect();
            Snapshot::new(profile, merged_v4, merged_v6)
        }
        (mode, _) => {
            if mode == RefreshMode::Incremental {
                info!("No previous snapshot or live ipsets; performing a full replace");
            }
            artifacts::write_full(paths, &new_v4, &new_v6)?;
            Snapshot::new(profile, new_v4, new_v6)
        }
    };

    reload_firewalld(executor);

    snapshot.save(paths).context("Failed to persist snapshot")?;
    info!(
        "Blocklist updated: {} ranges total ({} IPv4, {} IPv6)",
        snapshot.total_count, snapshot.ipv4_count, snapshot.ipv6_count
    );
    Ok(snapshot)
}

/// Remove all generated artifacts and stored state, then deactivate.
///
/// A no-op success when neither a snapshot nor any live artifact exists.
pub fn run_reset(paths: &Paths, executor: &dyn CommandExecutor) -> Result<()> {
    let live = paths.live_artifacts();
    let has_artifact = live.iter().any(|path| path.exists());
    let has_snapshot = paths.snapshot_file().exists();

    if !has_artifact && !has_snapshot {
        info!("No blocklist state or artifacts present");
        println!("Nothing to remove: no snapshot or firewall artifacts found.");
        return Ok(());
    }

    for path in &live {
        match fs::remove_file(path) {
            Ok(()) => info!("Removed {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist, skipping", path.display());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to remove {}", path.display()));
            }
        }
    }

    if paths.state_dir.exists() {
        fs::remove_dir_all(&paths.state_dir).with_context(|| {
            format!("Failed to remove state directory {}", paths.state_dir.display())
        })?;
        info!("Removed {}", paths.state_dir.display());
    }

    reload_firewalld(executor);
    Ok(())
}
