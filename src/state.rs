//! Persisted blocklist snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use tracing::warn;

use crate::config::Paths;
use crate::profiles::Profile;

/// The durable state written after every successful run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub profile: Profile,
    pub ipv4: BTreeSet<Ipv4Net>,
    pub ipv6: BTreeSet<Ipv6Net>,
    pub last_updated: DateTime<Utc>,
    pub ipv4_count: usize,
    pub ipv6_count: usize,
    pub total_count: usize,
}

impl Snapshot {
    pub fn new(profile: Profile, ipv4: BTreeSet<Ipv4Net>, ipv6: BTreeSet<Ipv6Net>) -> Self {
        // Total is the size of both sets treated as one collection. The
        // families can never compare equal, so this matches the per-family
        // sum, but the union is what the metric means.
        let total_count = ipv4
            .iter()
            .map(|net| IpNet::V4(*net))
            .chain(ipv6.iter().map(|net| IpNet::V6(*net)))
            .collect::<BTreeSet<IpNet>>()
            .len();
        Self {
            profile,
            ipv4_count: ipv4.len(),
            ipv6_count: ipv6.len(),
            total_count,
            ipv4,
            ipv6,
            last_updated: Utc::now(),
        }
    }

    pub fn empty(profile: Profile) -> Self {
        Self::new(profile, BTreeSet::new(), BTreeSet::new())
    }

    /// Load the previous snapshot.
    ///
    /// A missing file is a normal first run. An unreadable or undecodable
    /// file is reported and treated as absent, so the run proceeds as a
    /// full replace.
    pub fn load(paths: &Paths) -> Option<Snapshot> {
        let path = paths.snapshot_file();
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Could not read snapshot {}: {}; treating as no prior state",
                    path.display(),
                    e
                );
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(
                    "Snapshot {} is corrupt: {}; treating as no prior state",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Persist atomically: write a sibling temp file, then rename over the
    /// live path.
    pub fn save(&self, paths: &Paths) -> Result<()> {
        let path = paths.snapshot_file();
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}
