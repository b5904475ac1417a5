//! Select the active blocking profile.

use anyhow::Result;
use tracing::info;

use crate::config::Paths;
use crate::profiles::Profile;
use crate::state::Snapshot;

/// Persist the profile choice; it takes effect on the next refresh.
pub async fn run(profile: Profile, paths: &Paths) -> Result<()> {
    super::check_root()?;
    paths.bootstrap()?;

    let snapshot = match Snapshot::load(paths) {
        Some(mut snapshot) => {
            snapshot.profile = profile;
            snapshot
        }
        None => {
            info!("No snapshot yet; profile will apply on the next refresh");
            Snapshot::empty(profile)
        }
    };
    snapshot.save(paths)?;
    println!("Active profile set to '{profile}'");
    Ok(())
}
