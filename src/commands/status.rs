//! Status command: snapshot summary.

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::config::Paths;
use crate::state::Snapshot;

pub async fn run(paths: &Paths) -> Result<()> {
    match Snapshot::load(paths) {
        Some(snapshot) => {
            let local: DateTime<Local> = snapshot.last_updated.into();
            println!("Profile: {}", snapshot.profile);
            println!("IPv4 networks: {}", snapshot.ipv4_count);
            println!("IPv6 networks: {}", snapshot.ipv6_count);
            println!("Total networks blocked: {}", snapshot.total_count);
            println!("Last updated: {}", local.format("%Y-%m-%d %H:%M:%S"));
        }
        None => {
            println!("No blocklist snapshot found. Run 'firewalld-ext refresh' first.");
        }
    }
    Ok(())
}
