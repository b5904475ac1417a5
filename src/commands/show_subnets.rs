//! Dump all currently blocked CIDR ranges.

use anyhow::Result;

use crate::config::Paths;
use crate::state::Snapshot;

pub async fn run(paths: &Paths) -> Result<()> {
    match Snapshot::load(paths) {
        Some(snapshot) => {
            println!("IPv4 networks:");
            for net in &snapshot.ipv4 {
                println!("\t{net}");
            }
            println!();
            println!("IPv6 networks:");
            for net in &snapshot.ipv6 {
                println!("\t{net}");
            }
        }
        None => {
            println!("No blocklist snapshot found. Run 'firewalld-ext refresh' first.");
        }
    }
    Ok(())
}
