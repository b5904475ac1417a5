//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_FIREWALLD_DIR, DEFAULT_STATE_DIR};
use crate::profiles::Profile;

#[derive(Parser)]
#[command(name = "firewalld-ext")]
#[command(author, version, about = "Threat-intelligence denylist manager for firewalld")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only; for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Application state directory
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    pub state_dir: PathBuf,

    /// firewalld configuration directory
    #[arg(long, global = true, default_value = DEFAULT_FIREWALLD_DIR)]
    pub firewalld_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update blocked CIDRs from the active profile's feeds
    Refresh {
        /// Discard all prior entries and rebuild from scratch
        #[arg(long)]
        full: bool,
    },

    /// Remove all blocked CIDRs, firewall artifacts, and stored state
    Reset,

    /// Show blocklist status and statistics
    Status,

    /// Dump all currently blocked CIDR ranges
    ShowSubnets,

    /// Set the active profile
    SetProfile {
        /// Profile name
        #[arg(value_enum)]
        profile: Profile,
    },
}
