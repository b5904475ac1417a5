//! firewalld-ext - Threat-intelligence denylist manager for firewalld.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use firewalld_ext::cli::{Cli, Commands};
use firewalld_ext::config::Paths;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let paths = Paths::new(&cli.state_dir, &cli.firewalld_dir);

    match cli.command {
        Commands::Refresh { full } => firewalld_ext::commands::refresh::run(full, &paths).await,
        Commands::Reset => firewalld_ext::commands::reset::run(&paths).await,
        Commands::Status => firewalld_ext::commands::status::run(&paths).await,
        Commands::ShowSubnets => firewalld_ext::commands::show_subnets::run(&paths).await,
        Commands::SetProfile { profile } => {
            firewalld_ext::commands::set_profile::run(profile, &paths).await
        }
    }
}
