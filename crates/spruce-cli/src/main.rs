//! spruce - Flatpak runtime and cache cleaner CLI

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use spruce_cli::cmd;
use spruce_cli::{Cli, Commands};
use spruce_core::HostRunner;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;
    let runner = HostRunner::new().with_timeout(Duration::from_secs(cli.timeout));
    let policy = spruce_core::load_policy(cli.policy.as_deref())?;

    match cli.command {
        Commands::Scan { all } => cmd::scan::scan(&runner, &policy, all).await,
        Commands::Autoremove { yes } => {
            cmd::autoremove::autoremove(&runner, &policy, yes, dry_run).await
        }
        Commands::Sweep { top, delete } => cmd::sweep::sweep(top, delete.as_deref(), dry_run),
        Commands::Clear {
            thumbnails,
            webkit,
            fontconfig,
            mesa,
        } => cmd::clear::clear(thumbnails, webkit, fontconfig, mesa, dry_run),
        Commands::Disk => cmd::disk::disk(),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
