//! spruce - a Flatpak runtime and cache cleaner
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Identifies Flatpak runtimes and extensions that no installed
//! application needs, and sweeps large cache directories.
//!
//! # Architecture
//!
//! - **Scan**: the inventory reader enumerates each installation scope
//!   through external `flatpak` queries; the pure classifier partitions
//!   every ref into removable / pinned / kept / in-use.
//! - **Autoremove**: delegates the actual removal to
//!   `flatpak uninstall --unused`, which re-evaluates usage itself --
//!   a stale scan can never drive a removal.
//! - **Sweep / clear / disk**: plain filesystem housekeeping.

pub mod cmd;
pub mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "spruce")]
#[command(author, version, about = "Reclaim disk space from unused Flatpak runtimes and caches")]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Keep-policy file overriding the built-in heuristics
    #[arg(long, global = true, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Per-command timeout for external flatpak invocations, in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify installed runtimes and list what is safe to remove
    Scan {
        /// Also show pinned and safety-kept refs (the hidden sets)
        #[arg(short, long)]
        all: bool,
    },
    /// Remove unused runtimes and extensions in every scope
    Autoremove {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List the largest cache entries, or delete selected ones
    Sweep {
        /// How many entries to show
        #[arg(long, default_value_t = 25)]
        top: usize,
        /// Cache entries to delete (must lie under a known cache root)
        #[arg(long, value_name = "PATH", num_args = 1..)]
        delete: Option<Vec<PathBuf>>,
    },
    /// Clear well-known per-user caches (all of them when no flag given)
    Clear {
        /// Thumbnail cache (~/.cache/thumbnails)
        #[arg(long)]
        thumbnails: bool,
        /// WebKitGTK caches
        #[arg(long)]
        webkit: bool,
        /// Fontconfig cache
        #[arg(long)]
        fontconfig: bool,
        /// Mesa shader cache
        #[arg(long)]
        mesa: bool,
    },
    /// Show home-filesystem usage
    Disk,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
