//! Disk command: home-filesystem usage.

use anyhow::{Context, Result};

use spruce_core::disk::home_usage;
use spruce_core::runner::is_sandboxed;

use crate::ui::human_size;

/// Print totals for the filesystem holding the user's home.
pub fn disk() -> Result<()> {
    let usage = home_usage(is_sandboxed()).context("failed to read filesystem usage")?;
    let pct = (usage.used_fraction() * 100.0).round();
    println!("Total: {:>10}", human_size(usage.total));
    println!("Used:  {:>10}  ({pct:.0}%)", human_size(usage.used));
    println!("Free:  {:>10}", human_size(usage.free));
    Ok(())
}
