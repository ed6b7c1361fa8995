//! Sweep command: list or delete large cache entries.

use std::path::PathBuf;

use anyhow::{Context, Result};

use spruce_core::runner::is_sandboxed;
use spruce_core::sweep;

use crate::ui::{Output, human_size};

/// List the largest cache entries, or delete the selected ones.
pub fn sweep(top: usize, delete: Option<&[PathBuf]>, dry_run: bool) -> Result<()> {
    let output = Output::new();
    let sandboxed = is_sandboxed();

    if let Some(paths) = delete {
        if dry_run {
            for p in paths {
                output.info(&format!("would remove {}", p.display()));
            }
            return Ok(());
        }
        let removed = sweep::delete(paths, sandboxed).context("cache deletion refused")?;
        output.success(&format!("Removed {removed} item(s)."));
        return Ok(());
    }

    let entries = sweep::scan(sandboxed);
    if entries.is_empty() {
        output.info("No cache entries found.");
        return Ok(());
    }

    for entry in entries.iter().take(top) {
        let marker = if entry.writable { " " } else { "*" };
        println!(
            "{marker} {:>10}  {}",
            human_size(entry.size),
            entry.path.display()
        );
    }
    let shown = entries.len().min(top);
    output.info(&format!(
        "{shown} of {} entries shown (* = read-only); delete with 'spruce sweep --delete <path>'",
        entries.len()
    ));
    Ok(())
}
