//! Autoremove command: uninstall unused refs in every scope.

use std::io::Write;

use anyhow::{Context, Result};

use spruce_core::{CommandRunner, InventoryReader, RemovalExecutor, classify_scope, merge};
use spruce_schema::{KeepPolicy, Scope};

use crate::ui::{Output, table::ref_table};

/// Re-scan, confirm, then hand removal to the package manager's own
/// unused-ref evaluation. The scan is display-only: the executor acts
/// on whatever is unused at removal time, never on our ref list.
pub async fn autoremove(
    runner: &dyn CommandRunner,
    policy: &KeepPolicy,
    yes: bool,
    dry_run: bool,
) -> Result<()> {
    let output = Output::new();

    // Fresh scan immediately before offering removal.
    let reader = InventoryReader::new(runner);
    let mut parts = Vec::with_capacity(Scope::ALL.len());
    for scope in Scope::ALL {
        parts.push(classify_scope(&reader.read(scope).await, policy));
    }
    let report = merge(&parts);

    if report.removable.is_empty() {
        output.success("No unused runtimes or extensions to remove.");
        return Ok(());
    }

    println!();
    println!("Will remove:");
    println!("{}", ref_table(&report.removable));

    if !yes && !dry_run && !confirm(report.removable.len())? {
        output.info("Aborted.");
        return Ok(());
    }

    let removed = RemovalExecutor::new(runner).autoremove(dry_run).await;
    if dry_run {
        output.info(&format!("Dry run: {removed} item(s) would be removed."));
    } else {
        output.success(&format!("Removed {removed} item(s)."));
    }
    Ok(())
}

fn confirm(count: usize) -> Result<bool> {
    print!("Remove {count} ref(s)? [y/N] ");
    std::io::stdout().flush().context("flush stdout")?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
