//! Scan command: classify every installed ref and report.

use anyhow::Result;

use spruce_core::runner::flatpak_available;
use spruce_core::{CommandRunner, InventoryReader, classify_scope, merge};
use spruce_schema::{KeepPolicy, Scope};

use crate::ui::{Output, table::ref_table};

/// Run a full scan and print the removable set; `--all` adds the
/// pinned and safety-kept sets.
pub async fn scan(runner: &dyn CommandRunner, policy: &KeepPolicy, all: bool) -> Result<()> {
    let output = Output::new();
    if !flatpak_available() {
        output.warn("flatpak not found; nothing to scan");
    }

    let reader = InventoryReader::new(runner);
    let mut parts = Vec::with_capacity(Scope::ALL.len());
    let mut degraded_scopes = Vec::new();
    for scope in Scope::ALL {
        let inv = reader.read(scope).await;
        if inv.degraded {
            degraded_scopes.push(scope);
        }
        for line in &inv.unparsed {
            output.warn(&format!("ignoring unparseable ref in {scope} scope: {line}"));
        }
        parts.push(classify_scope(&inv, policy));
    }
    let report = merge(&parts);

    for scope in degraded_scopes {
        output.warn(&format!(
            "could not read the {scope} installation; it is excluded from this scan"
        ));
    }

    if report.removable.is_empty() {
        output.success("No unused runtimes or extensions to remove.");
    } else {
        println!();
        println!("Unused runtimes and extensions:");
        println!("{}", ref_table(&report.removable));
        output.info(&format!(
            "{} ref(s) removable; run 'spruce autoremove' to remove them",
            report.removable.len()
        ));
    }

    if all {
        if !report.pinned.is_empty() {
            println!();
            println!("Pinned (never removed):");
            println!("{}", ref_table(&report.pinned));
        }
        if !report.kept.is_empty() {
            println!();
            println!("Kept for safety:");
            println!("{}", ref_table(&report.kept));
        }
    }

    Ok(())
}
