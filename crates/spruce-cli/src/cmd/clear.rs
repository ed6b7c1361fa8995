//! Clear command: remove well-known per-user caches.

use anyhow::Result;

use spruce_core::sweep::{ClearTargets, clear_known_caches};

use crate::ui::Output;

/// Clear the selected known caches; with no flags, all of them.
pub fn clear(
    thumbnails: bool,
    webkit: bool,
    fontconfig: bool,
    mesa: bool,
    dry_run: bool,
) -> Result<()> {
    let output = Output::new();

    let targets = if thumbnails || webkit || fontconfig || mesa {
        ClearTargets {
            thumbnails,
            webkit,
            fontconfig,
            mesa,
        }
    } else {
        ClearTargets::default()
    };

    let cleared = clear_known_caches(targets, dry_run);
    if cleared.is_empty() {
        output.info("Nothing to clear.");
        return Ok(());
    }
    for path in &cleared {
        if dry_run {
            output.info(&format!("would remove {}", path.display()));
        } else {
            output.info(&format!("removed {}", path.display()));
        }
    }
    if !dry_run {
        output.success("Selected caches cleared.");
    }
    Ok(())
}
