//! Cache sweep: sizing and deleting large cache directories.
//!
//! A much simpler job than the classifier -- plain filesystem work over
//! the XDG cache, the host's cache when sandboxed, and every Flatpak
//! app's private cache. Unreadable entries are skipped, never fatal.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::paths;

/// One sweepable cache entry.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    /// Absolute path of the entry (a direct child of a cache root).
    pub path: PathBuf,
    /// Recursive size in bytes.
    pub size: u64,
    /// Whether the entry's root is writable from this process.
    pub writable: bool,
}

/// Errors from guarded deletions.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    /// The path is not under any known cache root.
    #[error("refusing to delete outside cache roots: {0}")]
    OutsideRoots(PathBuf),
    /// The entry's root is not writable from this process.
    #[error("cache root is read-only: {0}")]
    ReadOnly(PathBuf),
}

/// Cache roots to sweep: `(path, writable)`. Includes the app's own XDG
/// cache, the host view of `~/.cache` when sandboxed, and each
/// installed Flatpak app's cache directory.
pub fn cache_roots(sandboxed: bool) -> Vec<(PathBuf, bool)> {
    let mut unique: Vec<PathBuf> = Vec::new();
    let mut push = |p: PathBuf| {
        if p.is_dir() && !unique.contains(&p) {
            unique.push(p);
        }
    };

    if let Some(cache) = paths::xdg_cache() {
        push(cache);
    }
    if sandboxed {
        if let Some(home) = dirs::home_dir() {
            push(paths::host_view(&home, true).join(".cache"));
        }
        for dir in paths::app_cache_dirs() {
            push(dir);
        }
    }

    unique
        .into_iter()
        .map(|p| {
            let writable = is_writable(&p);
            (p, writable)
        })
        .collect()
}

fn is_writable(path: &Path) -> bool {
    // A metadata readonly check misses mount-level restrictions
    // (/run/host is commonly read-only), so probe with a temp file.
    tempfile::tempfile_in(path).is_ok()
}

/// Recursive size of a file or directory, skipping unreadable entries.
pub fn dir_size(path: &Path) -> u64 {
    if path.is_file() {
        return path.metadata().map(|m| m.len()).unwrap_or(0);
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Size every direct child of every cache root, largest first.
pub fn scan(sandboxed: bool) -> Vec<SweepEntry> {
    let mut entries = Vec::new();
    for (root, writable) in cache_roots(sandboxed) {
        let Ok(children) = std::fs::read_dir(&root) else {
            continue;
        };
        for child in children.flatten() {
            let path = child.path();
            let size = dir_size(&path);
            entries.push(SweepEntry {
                path,
                size,
                writable,
            });
        }
    }
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries
}

/// Delete selected entries, refusing anything outside the known cache
/// roots or under a read-only root. Returns the number of entries
/// removed.
///
/// # Errors
///
/// Returns the first guard violation; entries removed before it stays
/// removed (deletion is not transactional).
pub fn delete(selected: &[PathBuf], sandboxed: bool) -> Result<usize, SweepError> {
    delete_within(&cache_roots(sandboxed), selected)
}

/// The actual guarded deletion, against an explicit root set.
///
/// Both the roots and each candidate are canonicalized before the
/// containment check, so `..` components and symlinks cannot name a
/// target outside the roots. A candidate that fails to canonicalize
/// (already gone, unreadable) is rejected rather than trusted.
fn delete_within(roots: &[(PathBuf, bool)], selected: &[PathBuf]) -> Result<usize, SweepError> {
    let roots: Vec<(PathBuf, bool)> = roots
        .iter()
        .filter_map(|(root, writable)| {
            std::fs::canonicalize(root).ok().map(|r| (r, *writable))
        })
        .collect();
    let mut removed = 0;
    for path in selected {
        let real = std::fs::canonicalize(path)
            .map_err(|_| SweepError::OutsideRoots(path.clone()))?;
        let root = roots
            .iter()
            .find(|(root, _)| real.starts_with(root))
            .ok_or_else(|| SweepError::OutsideRoots(path.clone()))?;
        if !root.1 {
            return Err(SweepError::ReadOnly(path.clone()));
        }
        if remove_path(&real) {
            removed += 1;
        }
    }
    Ok(removed)
}

fn remove_path(path: &Path) -> bool {
    debug!(path = %path.display(), "removing cache entry");
    if path.is_dir() {
        std::fs::remove_dir_all(path).is_ok()
    } else if path.exists() {
        std::fs::remove_file(path).is_ok()
    } else {
        false
    }
}

/// Which of the known per-user caches to clear.
#[derive(Debug, Clone, Copy)]
pub struct ClearTargets {
    /// `~/.cache/thumbnails`
    pub thumbnails: bool,
    /// `~/.cache/WebKitGTK` and `~/.cache/webkitgtk`
    pub webkit: bool,
    /// `~/.cache/fontconfig`
    pub fontconfig: bool,
    /// `~/.cache/mesa_shader_cache`
    pub mesa: bool,
}

impl Default for ClearTargets {
    fn default() -> Self {
        Self {
            thumbnails: true,
            webkit: true,
            fontconfig: true,
            mesa: true,
        }
    }
}

/// Clear the selected well-known caches under the XDG cache directory.
/// Returns the paths actually removed.
pub fn clear_known_caches(targets: ClearTargets, dry_run: bool) -> Vec<PathBuf> {
    let Some(cache) = paths::xdg_cache() else {
        return Vec::new();
    };

    let mut candidates: Vec<PathBuf> = Vec::new();
    if targets.thumbnails {
        candidates.push(cache.join("thumbnails"));
    }
    if targets.webkit {
        candidates.push(cache.join("WebKitGTK"));
        candidates.push(cache.join("webkitgtk"));
    }
    if targets.fontconfig {
        candidates.push(cache.join("fontconfig"));
    }
    if targets.mesa {
        candidates.push(cache.join("mesa_shader_cache"));
    }

    candidates
        .into_iter()
        .filter(|p| p.exists())
        .filter(|p| dry_run || remove_path(p))
        .collect()
}
