//! Filesystem locations: XDG cache, Flatpak installations, and the
//! `/run/host` view of the host filesystem when sandboxed.

use std::path::{Path, PathBuf};

use spruce_schema::Scope;

/// The XDG cache directory. Inside a Flatpak this is usually
/// `~/.var/app/<app>/cache`.
pub fn xdg_cache() -> Option<PathBuf> {
    if let Some(val) = std::env::var_os("XDG_CACHE_HOME") {
        return Some(PathBuf::from(val));
    }
    dirs::home_dir().map(|h| h.join(".cache"))
}

/// Map a path to its host-filesystem view when sandboxed
/// (e.g. `/home/user` -> `/run/host/home/user`). Returns the input
/// unchanged when no host view exists.
pub fn host_view(path: &Path, sandboxed: bool) -> PathBuf {
    if !sandboxed {
        return path.to_path_buf();
    }
    if let Ok(rel) = path.strip_prefix("/") {
        let host = Path::new("/run/host").join(rel);
        if host.exists() {
            return host;
        }
    }
    path.to_path_buf()
}

/// Root of a scope's Flatpak installation.
pub fn installation_dir(scope: Scope) -> Option<PathBuf> {
    match scope {
        Scope::User => dirs::data_dir().map(|d| d.join("flatpak")),
        Scope::System => Some(PathBuf::from("/var/lib/flatpak")),
    }
}

/// The pin directory of a scope's installation.
pub fn pin_dir(scope: Scope) -> Option<PathBuf> {
    installation_dir(scope).map(|d| d.join("pins"))
}

/// Per-app cache directories under `~/.var/app/*/cache`.
pub fn app_cache_dirs() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    let var_app = home.join(".var").join("app");
    let Ok(entries) = std::fs::read_dir(&var_app) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path().join("cache"))
        .filter(|p| p.is_dir())
        .collect()
}
