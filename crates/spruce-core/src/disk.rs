//! Home-filesystem usage totals, correct even inside the sandbox.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::paths;

/// Filesystem totals in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    /// Total filesystem size.
    pub total: u64,
    /// Bytes in use.
    pub used: u64,
    /// Bytes free (available to unprivileged users).
    pub free: u64,
}

impl DiskUsage {
    /// Fraction of the filesystem in use, in `0.0..=1.0`.
    pub fn used_fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64
    }
}

// statvfs(3) is the one foreign call in this crate; everything else
// goes through safe Rust.
#[allow(unsafe_code)]
fn statvfs(path: &Path) -> std::io::Result<DiskUsage> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: c_path is a valid NUL-terminated path and stat is a
    // properly sized, writable out-parameter; statvfs only reads the
    // path and fills the struct.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), &raw mut stat) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }

    let frsize = (stat.f_frsize as u64).max(1);
    let total = stat.f_blocks as u64 * frsize;
    let free = stat.f_bavail as u64 * frsize;
    Ok(DiskUsage {
        total,
        used: total.saturating_sub(stat.f_bfree as u64 * frsize),
        free,
    })
}

fn candidates(sandboxed: bool) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if sandboxed {
        if let Some(home) = dirs::home_dir() {
            out.push(paths::host_view(&home, true));
        }
        out.push(PathBuf::from("/run/host"));
    }
    if let Some(home) = dirs::home_dir() {
        out.push(home);
    }
    out
}

/// Usage totals for the filesystem holding the user's home.
///
/// When sandboxed, the host view (`/run/host/home/...`, then
/// `/run/host`) is preferred so the numbers describe the real disk
/// rather than the sandbox overlay.
///
/// # Errors
///
/// Returns an error only if every candidate path fails to stat.
pub fn home_usage(sandboxed: bool) -> Result<DiskUsage> {
    for path in candidates(sandboxed) {
        match statvfs(&path) {
            Ok(usage) if usage.total > 0 => {
                debug!(path = %path.display(), ?usage, "disk usage");
                return Ok(usage);
            }
            Ok(_) => continue,
            Err(err) => {
                debug!(path = %path.display(), %err, "statvfs failed");
            }
        }
    }
    if !sandboxed && dirs::home_dir().is_none() {
        bail!("could not resolve the home directory");
    }
    statvfs(Path::new("/")).context("statvfs failed for every candidate path")
}
