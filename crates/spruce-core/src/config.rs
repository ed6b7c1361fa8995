//! Keep-policy loading.
//!
//! The suffix and denylist heuristics are configuration data so they
//! can be extended without touching the classifier. An explicit path
//! must parse; the default location (`~/.config/spruce/policy.toml`)
//! falls back to the built-in policy when absent.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use spruce_schema::KeepPolicy;

/// Default policy file location under the XDG config directory.
pub fn default_policy_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spruce").join("policy.toml"))
}

/// Load the keep policy.
///
/// # Errors
///
/// An explicit `path` that cannot be read or parsed is an error. The
/// default location only errors when the file exists but is invalid;
/// a missing file yields the built-in defaults.
pub fn load_policy(path: Option<&Path>) -> Result<KeepPolicy> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_policy_path() {
            Some(p) => (p, false),
            None => return Ok(KeepPolicy::default()),
        },
    };

    if !path.exists() {
        if required {
            anyhow::bail!("policy file not found: {}", path.display());
        }
        return Ok(KeepPolicy::default());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    let policy: KeepPolicy = toml::from_str(&text)
        .with_context(|| format!("failed to parse policy file {}", path.display()))?;
    debug!(path = %path.display(), "keep policy loaded");
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_policy(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_path_parses() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("policy.toml");
        std::fs::write(&file, "keep_suffixes = [\".custom-ext\"]\n").unwrap();

        let policy = load_policy(Some(&file)).expect("valid policy");
        assert!(policy.matches_keep_suffix("org.example.Platform.custom-ext"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("policy.toml");
        std::fs::write(&file, "keep_suffixes = \"not-a-list\"\n").unwrap();
        assert!(load_policy(Some(&file)).is_err());
    }
}
