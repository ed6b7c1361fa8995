//! The keep policy: which extension ids are never offered for removal.
//!
//! These heuristics are data, not control flow, so they can be extended
//! from a config file without touching the classifier.

use serde::{Deserialize, Serialize};

/// Suffix and substring rules protecting refs from removal.
///
/// Two rule classes:
/// - `keep_suffixes`: id suffixes marking extensions that are useful to
///   every base runtime (GL drivers, codec packs). Their presence is not
///   evidence of misconfiguration, so even the no-apps shortcut spares
///   them.
/// - `keep_substrings`: known false positives for the unused-extension
///   heuristic -- desktop theming and platform-integration packages that
///   no app declares a dependency on but that users installed on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepPolicy {
    /// Id suffixes of always-kept extensions.
    pub keep_suffixes: Vec<String>,
    /// Id substrings of theming/integration packages to keep.
    pub keep_substrings: Vec<String>,
}

impl Default for KeepPolicy {
    fn default() -> Self {
        Self {
            keep_suffixes: [
                ".GL.default",
                ".ffmpeg-full",
                ".openh264",
                ".codecs",
                ".codecs-extra",
            ]
            .map(String::from)
            .to_vec(),
            keep_substrings: [
                ".Gtk3theme.",
                ".Icontheme.",
                ".KStyle.",
                ".PlatformTheme.",
                ".WaylandDecorations.",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl KeepPolicy {
    /// Whether `id` ends with one of the always-keep suffixes.
    pub fn matches_keep_suffix(&self, id: &str) -> bool {
        self.keep_suffixes.iter().any(|s| id.ends_with(s.as_str()))
    }

    /// Whether `id` matches the theming/integration denylist.
    pub fn matches_denylist(&self, id: &str) -> bool {
        self.keep_substrings.iter().any(|s| id.contains(s.as_str()))
    }

    /// Whether `id` is protected by either rule class.
    pub fn is_always_kept(&self, id: &str) -> bool {
        self.matches_keep_suffix(id) || self.matches_denylist(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_suffixes_match() {
        let policy = KeepPolicy::default();
        assert!(policy.matches_keep_suffix("org.freedesktop.Platform.GL.default"));
        assert!(policy.matches_keep_suffix("org.freedesktop.Platform.ffmpeg-full"));
        assert!(!policy.matches_keep_suffix("org.gnome.Platform"));
    }

    #[test]
    fn denylist_matches_theming_ids() {
        let policy = KeepPolicy::default();
        assert!(policy.matches_denylist("org.gtk.Gtk3theme.Adwaita-dark"));
        assert!(policy.matches_denylist("org.freedesktop.Platform.Icontheme.Papirus"));
        assert!(policy.matches_denylist("org.kde.KStyle.Kvantum"));
        assert!(!policy.matches_denylist("org.gnome.Platform"));
    }

    #[test]
    fn deserializes_from_toml_with_defaults() {
        let policy: KeepPolicy = toml::from_str("").expect("empty policy");
        assert!(policy.is_always_kept("org.freedesktop.Platform.openh264"));

        let custom: KeepPolicy = toml::from_str(
            r#"
            keep_suffixes = [".my-extension"]
            "#,
        )
        .expect("custom policy");
        assert!(custom.matches_keep_suffix("org.example.Platform.my-extension"));
        assert!(!custom.matches_keep_suffix("org.freedesktop.Platform.openh264"));
        // Unspecified field falls back to the built-in denylist.
        assert!(custom.matches_denylist("org.gtk.Gtk3theme.Adwaita-dark"));
    }
}
