//! The four-part Flatpak ref grammar: `kind/id/arch/branch`.

use std::str::FromStr;

use crate::policy::KeepPolicy;

/// Whether a ref names a runtime/extension or an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// A runtime, SDK, or runtime extension.
    Runtime,
    /// An installed application.
    App,
}

impl RefKind {
    /// The literal first segment of a serialized ref.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::App => "app",
        }
    }
}

/// Errors produced while parsing ref strings.
///
/// Malformed refs are diagnostic-only: callers keep the raw string for
/// reporting and never construct a [`Ref`] from it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    /// The string does not match `("runtime"|"app")/<id>/<arch>/<branch>`.
    #[error("malformed ref '{0}': expected kind/id/arch/branch")]
    Malformed(String),
}

/// A parsed Flatpak reference.
///
/// Serialization round-trips: `Ref::from_str(s)?.to_string() == s` for any
/// well-formed four-segment ref string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ref {
    /// Ref kind (`runtime` or `app`).
    pub kind: RefKind,
    /// Reverse-DNS identifier, e.g. `org.gnome.Platform`.
    pub id: String,
    /// Architecture, e.g. `x86_64`.
    pub arch: String,
    /// Branch or version, e.g. `45`.
    pub branch: String,
}

impl FromStr for Ref {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() < 4 {
            return Err(RefError::Malformed(s.to_string()));
        }
        let kind = match parts[0] {
            "runtime" => RefKind::Runtime,
            "app" => RefKind::App,
            _ => return Err(RefError::Malformed(s.to_string())),
        };
        if parts[1].is_empty() || parts[2].is_empty() || parts[3].is_empty() {
            return Err(RefError::Malformed(s.to_string()));
        }
        Ok(Self {
            kind,
            id: parts[1].to_string(),
            arch: parts[2].to_string(),
            // Branches containing '/' do not occur in practice, but a
            // 5-segment string still round-trips rather than truncating.
            branch: parts[3..].join("/"),
        })
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.kind.as_str(),
            self.id,
            self.arch,
            self.branch
        )
    }
}

impl Ref {
    /// Parse a runtime ref that may lack the leading `runtime/` kind
    /// segment, as `flatpak list --columns=ref` prints them
    /// (`org.gnome.Platform/x86_64/45`).
    ///
    /// # Errors
    ///
    /// Returns [`RefError::Malformed`] if the string is neither a full
    /// four-segment ref nor a bare `id/arch/branch` triplet.
    pub fn parse_runtime(s: &str) -> Result<Self, RefError> {
        match s.split('/').count() {
            0..=2 => Err(RefError::Malformed(s.to_string())),
            3 => format!("runtime/{s}").parse(),
            _ => s.parse(),
        }
    }

    /// Whether this ref is a full platform rather than a locale, debug,
    /// or always-kept extension variant of one.
    pub fn is_base_runtime(&self, policy: &KeepPolicy) -> bool {
        if self.id.ends_with(".Locale") || self.id.ends_with(".Debug") {
            return false;
        }
        !policy.matches_keep_suffix(&self.id)
    }

    /// Whether the id belongs to the SDK family (`.Sdk`, `.Sdk.Locale`).
    pub fn is_sdk_family(&self) -> bool {
        self.id.ends_with(".Sdk") || self.id.ends_with(".Sdk.Locale")
    }

    /// Whether the id belongs to the platform family
    /// (`.Platform`, `.Platform.Locale`, `.Platform.Debug`).
    pub fn is_platform_family(&self) -> bool {
        self.id.ends_with(".Platform")
            || self.id.ends_with(".Platform.Locale")
            || self.id.ends_with(".Platform.Debug")
    }

    /// Heuristic base-platform id for an extension ref: the first three
    /// dot-separated components of the id
    /// (`org.freedesktop.Platform.ffmpeg-full` -> `org.freedesktop.Platform`).
    /// Ids with fewer than three components are returned unchanged.
    pub fn platform_base(&self) -> String {
        let mut dots = 0;
        for (i, ch) in self.id.char_indices() {
            if ch == '.' {
                dots += 1;
                if dots == 3 {
                    return self.id[..i].to_string();
                }
            }
        }
        self.id.clone()
    }

    /// The platform id implied by an SDK id: the trailing `Sdk` /
    /// `Sdk.Locale` component is rewritten to `Platform`
    /// (`org.gnome.Sdk` -> `org.gnome.Platform`). Non-SDK ids are
    /// returned unchanged.
    pub fn sdk_platform_name(&self) -> String {
        if let Some(head) = self.id.strip_suffix(".Sdk.Locale") {
            return format!("{head}.Platform");
        }
        if let Some(head) = self.id.strip_suffix(".Sdk") {
            return format!("{head}.Platform");
        }
        self.id.clone()
    }
}
