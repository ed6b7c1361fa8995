//! Installation scopes and the records the classifier consumes.

use serde::{Deserialize, Serialize};

use crate::flatref::Ref;

/// The installation domain a ref or app lives in. Each scope has an
/// independent inventory and pin state; the two are only merged at the
/// final display step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Per-user installation (`~/.local/share/flatpak`).
    User,
    /// System-wide installation (`/var/lib/flatpak`).
    System,
}

impl Scope {
    /// Scan and removal order: user first (never needs elevation),
    /// system second (may prompt for authorization).
    pub const ALL: [Self; 2] = [Self::User, Self::System];

    /// The `flatpak` CLI flag selecting this scope.
    pub fn flag(self) -> &'static str {
        match self {
            Self::User => "--user",
            Self::System => "--system",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::System => write!(f, "system"),
        }
    }
}

/// An installed application and the runtime it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    /// Application id, e.g. `org.gnome.TextEditor`.
    pub id: String,
    /// Scope the app is installed in.
    pub scope: Scope,
    /// The app's declared runtime ref. `None` when the info query failed
    /// or the app declares no runtime; tolerated, never fatal.
    pub runtime_ref: Option<Ref>,
}

/// The outcome of classifying one installed ref.
///
/// `InUse` is internal bookkeeping: it collapses to "not removable" for
/// display but is tracked separately from `Kept` so diagnostics can
/// distinguish safety-kept refs from refs an app actually needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Safe to remove: nothing installed needs it.
    Removable,
    /// Explicitly pinned; always wins over every other rule.
    Pinned,
    /// Held back by a safety heuristic (SDK/platform family, always-kept
    /// extension, or denylist match).
    Kept,
    /// Demonstrably required by an installed app or SDK.
    InUse,
}
