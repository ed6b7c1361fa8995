//! The usage classifier: partitioning every installed ref into
//! removable, pinned, kept-for-safety, or in-use.
//!
//! Pure and synchronous; all I/O happens in the inventory reader before
//! this runs. Ordering is stable: outputs preserve inventory discovery
//! order, and the cross-scope merge deduplicates first-wins, so an
//! unchanged inventory classifies to byte-identical output.

use std::collections::HashSet;

use tracing::debug;

use spruce_schema::{Classification, KeepPolicy, Ref};

use crate::inventory::ScopeInventory;

/// Per-scope classification result. The four lists partition the
/// scope's installed refs exactly: no ref is omitted, none appears
/// twice.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Safe to remove.
    pub removable: Vec<Ref>,
    /// Explicitly pinned.
    pub pinned: Vec<Ref>,
    /// Held back by a safety heuristic.
    pub kept: Vec<Ref>,
    /// Required by an installed app or SDK. Internal: dropped at the
    /// display merge, tracked here so diagnostics can tell "actually
    /// used" from "safety-kept".
    pub in_use: Vec<Ref>,
}

/// Cross-scope, display-ready result: per-scope lists concatenated and
/// deduplicated by serialized ref, first-seen order preserved.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Refs offered for removal.
    pub removable: Vec<Ref>,
    /// Pinned refs (the "what's hidden" view).
    pub pinned: Vec<Ref>,
    /// Safety-kept refs (the "what's hidden" view).
    pub kept: Vec<Ref>,
}

/// Classify a single ref against the scope's pin set and used-base set.
fn classify_ref(
    r: &Ref,
    pins: &HashSet<Ref>,
    used_bases: &HashSet<String>,
    policy: &KeepPolicy,
) -> Classification {
    // Pinning always wins.
    if pins.contains(r) {
        return Classification::Pinned;
    }
    // Known false positives: theming and platform-integration packages
    // no app declares a dependency on.
    if policy.matches_denylist(&r.id) {
        return Classification::Kept;
    }
    // Safety heuristics: SDKs were installed deliberately, locale/debug
    // companions follow their platform, and always-kept extensions are
    // useful to whatever base runtime remains. Bare platforms fall
    // through to the in-use check so an unused platform can be offered
    // for removal.
    if r.is_sdk_family()
        || (r.is_platform_family() && !r.is_base_runtime(policy))
        || policy.matches_keep_suffix(&r.id)
    {
        return Classification::Kept;
    }
    // In-use: the ref's base platform is required by an app or implied
    // by an installed SDK.
    let base = if r.is_base_runtime(policy) {
        r.id.clone()
    } else {
        r.platform_base()
    };
    if used_bases.contains(&base) {
        return Classification::InUse;
    }
    Classification::Removable
}

/// Partition one scope's inventory.
///
/// A degraded scope contributes nothing: it must never be treated as
/// "zero apps", which would wrongly trigger the aggressive shortcut
/// below.
pub fn classify_scope(inv: &ScopeInventory, policy: &KeepPolicy) -> Partition {
    let mut part = Partition::default();
    if inv.degraded {
        debug!(scope = %inv.scope, "degraded scope; contributing nothing");
        return part;
    }

    // Used bases: every app's declared runtime id (an app's declared
    // runtime is always a base runtime), plus the platform implied by
    // each installed SDK even when no app references it.
    let used_bases: HashSet<String> = inv
        .apps
        .iter()
        .filter_map(|a| a.runtime_ref.as_ref())
        .map(|r| r.id.clone())
        .chain(inv.sdks().map(Ref::sdk_platform_name))
        .collect();

    // No-apps shortcut: a scope with zero applications has no
    // legitimate consumer of any runtime. Everything unpinned and not
    // always-kept is removable. Deliberately aggressive; matches the
    // package manager's own "nothing is in use" semantics.
    if inv.apps.is_empty() {
        for r in &inv.refs {
            if inv.pins.contains(r) {
                part.pinned.push(r.clone());
            } else if policy.is_always_kept(&r.id) {
                part.kept.push(r.clone());
            } else {
                part.removable.push(r.clone());
            }
        }
        return part;
    }

    for r in &inv.refs {
        match classify_ref(r, &inv.pins, &used_bases, policy) {
            Classification::Removable => part.removable.push(r.clone()),
            Classification::Pinned => part.pinned.push(r.clone()),
            Classification::Kept => part.kept.push(r.clone()),
            Classification::InUse => part.in_use.push(r.clone()),
        }
    }

    debug!(
        scope = %inv.scope,
        removable = part.removable.len(),
        pinned = part.pinned.len(),
        kept = part.kept.len(),
        in_use = part.in_use.len(),
        "scope classified"
    );
    part
}

/// Merge per-scope partitions for display: concatenate in scope order,
/// deduplicate by exact serialized ref, first seen wins. In-use refs
/// are dropped here; they are "used", not "unused".
pub fn merge(parts: &[Partition]) -> Report {
    fn dedup(lists: impl Iterator<Item = Ref>) -> Vec<Ref> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for r in lists {
            if seen.insert(r.to_string()) {
                out.push(r);
            }
        }
        out
    }

    Report {
        removable: dedup(parts.iter().flat_map(|p| p.removable.iter().cloned())),
        pinned: dedup(parts.iter().flat_map(|p| p.pinned.iter().cloned())),
        kept: dedup(parts.iter().flat_map(|p| p.kept.iter().cloned())),
    }
}
