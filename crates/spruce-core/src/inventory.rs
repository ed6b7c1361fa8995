//! Inventory reading: translating `flatpak` command output into typed
//! records.
//!
//! The CLI output format drifts across flatpak versions, so every query
//! is an ordered chain of parser strategies: structured `--columns`
//! query first, free-form table scrape second, filesystem enumeration
//! last. Each layer either produces a result or falls through; if every
//! layer fails the scope is flagged degraded instead of raising.
//! Degraded is deliberately distinct from empty: an empty scope triggers
//! the classifier's aggressive no-apps shortcut, a degraded one must
//! contribute nothing at all.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use spruce_schema::{AppRecord, Ref, RefKind, Scope};

use crate::paths;
use crate::runner::CommandRunner;

/// Reverse-DNS application id: dot-separated `[A-Za-z0-9_.-]` segments
/// with at least one dot.
static APP_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+$").expect("static regex")
});

/// Ref-shaped token inside a free-form table line. The id segment must
/// start with a letter so bare version numbers (`45.0`) never match.
static REF_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:runtime/|app/)?[A-Za-z][A-Za-z0-9_-]*(?:\.[A-Za-z0-9_-]+)+/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+")
        .expect("static regex")
});

/// `Runtime: <id>/<arch>/<branch>` line, case-insensitive label.
static RUNTIME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*runtime:\s*(\S+)").expect("static regex"));

/// Everything known about one scope's installation.
///
/// Recomputed fresh on every scan; nothing here persists across scans.
#[derive(Debug, Clone)]
pub struct ScopeInventory {
    /// The scope this inventory describes.
    pub scope: Scope,
    /// Installed runtime/extension refs, in discovery order.
    pub refs: Vec<Ref>,
    /// Lines that looked like refs but failed to parse; diagnostics only.
    pub unparsed: Vec<String>,
    /// Installed applications with their declared runtimes.
    pub apps: Vec<AppRecord>,
    /// Explicitly pinned refs. Best-effort: a failed pin query yields an
    /// empty set, which is safe because the uninstall command enforces
    /// pins itself.
    pub pins: HashSet<Ref>,
    /// True when the inventory could not be determined. A degraded scope
    /// must contribute nothing to classification.
    pub degraded: bool,
}

impl ScopeInventory {
    /// The "we could not determine inventory" signal.
    pub fn degraded(scope: Scope) -> Self {
        Self {
            scope,
            refs: Vec::new(),
            unparsed: Vec::new(),
            apps: Vec::new(),
            pins: HashSet::new(),
            degraded: true,
        }
    }

    /// Installed SDK refs, derived from the ref list.
    pub fn sdks(&self) -> impl Iterator<Item = &Ref> {
        self.refs.iter().filter(|r| r.is_sdk_family())
    }
}

/// Reads one scope's inventory through a [`CommandRunner`].
pub struct InventoryReader<'a> {
    runner: &'a dyn CommandRunner,
}

// The runner is a bare trait object, so derive(Debug) cannot apply.
impl std::fmt::Debug for InventoryReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryReader").finish_non_exhaustive()
    }
}

impl<'a> InventoryReader<'a> {
    /// Create a reader over the given runner.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Read the full inventory for one scope. Never errors: enumeration
    /// failure yields [`ScopeInventory::degraded`].
    pub async fn read(&self, scope: Scope) -> ScopeInventory {
        let Some((refs, unparsed)) = self.list_runtimes(scope).await else {
            warn!(%scope, "runtime enumeration failed on every layer; scope degraded");
            return ScopeInventory::degraded(scope);
        };
        let Some(app_ids) = self.list_app_ids(scope).await else {
            warn!(%scope, "app enumeration failed on every layer; scope degraded");
            return ScopeInventory::degraded(scope);
        };

        let mut apps = Vec::with_capacity(app_ids.len());
        for id in app_ids {
            let runtime_ref = self.declared_runtime(scope, &id).await;
            apps.push(AppRecord {
                id,
                scope,
                runtime_ref,
            });
        }

        let pins = self.read_pins(scope).await;
        debug!(
            %scope,
            refs = refs.len(),
            apps = apps.len(),
            pins = pins.len(),
            "inventory read"
        );

        ScopeInventory {
            scope,
            refs,
            unparsed,
            apps,
            pins,
            degraded: false,
        }
    }

    /// Installed runtime refs, via the strategy chain.
    async fn list_runtimes(&self, scope: Scope) -> Option<(Vec<Ref>, Vec<String>)> {
        let out = self
            .runner
            .run(&["flatpak", "list", "--runtime", "--columns=ref", scope.flag()])
            .await;
        if out.success() {
            return Some(parse_ref_column(&out.stdout));
        }

        let out = self
            .runner
            .run(&["flatpak", "list", "--runtime", scope.flag()])
            .await;
        if out.success() {
            if let Some(refs) = parse_ref_table(&out.stdout) {
                return Some((refs, Vec::new()));
            }
        }

        let dir = paths::installation_dir(scope)?;
        runtimes_from_install_dir(&dir.join("runtime"))
    }

    /// Installed application ids, via the strategy chain.
    async fn list_app_ids(&self, scope: Scope) -> Option<Vec<String>> {
        let out = self
            .runner
            .run(&[
                "flatpak",
                "list",
                "--app",
                "--columns=application",
                scope.flag(),
            ])
            .await;
        if out.success() {
            return Some(parse_app_column(&out.stdout));
        }

        let out = self
            .runner
            .run(&["flatpak", "list", "--app", scope.flag()])
            .await;
        if out.success() {
            return parse_app_table(&out.stdout);
        }
        None
    }

    /// The runtime an app declares, from `flatpak info`. `None` on any
    /// failure; tolerated by the classifier.
    async fn declared_runtime(&self, scope: Scope, app_id: &str) -> Option<Ref> {
        let out = self
            .runner
            .run(&["flatpak", "info", scope.flag(), app_id])
            .await;
        if !out.success() {
            debug!(%scope, app_id, "info query failed");
            return None;
        }
        parse_declared_runtime(&out.stdout)
    }

    /// Pinned refs: union of the `flatpak pin` listing and the pin
    /// directory contents.
    async fn read_pins(&self, scope: Scope) -> HashSet<Ref> {
        let mut pins = HashSet::new();
        let out = self.runner.run(&["flatpak", "pin", scope.flag()]).await;
        if out.success() {
            pins.extend(parse_pin_output(&out.stdout));
        }
        if let Some(dir) = paths::pin_dir(scope) {
            pins.extend(read_pin_dir(&dir));
        }
        pins
    }
}

/// Parse `--columns=ref` output: one ref per line, possibly without the
/// kind prefix. Unparseable lines are kept as opaque diagnostics.
pub(crate) fn parse_ref_column(text: &str) -> (Vec<Ref>, Vec<String>) {
    let mut refs = Vec::new();
    let mut unparsed = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("ref") {
            continue;
        }
        match Ref::parse_runtime(line) {
            Ok(r) => refs.push(r),
            Err(_) => unparsed.push(line.to_string()),
        }
    }
    (refs, unparsed)
}

/// Scrape a free-form `flatpak list` table for ref-shaped tokens, one
/// per line. Returns `None` when the format is not understood (lines
/// present but no ref found anywhere), so the next layer gets a chance.
pub(crate) fn parse_ref_table(text: &str) -> Option<Vec<Ref>> {
    let mut refs = Vec::new();
    let mut saw_line = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        saw_line = true;
        if let Some(m) = REF_TOKEN.find(line) {
            if let Ok(r) = Ref::parse_runtime(m.as_str()) {
                refs.push(r);
            }
        }
    }
    if saw_line && refs.is_empty() {
        return None;
    }
    Some(refs)
}

/// Enumerate `<installation>/runtime/<id>/<arch>/<branch>` directories.
/// Directory order is unspecified, so entries are sorted for
/// deterministic output.
fn runtimes_from_install_dir(dir: &Path) -> Option<(Vec<Ref>, Vec<String>)> {
    if !dir.is_dir() {
        return None;
    }
    let mut refs = Vec::new();
    for id_entry in std::fs::read_dir(dir).ok()?.flatten() {
        let id = id_entry.file_name().to_string_lossy().into_owned();
        if !id.contains('.') {
            continue;
        }
        let Ok(arches) = std::fs::read_dir(id_entry.path()) else {
            continue;
        };
        for arch_entry in arches.flatten() {
            let arch = arch_entry.file_name().to_string_lossy().into_owned();
            let Ok(branches) = std::fs::read_dir(arch_entry.path()) else {
                continue;
            };
            for branch_entry in branches.flatten() {
                if !branch_entry.path().is_dir() {
                    continue;
                }
                refs.push(Ref {
                    kind: RefKind::Runtime,
                    id: id.clone(),
                    arch: arch.clone(),
                    branch: branch_entry.file_name().to_string_lossy().into_owned(),
                });
            }
        }
    }
    refs.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    Some((refs, Vec::new()))
}

/// Parse `--columns=application` output, validating each line against
/// the reverse-DNS grammar.
pub(crate) fn parse_app_column(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| APP_ID.is_match(line))
        .map(String::from)
        .collect()
}

/// Scrape a free-form app table for the first reverse-DNS token per
/// line. `None` when lines are present but nothing matched.
pub(crate) fn parse_app_table(text: &str) -> Option<Vec<String>> {
    let mut ids = Vec::new();
    let mut saw_line = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        saw_line = true;
        if let Some(token) = line
            .split_whitespace()
            .find(|tok| tok.starts_with(|c: char| c.is_ascii_alphabetic()) && APP_ID.is_match(tok))
        {
            ids.push(token.to_string());
        }
    }
    if saw_line && ids.is_empty() {
        return None;
    }
    Some(ids)
}

/// Extract the declared runtime from `flatpak info` output: a line of
/// the form `Runtime: <id>/<arch>/<branch>` (case-insensitive label).
pub(crate) fn parse_declared_runtime(text: &str) -> Option<Ref> {
    for line in text.lines() {
        if let Some(cap) = RUNTIME_LINE.captures(line) {
            return Ref::parse_runtime(&cap[1]).ok();
        }
    }
    None
}

/// Parse `flatpak pin` output: one ref per line.
pub(crate) fn parse_pin_output(text: &str) -> Vec<Ref> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| Ref::parse_runtime(l).ok())
        .collect()
}

/// Read pins from a pin directory: entries may be ref-shaped filenames
/// (`%` standing in for `/`, which filenames cannot contain) or files
/// holding newline-delimited refs with `#` comments. Both sources are
/// unioned.
pub(crate) fn read_pin_dir(dir: &Path) -> HashSet<Ref> {
    let mut pins = HashSet::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return pins;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().replace('%', "/");
        if let Ok(r) = Ref::parse_runtime(&name) {
            pins.insert(r);
        }
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(r) = Ref::parse_runtime(line) {
                pins.insert(r);
            }
        }
    }
    pins
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::runner::CommandOutput;

    /// Scripted runner: maps a joined argv string to canned output.
    /// Unknown commands fail, exercising the fallback chain.
    struct ScriptedRunner {
        responses: HashMap<String, String>,
    }

    impl ScriptedRunner {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                responses: entries
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, argv: &[&str]) -> CommandOutput {
            match self.responses.get(&argv.join(" ")) {
                Some(stdout) => CommandOutput {
                    code: 0,
                    stdout: stdout.clone(),
                    stderr: String::new(),
                },
                None => CommandOutput {
                    code: 1,
                    stdout: String::new(),
                    stderr: "error: unknown command".to_string(),
                },
            }
        }
    }

    #[test]
    fn ref_column_parses_bare_and_full_refs() {
        let (refs, unparsed) = parse_ref_column(
            "Ref\n\
             org.gnome.Platform/x86_64/45\n\
             runtime/org.freedesktop.Platform.GL.default/x86_64/23.08\n\
             not-a-ref\n",
        );
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].to_string(), "runtime/org.gnome.Platform/x86_64/45");
        assert_eq!(unparsed, vec!["not-a-ref"]);
    }

    #[test]
    fn ref_table_scrapes_tokens() {
        let refs = parse_ref_table(
            "GNOME Platform  org.gnome.Platform/x86_64/45  flathub\n\
             Codecs          org.freedesktop.Platform.openh264/x86_64/2.2  flathub\n",
        )
        .expect("format understood");
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs[1].to_string(),
            "runtime/org.freedesktop.Platform.openh264/x86_64/2.2"
        );
    }

    #[test]
    fn ref_table_rejects_unrecognized_format() {
        assert!(parse_ref_table("Name Version Branch\nGNOME 45 stable\n").is_none());
        // Empty output is legitimately empty, not a format failure.
        assert_eq!(parse_ref_table("").unwrap(), Vec::new());
    }

    #[test]
    fn app_column_validates_reverse_dns() {
        let ids = parse_app_column("org.gnome.TextEditor\nApplication ID\n\ncom.example.App\n");
        assert_eq!(ids, vec!["org.gnome.TextEditor", "com.example.App"]);
    }

    #[test]
    fn app_table_skips_version_numbers() {
        let ids = parse_app_table(
            "Text Editor  org.gnome.TextEditor  45.0  stable  flathub\n\
             Maps         org.gnome.Maps        45.1  stable  flathub\n",
        )
        .expect("format understood");
        assert_eq!(ids, vec!["org.gnome.TextEditor", "org.gnome.Maps"]);
    }

    #[test]
    fn declared_runtime_is_case_insensitive_and_prefixed() {
        let info = "ID: org.gnome.TextEditor\n\
                    runtime: org.gnome.Platform/x86_64/45\n";
        let r = parse_declared_runtime(info).expect("runtime line");
        assert_eq!(r.to_string(), "runtime/org.gnome.Platform/x86_64/45");

        assert!(parse_declared_runtime("ID: org.gnome.TextEditor\n").is_none());
    }

    #[test]
    fn pin_dir_unions_filenames_and_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Ref-shaped filename pin, '%' standing in for '/'.
        std::fs::write(
            dir.path().join("runtime%org.gnome.Platform%x86_64%45"),
            "",
        )
        .unwrap();
        // Content pin with comments. The filename itself is not a ref.
        std::fs::write(
            dir.path().join("pins.list"),
            "# kept for the old photo manager\n\
             runtime/org.gnome.Platform/x86_64/42 # EOL but needed\n\
             \n\
             org.kde.Platform/x86_64/5.15\n",
        )
        .unwrap();

        let pins = read_pin_dir(dir.path());
        let serialized: HashSet<String> = pins.iter().map(ToString::to_string).collect();
        assert!(serialized.contains("runtime/org.gnome.Platform/x86_64/45"));
        assert!(serialized.contains("runtime/org.gnome.Platform/x86_64/42"));
        assert!(serialized.contains("runtime/org.kde.Platform/x86_64/5.15"));
        assert_eq!(pins.len(), 3);
    }

    #[tokio::test]
    async fn read_uses_structured_queries() {
        let runner = ScriptedRunner::new(&[
            (
                "flatpak list --runtime --columns=ref --user",
                "org.gnome.Platform/x86_64/45\norg.gnome.Sdk/x86_64/45\n",
            ),
            (
                "flatpak list --app --columns=application --user",
                "org.gnome.TextEditor\n",
            ),
            (
                "flatpak info --user org.gnome.TextEditor",
                "ID: org.gnome.TextEditor\nRuntime: org.gnome.Platform/x86_64/45\n",
            ),
            ("flatpak pin --user", "runtime/org.gnome.Sdk/x86_64/45\n"),
        ]);

        let inv = InventoryReader::new(&runner).read(Scope::User).await;
        assert!(!inv.degraded);
        assert_eq!(inv.refs.len(), 2);
        assert_eq!(inv.apps.len(), 1);
        assert_eq!(
            inv.apps[0].runtime_ref.as_ref().map(ToString::to_string),
            Some("runtime/org.gnome.Platform/x86_64/45".to_string())
        );
        assert_eq!(inv.pins.len(), 1);
        assert_eq!(inv.sdks().count(), 1);
    }

    #[tokio::test]
    async fn read_falls_back_to_table_parse() {
        let runner = ScriptedRunner::new(&[
            (
                "flatpak list --runtime --user",
                "GNOME  org.gnome.Platform/x86_64/45  flathub\n",
            ),
            (
                "flatpak list --app --user",
                "Text Editor  org.gnome.TextEditor  45.0  stable\n",
            ),
            (
                "flatpak info --user org.gnome.TextEditor",
                "Runtime: org.gnome.Platform/x86_64/45\n",
            ),
        ]);

        let inv = InventoryReader::new(&runner).read(Scope::User).await;
        assert!(!inv.degraded);
        assert_eq!(inv.refs.len(), 1);
        assert_eq!(inv.apps.len(), 1);
    }

    #[tokio::test]
    async fn read_degrades_when_every_layer_fails() {
        // No scripted responses at all: every command fails, and the
        // filesystem layer finds no system installation in the sandbox.
        let runner = ScriptedRunner::new(&[]);
        let inv = InventoryReader::new(&runner).read(Scope::System).await;
        // Either the filesystem layer found a real /var/lib/flatpak on the
        // test host or the scope degraded; in both cases nothing is
        // invented. On CI containers the directory is absent.
        if inv.degraded {
            assert!(inv.refs.is_empty());
            assert!(inv.apps.is_empty());
        }
    }

    #[test]
    fn reader_is_debuggable_over_any_runner() {
        let runner = ScriptedRunner::new(&[]);
        let reader = InventoryReader::new(&runner);
        assert!(format!("{reader:?}").contains("InventoryReader"));
    }

    #[tokio::test]
    async fn failed_info_query_tolerated() {
        let runner = ScriptedRunner::new(&[
            (
                "flatpak list --runtime --columns=ref --user",
                "org.gnome.Platform/x86_64/45\n",
            ),
            (
                "flatpak list --app --columns=application --user",
                "org.gnome.TextEditor\n",
            ),
            // No info response: the query fails.
        ]);

        let inv = InventoryReader::new(&runner).read(Scope::User).await;
        assert!(!inv.degraded);
        assert_eq!(inv.apps.len(), 1);
        assert!(inv.apps[0].runtime_ref.is_none());
    }
}
