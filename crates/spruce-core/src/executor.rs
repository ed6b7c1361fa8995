//! Removal execution: `flatpak uninstall --unused`, per scope.
//!
//! The executor never accepts a ref list. It acts on "whatever the
//! package manager currently considers unused", so a stale
//! classification can never drive a removal; callers re-scan for
//! display purposes only.

use tracing::{info, warn};

use spruce_schema::Scope;

use crate::runner::CommandRunner;

/// Marker line the uninstall command prints per removed item.
const UNINSTALL_MARKER: &str = "Uninstalling ";

/// Drives the uninstall-unused command across scopes.
pub struct RemovalExecutor<'a> {
    runner: &'a dyn CommandRunner,
}

// The runner is a bare trait object, so derive(Debug) cannot apply.
impl std::fmt::Debug for RemovalExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalExecutor").finish_non_exhaustive()
    }
}

impl<'a> RemovalExecutor<'a> {
    /// Create an executor over the given runner.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Remove unused refs in every scope, user first (no elevation
    /// needed), system second (polkit may prompt). Returns the number
    /// of items actually removed, summed across scopes.
    ///
    /// A failing scope is logged and skipped; the other scope still
    /// runs.
    pub async fn autoremove(&self, dry_run: bool) -> usize {
        let mut total = 0;
        for scope in Scope::ALL {
            let mut argv = vec!["flatpak", "uninstall", "--unused", scope.flag(), "-y"];
            if dry_run {
                argv.push("--dry-run");
            }
            let out = self.runner.run(&argv).await;
            if !out.success() {
                warn!(%scope, code = out.code, "uninstall command failed");
                continue;
            }
            let removed = count_uninstalled(&out.stdout);
            info!(%scope, removed, "uninstall finished");
            total += removed;
        }
        total
    }
}

/// Count removed items: one per stdout line beginning with the literal
/// `Uninstalling ` marker.
pub(crate) fn count_uninstalled(stdout: &str) -> usize {
    stdout
        .lines()
        .filter(|line| line.starts_with(UNINSTALL_MARKER))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::runner::CommandOutput;

    /// Records invocations and answers each scope's uninstall.
    struct RecordingRunner {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, argv: &[&str]) -> CommandOutput {
            let joined = argv.join(" ");
            self.calls.lock().unwrap().push(joined.clone());
            if joined.contains("--user") {
                CommandOutput {
                    code: 0,
                    stdout: "Uninstalling org.kde.Platform/x86_64/5.15\n\
                             Uninstalling org.kde.Platform.Locale/x86_64/5.15\n"
                        .to_string(),
                    stderr: String::new(),
                }
            } else {
                CommandOutput {
                    code: 0,
                    stdout: "Nothing unused to uninstall\n".to_string(),
                    stderr: String::new(),
                }
            }
        }
    }

    #[test]
    fn marker_counting_is_literal() {
        let out = "Looking for unused refs...\n\
                   Uninstalling org.kde.Platform/x86_64/5.15\n\
                   warning: uninstalling nothing else\n\
                   Uninstalling org.kde.Platform.Locale/x86_64/5.15\n";
        assert_eq!(count_uninstalled(out), 2);
        assert_eq!(count_uninstalled(""), 0);
        // Mid-line occurrences do not count.
        assert_eq!(count_uninstalled("note: Uninstalling happens later\n"), 0);
    }

    #[tokio::test]
    async fn runs_user_then_system_and_sums() {
        let runner = RecordingRunner {
            calls: Mutex::new(Vec::new()),
        };
        let removed = RemovalExecutor::new(&runner).autoremove(false).await;
        assert_eq!(removed, 2);

        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                "flatpak uninstall --unused --user -y",
                "flatpak uninstall --unused --system -y",
            ]
        );
    }

    #[tokio::test]
    async fn dry_run_is_forwarded() {
        let runner = RecordingRunner {
            calls: Mutex::new(Vec::new()),
        };
        RemovalExecutor::new(&runner).autoremove(true).await;
        let calls = runner.calls.lock().unwrap();
        assert!(calls.iter().all(|c| c.ends_with("--dry-run")));
    }

    #[test]
    fn executor_is_debuggable_over_any_runner() {
        let runner = RecordingRunner {
            calls: Mutex::new(Vec::new()),
        };
        let executor = RemovalExecutor::new(&runner);
        assert!(format!("{executor:?}").contains("RemovalExecutor"));
    }

    #[tokio::test]
    async fn failing_scope_is_skipped_not_fatal() {
        struct FailUser;
        #[async_trait]
        impl CommandRunner for FailUser {
            async fn run(&self, argv: &[&str]) -> CommandOutput {
                if argv.contains(&"--user") {
                    CommandOutput {
                        code: 1,
                        stdout: String::new(),
                        stderr: "error".to_string(),
                    }
                } else {
                    CommandOutput {
                        code: 0,
                        stdout: "Uninstalling org.kde.Platform/x86_64/5.15\n".to_string(),
                        stderr: String::new(),
                    }
                }
            }
        }
        let removed = RemovalExecutor::new(&FailUser).autoremove(false).await;
        assert_eq!(removed, 1);
    }
}
