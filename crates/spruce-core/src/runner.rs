//! External command invocation.
//!
//! The rest of the engine only ever sees captured (exit code, stdout,
//! stderr) triples. Spawn failures, missing binaries, and timeouts all
//! collapse into a failed [`CommandOutput`]; nothing here returns an
//! error.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Default deadline for a single external command. The queries we issue
/// are cheap and read-only; anything slower than this is wedged.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process could not be spawned, was killed
    /// by a signal, or exceeded its deadline.
    pub code: i32,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    fn failed() -> Self {
        Self {
            code: -1,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Seam for external command execution.
///
/// Production uses [`HostRunner`]; tests inject scripted outputs so the
/// inventory reader and executor can be exercised without a flatpak
/// installation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` (program plus arguments) and capture its output.
    /// Never errors; see [`CommandOutput::code`] for the failure shape.
    async fn run(&self, argv: &[&str]) -> CommandOutput;
}

/// Whether we are running inside a Flatpak sandbox ourselves.
///
/// Inside the sandbox, commands must be re-dispatched to the host via
/// `flatpak-spawn --host`; the wrapping changes how commands are
/// invoked, not what they mean.
pub fn is_sandboxed() -> bool {
    std::env::var_os("FLATPAK_ID").is_some()
}

/// Whether the `flatpak` binary is reachable at all. Used for an early
/// warning; the runner itself degrades gracefully without it.
pub fn flatpak_available() -> bool {
    is_sandboxed() || which::which("flatpak").is_ok()
}

/// The production runner: spawns processes on the host, with the
/// sandbox indirection prefix when needed and a per-command deadline.
#[derive(Debug, Clone)]
pub struct HostRunner {
    sandboxed: bool,
    timeout: Duration,
}

impl Default for HostRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRunner {
    /// Create a runner with sandbox auto-detection and the default
    /// deadline.
    pub fn new() -> Self {
        Self {
            sandboxed: is_sandboxed(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-command deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, argv: &[&str]) -> CommandOutput {
        // Re-dispatch the same argument list to the host when sandboxed.
        let host_prefix: &[&str] = if self.sandboxed {
            &["flatpak-spawn", "--host"]
        } else {
            &[]
        };
        let full: Vec<&str> = host_prefix.iter().chain(argv.iter()).copied().collect();

        let Some((program, args)) = full.split_first() else {
            return CommandOutput::failed();
        };

        debug!(command = ?full, "spawning");

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(out)) => CommandOutput {
                code: out.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            },
            Ok(Err(err)) => {
                warn!(program, %err, "failed to spawn command");
                CommandOutput::failed()
            }
            Err(_) => {
                warn!(program, timeout = ?self.timeout, "command exceeded deadline");
                CommandOutput::failed()
            }
        }
    }
}
