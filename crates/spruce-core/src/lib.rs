//! spruce-core - the engine behind the `spruce` cleaner.
//!
//! # Architecture
//!
//! - **Command runner**: every external query goes through the
//!   [`runner::CommandRunner`] trait; the production implementation
//!   routes through `flatpak-spawn --host` inside the sandbox and
//!   bounds every invocation with a timeout. Failures never raise;
//!   they surface as a non-zero exit code and empty output.
//! - **Inventory reader**: [`inventory::InventoryReader`] turns command
//!   output into typed records, with layered fallback parsers for the
//!   CLI-format drift across flatpak versions. A scope whose inventory
//!   cannot be determined is flagged `degraded` rather than reported as
//!   empty, so the classifier never mistakes "query failed" for
//!   "nothing installed".
//! - **Usage classifier**: [`classify`] is pure and synchronous; it
//!   partitions each scope's refs into removable / pinned / kept /
//!   in-use. All I/O happens before it runs.
//! - **Removal executor**: [`executor`] acts only on "whatever is
//!   currently unused" per the package manager itself; it never accepts
//!   an external ref list, so stale classifications cannot drive a
//!   removal.
//! - **Cache sweep / disk usage**: the simpler housekeeping half --
//!   sizing and deleting cache directories, and host-aware filesystem
//!   totals.

pub mod classify;
pub mod config;
pub mod disk;
pub mod executor;
pub mod inventory;
pub mod paths;
pub mod runner;
pub mod sweep;

pub use classify::{Partition, Report, classify_scope, merge};
pub use config::load_policy;
pub use executor::RemovalExecutor;
pub use inventory::{InventoryReader, ScopeInventory};
pub use runner::{CommandOutput, CommandRunner, HostRunner, is_sandboxed};
