//! One module per subcommand.

pub mod autoremove;
pub mod clear;
pub mod completions;
pub mod disk;
pub mod scan;
pub mod sweep;
