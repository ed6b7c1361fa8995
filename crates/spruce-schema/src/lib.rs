//! Shared types for spruce: the Flatpak ref grammar, installation scopes,
//! and the keep-policy configuration.
//!
//! Everything in this crate is pure data: no I/O, no process spawning.
//! The engine crate (`spruce-core`) builds these values from external
//! command output; this crate only defines what they mean.

pub mod flatref;
pub mod policy;
pub mod scope;

pub use flatref::{Ref, RefError, RefKind};
pub use policy::KeepPolicy;
pub use scope::{AppRecord, Classification, Scope};
