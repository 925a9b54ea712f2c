//! Path Sandbox - filesystem access control for tools
//!
//! Every tool that reads or writes local files passes the target path through
//! [`PathSandbox::validate`] (and write payloads through
//! [`PathSandbox::validate_size`]) before touching the disk.
//!
//! Key features:
//! - Path cleaning and symlink resolution before any rule is applied
//! - Deny list that always wins over allow rules
//! - Working-directory confinement, temp-dir and allow-prefix rules
//! - Directory-boundary-aware prefix matching

#![forbid(unsafe_code)]

mod guard;
mod policy;

#[cfg(test)]
mod tests;

pub use guard::{absolutize, resolve_best_effort, PathSandbox};
pub use policy::{AccessPolicy, FileOperation, DEFAULT_MAX_FILE_SIZE};
