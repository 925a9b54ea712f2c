//! Access policy and file operation kinds

use serde::{Deserialize, Serialize};

/// Default upper bound for files written by tools (50 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// System locations no tool may touch
const SYSTEM_DIRECTORIES: &[&str] = &[
    "/etc",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/bin",
    "/sbin",
    "/usr/bin",
    "/usr/sbin",
    "/var/log",
    "/var/run",
    "/run",
];

/// Kind of file access being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    /// Reading an existing file
    Read,
    /// Creating or overwriting a file
    Write,
}

impl FileOperation {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Allow/deny rules bounding filesystem access
///
/// Denied prefixes always win. With `restrict_to_working_dir` set, only the
/// process working directory is reachable and the other allow rules are
/// ignored. Without it, a path must fall under the temp directory (when
/// `allow_temp_dir` is set) or an `allowed_paths` prefix; with neither rule
/// configured every non-denied path is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Path prefixes tools may access
    #[serde(default)]
    pub allowed_paths: Vec<String>,

    /// Path prefixes tools may never access
    #[serde(default = "default_denied_paths")]
    pub denied_paths: Vec<String>,

    /// Confine access to the current working directory
    #[serde(default = "default_true")]
    pub restrict_to_working_dir: bool,

    /// Permit the system temporary directory
    #[serde(default)]
    pub allow_temp_dir: bool,

    /// Largest payload a tool may write, in bytes (0 = unlimited)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            allowed_paths: Vec::new(),
            denied_paths: default_denied_paths(),
            restrict_to_working_dir: true,
            allow_temp_dir: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl AccessPolicy {
    /// Policy with no rules at all; every path and size is allowed
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            allowed_paths: Vec::new(),
            denied_paths: Vec::new(),
            restrict_to_working_dir: false,
            allow_temp_dir: false,
            max_file_size: 0,
        }
    }

    /// Add an allowed prefix
    #[must_use]
    pub fn allow(mut self, prefix: impl Into<String>) -> Self {
        self.allowed_paths.push(prefix.into());
        self
    }

    /// Add a denied prefix
    #[must_use]
    pub fn deny(mut self, prefix: impl Into<String>) -> Self {
        self.denied_paths.push(prefix.into());
        self
    }

    /// Enable or disable working-directory confinement
    #[must_use]
    pub fn with_working_dir_only(mut self, restrict: bool) -> Self {
        self.restrict_to_working_dir = restrict;
        self
    }

    /// Enable or disable temp directory access
    #[must_use]
    pub fn with_temp_dir(mut self, allow: bool) -> Self {
        self.allow_temp_dir = allow;
        self
    }

    /// Set the maximum write size (0 = unlimited)
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Whether any allow rule besides working-directory confinement is set
    #[must_use]
    pub fn has_allow_rules(&self) -> bool {
        self.allow_temp_dir || !self.allowed_paths.is_empty()
    }
}

fn default_denied_paths() -> Vec<String> {
    SYSTEM_DIRECTORIES.iter().map(|s| (*s).to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}
