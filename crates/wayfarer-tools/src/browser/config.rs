//! Browser tool configuration
//!
//! Configuration types for the browser tool and the escalation supervisor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Browser tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Whether browser tool is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for generated pages when no path is given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Default timeout for `wait_for_element` in milliseconds
    #[serde(default = "default_wait_timeout_ms")]
    pub default_wait_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_output_dir(),
            default_wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

/// Escalation supervisor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Whether routine failures are escalated
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Consecutive exhausted operations that trigger a health check
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: default_failure_threshold(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_wait_timeout_ms() -> u64 {
    super::DEFAULT_WAIT_TIMEOUT_MS
}

fn default_failure_threshold() -> u32 {
    3
}
