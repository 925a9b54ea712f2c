//! Error types for wayfarer-core
//!
//! A single taxonomy shared by the retry executor, the browser façade and the
//! path sandbox. [`Error::is_transient`] is the only place where a failure is
//! classified as retryable.

use std::time::Duration;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// No strategy is registered under this name
    #[error("configuration error: strategy not found: {strategy}")]
    UnknownStrategy {
        /// Requested strategy name
        strategy: String,
    },

    /// Strategy parameters violate an invariant
    #[error("configuration error: invalid strategy '{strategy}': {reason}")]
    InvalidStrategy {
        /// Strategy name
        strategy: String,
        /// Violated invariant
        reason: String,
    },

    /// Invalid caller argument
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Path rejected by the access policy
    #[error("access denied for '{path}': {reason}")]
    AccessDenied {
        /// Path as supplied by the caller
        path: String,
        /// Rule that rejected the path
        reason: String,
    },

    /// Write payload larger than the configured maximum
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    SizeExceeded {
        /// Payload size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// A single attempt ran past its time budget
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        /// Operation name
        operation: String,
        /// Budget that elapsed
        after: Duration,
    },

    /// Network/connection error talking to the browser
    #[error("network error: {0}")]
    Network(String),

    /// Error reported by the browser driver
    #[error("driver error: {message}")]
    Driver {
        /// Driver message
        message: String,
        /// Whether the driver tagged the failure as recoverable
        recoverable: bool,
    },

    /// A non-retryable failure, annotated with where it happened
    #[error("{operation} failed after {attempts} attempt(s) [strategy {strategy}]: {source}")]
    Terminal {
        /// Operation name
        operation: String,
        /// Strategy that ran the operation
        strategy: String,
        /// Attempts made
        attempts: u32,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Every permitted attempt failed
    #[error("{operation} exhausted {attempts} attempt(s) [strategy {strategy}]: {source}")]
    Exhausted {
        /// Operation name
        operation: String,
        /// Strategy that ran the operation
        strategy: String,
        /// Attempts made
        attempts: u32,
        /// Failure observed on the final attempt
        #[source]
        source: Box<Error>,
    },

    /// The overall time budget elapsed before the operation succeeded
    #[error(
        "{operation} exceeded its deadline after {attempts} attempt(s) in {}ms [strategy {strategy}]",
        .elapsed.as_millis()
    )]
    DeadlineExceeded {
        /// Operation name
        operation: String,
        /// Strategy that ran the operation
        strategy: String,
        /// Attempts made
        attempts: u32,
        /// Time spent before giving up
        elapsed: Duration,
        /// Last failure seen, if any attempt completed
        last_error: Option<Box<Error>>,
    },

    /// The caller cancelled the operation
    #[error("{operation} cancelled after {attempts} attempt(s) [strategy {strategy}]")]
    Cancelled {
        /// Operation name
        operation: String,
        /// Strategy that ran the operation
        strategy: String,
        /// Attempts started
        attempts: u32,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Driver failure the driver marked as worth retrying
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
            recoverable: true,
        }
    }

    /// Driver failure that retrying cannot fix
    pub fn unrecoverable(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
            recoverable: false,
        }
    }

    /// Access-policy rejection
    pub fn access_denied(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether another attempt could plausibly succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network(_) => true,
            Self::Driver { recoverable, .. } => *recoverable,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Configuration problems are fatal to the call and never retried
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownStrategy { .. } | Self::InvalidStrategy { .. }
        )
    }

    /// Ran out of tries or ran out of time
    #[must_use]
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::DeadlineExceeded { .. })
    }

    /// Attempt count carried by executor-produced errors
    #[must_use]
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Terminal { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::DeadlineExceeded { attempts, .. }
            | Self::Cancelled { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Operation name carried by executor-produced errors
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Terminal { operation, .. }
            | Self::Exhausted { operation, .. }
            | Self::DeadlineExceeded { operation, .. }
            | Self::Cancelled { operation, .. }
            | Self::Timeout { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Innermost failure, skipping executor annotations
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Terminal { source, .. } | Self::Exhausted { source, .. } => source.root_cause(),
            Self::DeadlineExceeded {
                last_error: Some(last),
                ..
            } => last.root_cause(),
            _ => self,
        }
    }

    /// Operator hint for the CLI and tool output
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnknownStrategy { .. } | Self::InvalidStrategy { .. } => {
                Some("check the [resilience.strategies] section of the configuration")
            }
            Self::AccessDenied { .. } => {
                Some("adjust [sandbox] allowed_paths / denied_paths or pick another path")
            }
            Self::SizeExceeded { .. } => Some("raise [sandbox] max_file_size (0 = unlimited)"),
            Self::Exhausted { .. } => {
                Some("the browser may be unhealthy; run ensure_healthy or restart_browser")
            }
            Self::DeadlineExceeded { .. } => {
                Some("the operation is slow; raise deadline_ms for its strategy")
            }
            _ => None,
        }
    }
}
