//! Escalation supervisor
//!
//! Watches routine operations and, after enough consecutive exhausted
//! retries, checks browser health and restarts the browser when the check
//! fails. Failures are still reported to the caller unchanged.

use super::config::SupervisorConfig;
use super::facade::BrowserOperations;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use wayfarer_core::{Error, Result};

/// Escalates repeated routine failures to health checks and restarts
#[derive(Debug)]
pub struct Supervisor {
    operations: Arc<BrowserOperations>,
    enabled: bool,
    failure_threshold: u32,
    consecutive_failures: AtomicU32,
    escalations: AtomicU32,
    escalating: Mutex<()>,
}

impl Supervisor {
    /// Create a supervisor over `operations`
    #[must_use]
    pub fn new(operations: Arc<BrowserOperations>, config: &SupervisorConfig) -> Self {
        Self {
            operations,
            enabled: config.enabled,
            failure_threshold: config.failure_threshold.max(1),
            consecutive_failures: AtomicU32::new(0),
            escalations: AtomicU32::new(0),
            escalating: Mutex::new(()),
        }
    }

    /// Whether failures are counted and escalated
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the supervised operations
    #[must_use]
    pub fn operations(&self) -> &Arc<BrowserOperations> {
        &self.operations
    }

    /// Await `operation` and record its outcome
    pub async fn supervise<T, Fut>(&self, operation: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let result = operation.await;
        match &result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(e).await,
        }
        result
    }

    /// Reset the consecutive failure count
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    /// Count `error` if it is an exhausted retry, escalating at the threshold
    ///
    /// Terminal and configuration errors say nothing about browser health and
    /// leave the count untouched, as does every error when disabled.
    pub async fn record_failure(&self, error: &Error) {
        if !self.enabled || !error.is_exhaustion() {
            return;
        }

        let count = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            consecutive_failures = count,
            threshold = self.failure_threshold,
            "Routine operation exhausted its retries"
        );

        if count >= self.failure_threshold {
            self.escalate(count).await;
        }
    }

    /// Consecutive exhausted operations since the last success or escalation
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// Number of escalations performed
    #[must_use]
    pub fn escalations(&self) -> u32 {
        self.escalations.load(Ordering::SeqCst)
    }

    async fn escalate(&self, count: u32) {
        // One escalation at a time; concurrent failures ride on the running one
        let Ok(_guard) = self.escalating.try_lock() else {
            debug!("Escalation already in progress");
            return;
        };

        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.escalations.fetch_add(1, Ordering::SeqCst);
        warn!(
            consecutive_failures = count,
            "Repeated failures, checking browser health"
        );

        let health = match self.operations.ensure_healthy().await {
            Ok(()) => {
                info!("Browser is healthy, no restart needed");
                return;
            }
            Err(e) => e,
        };

        warn!(error = %health, "Health check failed, restarting browser");
        match self.operations.restart_browser().await {
            Ok(()) => info!("Browser restart completed"),
            Err(e) => error!(error = %e, "Browser restart failed"),
        }
    }
}
