//! Retry executor
//!
//! Runs a unit of work under a named [`Strategy`]: transient failures are
//! retried with exponential backoff, terminal failures abort at once, and the
//! strategy's overall deadline bounds the whole call. Waits are cancellable.

use super::registry::StrategyRegistry;
use super::strategy::{OperationClass, Strategy};
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How a single attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The unit of work succeeded
    Success,
    /// Failed with a retryable error
    TransientFailure,
    /// Failed with an error retrying cannot fix
    TerminalFailure,
    /// Abandoned because the caller cancelled
    Cancelled,
}

impl AttemptOutcome {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::TransientFailure => "transient_failure",
            Self::TerminalFailure => "terminal_failure",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One attempt of one call; lives only as long as the call's report
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// Operation name
    pub operation: String,
    /// Strategy name
    pub strategy: String,
    /// Strategy class
    pub class: OperationClass,
    /// 1-based attempt index
    pub attempt: u32,
    /// How the attempt ended
    pub outcome: AttemptOutcome,
    /// Time spent in the attempt
    pub elapsed: Duration,
}

impl AttemptRecord {
    fn emit(&self, max_attempts: u32, error: Option<&Error>) {
        let elapsed_ms = self.elapsed.as_millis() as u64;
        match (self.outcome, error) {
            (AttemptOutcome::Success, _) => debug!(
                operation = %self.operation,
                strategy = %self.strategy,
                class = %self.class,
                attempt = self.attempt,
                max_attempts,
                outcome = self.outcome.as_str(),
                elapsed_ms,
                "Attempt succeeded"
            ),
            (_, Some(e)) => warn!(
                operation = %self.operation,
                strategy = %self.strategy,
                class = %self.class,
                attempt = self.attempt,
                max_attempts,
                outcome = self.outcome.as_str(),
                elapsed_ms,
                error = %e,
                "Attempt failed"
            ),
            (_, None) => warn!(
                operation = %self.operation,
                strategy = %self.strategy,
                class = %self.class,
                attempt = self.attempt,
                max_attempts,
                outcome = self.outcome.as_str(),
                elapsed_ms,
                "Attempt abandoned"
            ),
        }
    }
}

/// Result of a retried call together with its attempt history
#[derive(Debug)]
pub struct RetryReport<T> {
    /// Final result
    pub result: Result<T>,
    /// Attempts in order
    pub attempts: Vec<AttemptRecord>,
    /// Total time, waits included
    pub elapsed: Duration,
}

/// Executes units of work under named strategies
///
/// Cheap to clone and safe to share: the only state is the read-only
/// registry. Every call owns its attempt loop and timers.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    registry: Arc<StrategyRegistry>,
}

impl RetryExecutor {
    /// Create an executor over `registry`
    #[must_use]
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self { registry }
    }

    /// Get the registry
    #[must_use]
    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// Run a unit of work that produces no value
    pub async fn run<F, Fut>(&self, strategy: &str, operation: &str, work: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.run_with_result(strategy, operation, work).await
    }

    /// Run a unit of work and return its value
    pub async fn run_with_result<T, F, Fut>(
        &self,
        strategy: &str,
        operation: &str,
        work: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_with_report(strategy, operation, work).await.result
    }

    /// [`run`](Self::run) that stops when `cancel` fires
    pub async fn run_cancellable<F, Fut>(
        &self,
        strategy: &str,
        operation: &str,
        cancel: &CancellationToken,
        work: F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.run_with_result_cancellable(strategy, operation, cancel, work)
            .await
    }

    /// [`run_with_result`](Self::run_with_result) that stops when `cancel` fires
    pub async fn run_with_result_cancellable<T, F, Fut>(
        &self,
        strategy: &str,
        operation: &str,
        cancel: &CancellationToken,
        work: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_with_report_cancellable(strategy, operation, cancel, work)
            .await
            .result
    }

    /// Run a unit of work and keep the attempt history
    pub async fn run_with_report<T, F, Fut>(
        &self,
        strategy: &str,
        operation: &str,
        work: F,
    ) -> RetryReport<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let never = CancellationToken::new();
        self.run_with_report_cancellable(strategy, operation, &never, work)
            .await
    }

    /// Run a unit of work under `strategy`, keeping the attempt history
    ///
    /// An unknown strategy fails immediately without invoking `work`.
    pub async fn run_with_report_cancellable<T, F, Fut>(
        &self,
        strategy: &str,
        operation: &str,
        cancel: &CancellationToken,
        mut work: F,
    ) -> RetryReport<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempts = Vec::new();

        let result = match self.registry.get(strategy) {
            Ok(strategy) => {
                let mut call = Call {
                    strategy: strategy.as_ref(),
                    operation,
                    started,
                    deadline: strategy.deadline.and_then(|d| started.checked_add(d)),
                    records: &mut attempts,
                };
                call.drive(cancel, &mut work).await
            }
            Err(e) => {
                warn!(strategy = %strategy, operation = %operation, "Unknown retry strategy");
                Err(e)
            }
        };

        RetryReport {
            result,
            attempts,
            elapsed: started.elapsed(),
        }
    }
}

/// State of one executor call
struct Call<'a> {
    strategy: &'a Strategy,
    operation: &'a str,
    started: Instant,
    deadline: Option<Instant>,
    records: &'a mut Vec<AttemptRecord>,
}

impl Call<'_> {
    async fn drive<T, F, Fut>(&mut self, cancel: &CancellationToken, work: &mut F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error: Option<Error> = None;

        for attempt in 1..=self.strategy.max_attempts {
            if cancel.is_cancelled() {
                return Err(self.cancelled(attempt - 1));
            }

            let budget = match self.attempt_budget() {
                Some(budget) if budget.is_zero() => {
                    return Err(self.deadline_exceeded(attempt - 1, last_error));
                }
                budget => budget,
            };

            let attempt_started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.attempt(work(), budget) => Some(result),
            };
            let elapsed = attempt_started.elapsed();

            let error = match outcome {
                None => {
                    self.record(attempt, AttemptOutcome::Cancelled, elapsed, None);
                    return Err(self.cancelled(attempt));
                }
                Some(Ok(value)) => {
                    self.record(attempt, AttemptOutcome::Success, elapsed, None);
                    if attempt > 1 {
                        debug!(
                            operation = %self.operation,
                            strategy = %self.strategy.name,
                            attempts = attempt,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Some(Err(e)) => e,
            };

            if !error.is_transient() {
                self.record(attempt, AttemptOutcome::TerminalFailure, elapsed, Some(&error));
                return Err(Error::Terminal {
                    operation: self.operation.to_string(),
                    strategy: self.strategy.name.clone(),
                    attempts: attempt,
                    source: Box::new(error),
                });
            }
            self.record(attempt, AttemptOutcome::TransientFailure, elapsed, Some(&error));

            let now = Instant::now();
            if self.deadline.is_some_and(|deadline| now >= deadline) {
                return Err(self.deadline_exceeded(attempt, Some(error)));
            }
            if attempt == self.strategy.max_attempts {
                last_error = Some(error);
                break;
            }

            let delay = self.strategy.delay_for_attempt(attempt);
            if let Some(deadline) = self.deadline {
                let wakes_at = now.checked_add(delay);
                if wakes_at.map_or(true, |t| t >= deadline) {
                    return Err(self.deadline_exceeded(attempt, Some(error)));
                }
            }

            debug!(
                operation = %self.operation,
                strategy = %self.strategy.name,
                attempt,
                max_attempts = self.strategy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying after transient failure"
            );
            last_error = Some(error);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(attempt)),
                _ = sleep(delay) => {}
            }
        }

        let attempts = self.strategy.max_attempts;
        let source = last_error.unwrap_or_else(|| Error::InvalidStrategy {
            strategy: self.strategy.name.clone(),
            reason: "no attempt was made".to_string(),
        });
        warn!(
            operation = %self.operation,
            strategy = %self.strategy.name,
            attempts,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            error = %source,
            "Operation failed after all retry attempts"
        );
        Err(Error::Exhausted {
            operation: self.operation.to_string(),
            strategy: self.strategy.name.clone(),
            attempts,
            source: Box::new(source),
        })
    }

    async fn attempt<T, Fut>(&self, fut: Fut, budget: Option<Duration>) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match budget {
            Some(budget) => timeout(budget, fut).await.unwrap_or_else(|_| {
                Err(Error::Timeout {
                    operation: self.operation.to_string(),
                    after: budget,
                })
            }),
            None => fut.await,
        }
    }

    /// Per-attempt timeout clipped to what is left of the deadline
    fn attempt_budget(&self) -> Option<Duration> {
        let remaining = self
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        match (self.strategy.attempt_timeout, remaining) {
            (Some(per_attempt), Some(remaining)) => Some(per_attempt.min(remaining)),
            (per_attempt, remaining) => per_attempt.or(remaining),
        }
    }

    fn record(
        &mut self,
        attempt: u32,
        outcome: AttemptOutcome,
        elapsed: Duration,
        error: Option<&Error>,
    ) {
        let record = AttemptRecord {
            operation: self.operation.to_string(),
            strategy: self.strategy.name.clone(),
            class: self.strategy.class,
            attempt,
            outcome,
            elapsed,
        };
        record.emit(self.strategy.max_attempts, error);
        self.records.push(record);
    }

    fn cancelled(&self, attempts: u32) -> Error {
        debug!(
            operation = %self.operation,
            strategy = %self.strategy.name,
            attempts,
            "Operation cancelled"
        );
        Error::Cancelled {
            operation: self.operation.to_string(),
            strategy: self.strategy.name.clone(),
            attempts,
        }
    }

    fn deadline_exceeded(&self, attempts: u32, last_error: Option<Error>) -> Error {
        let elapsed = self.started.elapsed();
        warn!(
            operation = %self.operation,
            strategy = %self.strategy.name,
            attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            "Operation deadline exceeded"
        );
        Error::DeadlineExceeded {
            operation: self.operation.to_string(),
            strategy: self.strategy.name.clone(),
            attempts,
            elapsed,
            last_error: last_error.map(Box::new),
        }
    }
}
