//! Retry strategies
//!
//! A [`Strategy`] is a named, immutable set of retry parameters scoped to an
//! [`OperationClass`]. Strategies are validated once, when they enter a
//! [`StrategyRegistry`](super::StrategyRegistry).

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coarse bucket of browser operations, ordered by aggressiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationClass {
    /// Routine tool operations (navigate, click, screenshot, ...)
    Routine,
    /// Browser-health operations (page recovery, health checks)
    Health,
    /// Critical or destructive operations (browser restart)
    Critical,
}

impl OperationClass {
    /// All classes, least aggressive first
    pub const ALL: [OperationClass; 3] = [Self::Routine, Self::Health, Self::Critical];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Health => "health",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for OperationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Retry parameters for one named strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    /// Unique strategy name
    pub name: String,
    /// Operation class the strategy serves
    pub class: OperationClass,
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Multiplier applied per additional failure
    pub backoff_factor: f64,
    /// Upper bound on the backoff delay (before jitter)
    pub max_delay: Duration,
    /// Random jitter as a fraction of the backoff delay (0.0 = none)
    pub jitter: f64,
    /// Time budget for a single attempt
    pub attempt_timeout: Option<Duration>,
    /// Time budget for the whole call, retries and waits included
    pub deadline: Option<Duration>,
}

impl Strategy {
    /// Create a strategy with conservative defaults
    #[must_use]
    pub fn new(name: impl Into<String>, class: OperationClass) -> Self {
        Self {
            name: name.into(),
            class,
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(5),
            jitter: 0.0,
            attempt_timeout: None,
            deadline: None,
        }
    }

    /// Set maximum attempts
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set base delay
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set backoff growth factor
    #[must_use]
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set maximum delay
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set jitter fraction
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set per-attempt timeout
    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Set overall deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Check the strategy invariants
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidStrategy {
            strategy: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.max_attempts < 1 {
            return Err(invalid("max_attempts must be at least 1"));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(invalid("backoff_factor must be a finite number >= 1"));
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(invalid("jitter must be within 0.0..=1.0"));
        }
        if self.attempt_timeout.is_some_and(|t| t.is_zero())
            || self.deadline.is_some_and(|d| d.is_zero())
        {
            return Err(invalid("timeouts must be non-zero when set"));
        }
        if let (Some(attempt), Some(deadline)) = (self.attempt_timeout, self.deadline) {
            if attempt > deadline {
                return Err(invalid("attempt_timeout must not exceed deadline"));
            }
        }
        Ok(())
    }

    /// Backoff after the given failed attempt (1-based), without jitter
    ///
    /// `min(base_delay * backoff_factor^(attempt - 1), max_delay)`; never
    /// decreases as `attempt` grows.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Backoff plus random jitter of up to `jitter * backoff`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let backoff = self.backoff_delay(attempt);
        if self.jitter <= 0.0 || backoff.is_zero() {
            return backoff;
        }

        let spread = backoff.as_secs_f64() * self.jitter;
        let extra = rand::thread_rng().gen_range(0.0..=spread);
        backoff + Duration::try_from_secs_f64(extra).unwrap_or_default()
    }
}

/// Strategy parameters as they appear in configuration files
///
/// Every field is optional so an entry can override a single parameter of a
/// built-in strategy. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Operation class (required for new strategies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<OperationClass>,
    /// Maximum attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Base delay in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,
    /// Backoff growth factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<f64>,
    /// Backoff cap in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    /// Jitter fraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
    /// Per-attempt timeout in milliseconds (0 = none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_ms: Option<u64>,
    /// Overall deadline in milliseconds (0 = none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl StrategyConfig {
    /// Apply this entry on top of `base`, or build a new strategy when there
    /// is no base. The result is validated.
    pub fn resolve(&self, name: &str, base: Option<&Strategy>) -> Result<Strategy> {
        let mut strategy = match (base, self.class) {
            (Some(base), _) => base.clone(),
            (None, Some(class)) => Strategy::new(name, class),
            (None, None) => {
                return Err(Error::InvalidStrategy {
                    strategy: name.to_string(),
                    reason: "new strategies must declare a class".to_string(),
                })
            }
        };

        if let Some(class) = self.class {
            strategy.class = class;
        }
        if let Some(attempts) = self.max_attempts {
            strategy.max_attempts = attempts;
        }
        if let Some(ms) = self.base_delay_ms {
            strategy.base_delay = Duration::from_millis(ms);
        }
        if let Some(factor) = self.backoff_factor {
            strategy.backoff_factor = factor;
        }
        if let Some(ms) = self.max_delay_ms {
            strategy.max_delay = Duration::from_millis(ms);
        }
        if let Some(jitter) = self.jitter {
            strategy.jitter = jitter;
        }
        if let Some(ms) = self.attempt_timeout_ms {
            strategy.attempt_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(ms) = self.deadline_ms {
            strategy.deadline = (ms > 0).then(|| Duration::from_millis(ms));
        }

        strategy.validate()?;
        Ok(strategy)
    }
}

impl From<&Strategy> for StrategyConfig {
    fn from(strategy: &Strategy) -> Self {
        let ms = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Self {
            class: Some(strategy.class),
            max_attempts: Some(strategy.max_attempts),
            base_delay_ms: Some(ms(strategy.base_delay)),
            backoff_factor: Some(strategy.backoff_factor),
            max_delay_ms: Some(ms(strategy.max_delay)),
            jitter: Some(strategy.jitter),
            attempt_timeout_ms: Some(strategy.attempt_timeout.map_or(0, ms)),
            deadline_ms: Some(strategy.deadline.map_or(0, ms)),
        }
    }
}
