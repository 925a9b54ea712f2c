//! Strategy registry
//!
//! Immutable name → [`Strategy`] table. Built once at startup (defaults plus
//! configuration overrides) and shared behind an `Arc`; lookups take no locks.

use super::strategy::{OperationClass, Strategy, StrategyConfig};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Routine browser tool operations
pub const TOOL_OPERATION: &str = "tool_operation";
/// Navigation, which tolerates slower page loads
pub const NAVIGATION: &str = "navigation";
/// Recovering an individual page
pub const PAGE_RECOVERY: &str = "page_recovery";
/// Browser health checks
pub const BROWSER_HEALTH: &str = "browser_health";
/// Full browser restart
pub const BROWSER_RESTART: &str = "browser_restart";

/// Built-in strategy table
#[must_use]
pub fn default_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(TOOL_OPERATION, OperationClass::Routine)
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(200))
            .with_backoff_factor(2.0)
            .with_max_delay(Duration::from_secs(2))
            .with_jitter(0.1)
            .with_attempt_timeout(Duration::from_secs(30))
            .with_deadline(Duration::from_secs(90)),
        Strategy::new(NAVIGATION, OperationClass::Routine)
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(500))
            .with_backoff_factor(2.0)
            .with_max_delay(Duration::from_secs(4))
            .with_jitter(0.1)
            .with_attempt_timeout(Duration::from_secs(45))
            .with_deadline(Duration::from_secs(120)),
        Strategy::new(PAGE_RECOVERY, OperationClass::Health)
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(500))
            .with_backoff_factor(2.0)
            .with_max_delay(Duration::from_secs(5))
            .with_jitter(0.1)
            .with_attempt_timeout(Duration::from_secs(20))
            .with_deadline(Duration::from_secs(60)),
        Strategy::new(BROWSER_HEALTH, OperationClass::Health)
            .with_max_attempts(2)
            .with_base_delay(Duration::from_secs(1))
            .with_backoff_factor(2.0)
            .with_max_delay(Duration::from_secs(5))
            .with_attempt_timeout(Duration::from_secs(15))
            .with_deadline(Duration::from_secs(45)),
        // Restarting the browser process is expensive; keep it to two tries.
        Strategy::new(BROWSER_RESTART, OperationClass::Critical)
            .with_max_attempts(2)
            .with_base_delay(Duration::from_secs(2))
            .with_backoff_factor(1.0)
            .with_max_delay(Duration::from_secs(2))
            .with_attempt_timeout(Duration::from_secs(60))
            .with_deadline(Duration::from_secs(150)),
    ]
}

/// Read-only strategy table
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<Strategy>>,
}

impl StrategyRegistry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder::default()
    }

    /// Registry holding the built-in strategies
    #[must_use]
    pub fn with_defaults() -> Self {
        let strategies = default_strategies()
            .into_iter()
            .map(|s| {
                debug_assert!(s.validate().is_ok(), "invalid default strategy {}", s.name);
                (s.name.clone(), Arc::new(s))
            })
            .collect();
        Self { strategies }
    }

    /// Built-in strategies with configuration entries layered on top
    ///
    /// Entries naming an existing strategy override individual parameters;
    /// other entries register new strategies and must declare a class.
    pub fn from_config(overrides: &BTreeMap<String, StrategyConfig>) -> Result<Self> {
        let mut builder = Self::builder().with_defaults();
        for (name, config) in overrides {
            let base = builder.strategies.get(name).cloned();
            let strategy = config.resolve(name, base.as_deref())?;
            debug!(strategy = %name, class = %strategy.class, "Applying strategy override");
            builder.strategies.insert(name.clone(), Arc::new(strategy));
        }
        Ok(builder.build())
    }

    /// Look up a strategy by name
    pub fn get(&self, name: &str) -> Result<Arc<Strategy>> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownStrategy {
                strategy: name.to_string(),
            })
    }

    /// Check if a strategy exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Look up a strategy and check that it serves `class`
    pub fn expect_class(&self, name: &str, class: OperationClass) -> Result<Arc<Strategy>> {
        let strategy = self.get(name)?;
        if strategy.class != class {
            return Err(Error::InvalidStrategy {
                strategy: name.to_string(),
                reason: format!("expected class {}, found {}", class, strategy.class),
            });
        }
        Ok(strategy)
    }

    /// All strategies, ordered by class then name
    #[must_use]
    pub fn strategies(&self) -> Vec<Arc<Strategy>> {
        let mut all: Vec<_> = self.strategies.values().cloned().collect();
        all.sort_by(|a, b| a.class.cmp(&b.class).then_with(|| a.name.cmp(&b.name)));
        all
    }

    /// Strategies serving one class, ordered by name
    #[must_use]
    pub fn for_class(&self, class: OperationClass) -> Vec<Arc<Strategy>> {
        self.strategies()
            .into_iter()
            .filter(|s| s.class == class)
            .collect()
    }

    /// Get strategy count
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Builder that validates strategies as they are registered
#[derive(Debug, Default)]
pub struct StrategyRegistryBuilder {
    strategies: HashMap<String, Arc<Strategy>>,
}

impl StrategyRegistryBuilder {
    /// Seed with the built-in strategies
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.strategies = StrategyRegistry::with_defaults().strategies;
        self
    }

    /// Register a strategy, rejecting invalid parameters and duplicate names
    pub fn register(mut self, strategy: Strategy) -> Result<Self> {
        strategy.validate()?;
        if self.strategies.contains_key(&strategy.name) {
            return Err(Error::InvalidStrategy {
                strategy: strategy.name,
                reason: "a strategy with this name is already registered".to_string(),
            });
        }
        debug!(strategy = %strategy.name, class = %strategy.class, "Registering strategy");
        self.strategies
            .insert(strategy.name.clone(), Arc::new(strategy));
        Ok(self)
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> StrategyRegistry {
        StrategyRegistry {
            strategies: self.strategies,
        }
    }
}
