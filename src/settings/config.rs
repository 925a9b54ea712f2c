//! Application configuration types

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wayfarer_core::{StrategyConfig, StrategyRegistry};
use wayfarer_tools::browser::{BrowserConfig, SupervisorConfig};
use wayfarer_tools::{AccessPolicy, PathSandbox};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub resilience: ResilienceConfig,
    #[serde(default)]
    pub sandbox: AccessPolicy,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

impl AppConfig {
    /// Built-in strategies with the configured overrides applied
    pub fn strategy_registry(&self) -> Result<StrategyRegistry> {
        StrategyRegistry::from_config(&self.resilience.strategies)
            .context("Invalid [resilience.strategies] configuration")
    }

    /// Path sandbox for the configured policy
    pub fn path_sandbox(&self) -> Result<PathSandbox> {
        PathSandbox::new(self.sandbox.clone()).context("Invalid [sandbox] configuration")
    }

    /// This configuration with every strategy spelled out as the registry sees it
    pub fn effective(&self) -> Result<Self> {
        let registry = self.strategy_registry()?;
        let strategies = registry
            .strategies()
            .iter()
            .map(|s| (s.name.clone(), StrategyConfig::from(s.as_ref())))
            .collect();

        Ok(Self {
            resilience: ResilienceConfig { strategies },
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Overrides and additions keyed by strategy name
    #[serde(default)]
    pub strategies: BTreeMap<String, StrategyConfig>,
}

fn default_level() -> String {
    "info".to_string()
}
