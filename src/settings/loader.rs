//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("WAYFARER_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority)
        // WAYFARER_SANDBOX__MAX_FILE_SIZE: single "_" after the prefix, "__" between keys
        .add_source(
            Environment::with_prefix("WAYFARER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LogFormat;
    use wayfarer_core::OperationClass;

    fn embedded() -> AppConfig {
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config = embedded();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.resilience.strategies.len(), 5);
        assert!(config.sandbox.restrict_to_working_dir);
        assert!(config.browser.enabled);
        assert_eq!(config.supervisor.failure_threshold, 3);
    }

    #[test]
    fn test_embedded_strategies_match_builtins() {
        let registry = embedded().strategy_registry().unwrap();
        let builtin = wayfarer_core::StrategyRegistry::with_defaults();

        assert_eq!(registry.len(), builtin.len());
        for strategy in builtin.strategies() {
            let configured = registry.get(&strategy.name).unwrap();
            assert_eq!(configured.as_ref(), strategy.as_ref());
        }
    }

    #[test]
    fn test_effective_config_lists_every_strategy() {
        let mut config = AppConfig::default();
        assert!(config.resilience.strategies.is_empty());

        config = config.effective().unwrap();
        assert_eq!(config.resilience.strategies.len(), 5);
        assert_eq!(
            config.resilience.strategies["browser_restart"].class,
            Some(OperationClass::Critical)
        );
    }

    #[test]
    fn test_invalid_strategy_override_fails() {
        let mut config = embedded();
        config
            .resilience
            .strategies
            .get_mut("navigation")
            .unwrap()
            .max_attempts = Some(0);

        assert!(config.strategy_registry().is_err());
    }
}
