//! Application settings
//!
//! Configuration types and the layered loader.

mod config;
mod loader;

pub use self::config::{AppConfig, LogFormat, LoggingConfig, ResilienceConfig};
pub use loader::{load_config, DEFAULT_CONFIG};
