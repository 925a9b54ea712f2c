//! Browser Automation Module
//!
//! Resilient browser operations over an external [`BrowserDriver`](crate::driver::BrowserDriver).
//!
//! ## Layers
//!
//! - [`BrowserOperations`]: one retry strategy per action, page reuse on navigate
//! - [`Supervisor`]: escalates repeated exhausted retries to a health check and restart
//! - [`BrowserTool`]: JSON actions for tool callers, with sandboxed file writes
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayfarer_core::{RetryExecutor, StrategyRegistry};
//! use wayfarer_tools::browser::BrowserOperations;
//! use wayfarer_tools::driver::BrowserDriver;
//!
//! # async fn example(driver: Arc<dyn BrowserDriver>) -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RetryExecutor::new(Arc::new(StrategyRegistry::with_defaults()));
//! let browser = BrowserOperations::new(driver, executor)?;
//!
//! let page = browser.navigate("https://example.com").await?;
//! browser.click(&page, "#submit-button").await?;
//! let png = browser.screenshot(&page).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [browser]
//! enabled = true
//! output_dir = "artifacts"
//! default_wait_timeout_ms = 30000
//!
//! [supervisor]
//! enabled = true
//! failure_threshold = 3
//! ```

mod actions;
mod config;
mod facade;
mod supervisor;
mod tool;

#[cfg(test)]
mod testing;

/// Default `wait_for_element` timeout in milliseconds (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

pub use actions::BrowserAction;
pub use config::{BrowserConfig, SupervisorConfig};
pub use facade::{BrowserOperations, BLANK_PAGE, MAX_RESTART_ATTEMPTS};
pub use supervisor::Supervisor;
pub use tool::BrowserTool;
