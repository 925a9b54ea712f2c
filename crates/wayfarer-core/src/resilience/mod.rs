//! Resilient execution
//!
//! - strategy: named retry parameters scoped to an operation class
//! - registry: immutable strategy table with built-in defaults
//! - executor: retry loop with backoff, deadlines and cancellation

mod executor;
mod registry;
mod strategy;

pub use executor::{AttemptOutcome, AttemptRecord, RetryExecutor, RetryReport};
pub use registry::{
    default_strategies, StrategyRegistry, StrategyRegistryBuilder, BROWSER_HEALTH,
    BROWSER_RESTART, NAVIGATION, PAGE_RECOVERY, TOOL_OPERATION,
};
pub use strategy::{OperationClass, Strategy, StrategyConfig};
