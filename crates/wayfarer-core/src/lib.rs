//! Wayfarer Core - Resilient Operation Layer
//!
//! This crate provides the retry machinery that every browser operation runs
//! through:
//! - Error: one failure taxonomy with transient/terminal classification
//! - Strategies: named retry parameters per operation class
//! - Executor: retry loop with backoff, deadlines, cancellation and attempt records

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod resilience;

pub use error::{Error, Result};
pub use resilience::{
    AttemptOutcome, AttemptRecord, OperationClass, RetryExecutor, RetryReport, Strategy,
    StrategyConfig, StrategyRegistry,
};
