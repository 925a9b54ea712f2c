//! Wayfarer Tools - Browser Operations and Path Sandbox
//!
//! This crate provides the browser-facing half of Wayfarer:
//! - Driver: the capability contract an external browser driver implements
//! - Browser: resilient operation façade, escalation supervisor and `browser` tool
//! - Sandbox: path validation guarding every file the tools write
//! - Tool: the definition and result shape every tool exposes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod browser;
pub mod driver;
pub mod error;
pub mod sandbox;
pub mod tool;

pub use browser::{BrowserOperations, BrowserTool, Supervisor};
pub use driver::{BrowserDriver, PageId, PageInfo};
pub use error::{Error, Result};
pub use sandbox::{AccessPolicy, FileOperation, PathSandbox};
pub use tool::{RiskLevel, Tool, ToolDefinition, ToolResult};
