//! Browser actions
//!
//! Defines the actions that can be performed by the browser tool.

use crate::driver::PageId;
use serde::{Deserialize, Serialize};
use wayfarer_core::OperationClass;

/// Browser action types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BrowserAction {
    /// Navigate to a URL, reusing the first open page
    Navigate {
        /// URL to navigate to
        url: String,
    },

    /// Open a new page from a URL or from HTML content
    CreatePage {
        /// URL to open
        #[serde(default)]
        url: Option<String>,
        /// HTML content written to disk and opened as a file URL
        #[serde(default)]
        html: Option<String>,
        /// Where to write `html` (defaults to the output directory)
        #[serde(default)]
        path: Option<String>,
    },

    /// List open pages
    ListPages,

    /// Take a screenshot
    Screenshot {
        /// Target page
        page_id: PageId,
        /// Path to save the PNG (returned base64-encoded when omitted)
        #[serde(default)]
        path: Option<String>,
    },

    /// Evaluate JavaScript in the page
    ExecuteScript {
        /// Target page
        page_id: PageId,
        /// JavaScript code to evaluate
        script: String,
    },

    /// Click on an element
    Click {
        /// Target page
        page_id: PageId,
        /// CSS selector for the element
        selector: String,
    },

    /// Get text content of an element
    GetText {
        /// Target page
        page_id: PageId,
        /// CSS selector for the element
        selector: String,
    },

    /// Wait for an element to appear
    WaitForElement {
        /// Target page
        page_id: PageId,
        /// CSS selector to wait for
        selector: String,
        /// Timeout in milliseconds
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Reload a page, or replace it when it is gone
    RecoverPage {
        /// Page to recover
        page_id: PageId,
    },

    /// Check that the browser responds
    EnsureHealthy,

    /// Restart the browser; invalidates every page id
    RestartBrowser,
}

impl BrowserAction {
    /// Get the action name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::CreatePage { .. } => "create_page",
            Self::ListPages => "list_pages",
            Self::Screenshot { .. } => "screenshot",
            Self::ExecuteScript { .. } => "execute_script",
            Self::Click { .. } => "click",
            Self::GetText { .. } => "get_text",
            Self::WaitForElement { .. } => "wait_for_element",
            Self::RecoverPage { .. } => "recover_page",
            Self::EnsureHealthy => "ensure_healthy",
            Self::RestartBrowser => "restart_browser",
        }
    }

    /// Operation class the action runs under
    #[must_use]
    pub fn class(&self) -> OperationClass {
        match self {
            Self::RecoverPage { .. } | Self::EnsureHealthy => OperationClass::Health,
            Self::RestartBrowser => OperationClass::Critical,
            _ => OperationClass::Routine,
        }
    }

    /// Whether the action writes to the local filesystem
    #[must_use]
    pub fn writes_files(&self) -> bool {
        match self {
            Self::Screenshot { path, .. } => path.is_some(),
            Self::CreatePage { html, .. } => html.is_some(),
            _ => false,
        }
    }

    /// All action names, in schema order
    pub const NAMES: &'static [&'static str] = &[
        "navigate",
        "create_page",
        "list_pages",
        "screenshot",
        "execute_script",
        "click",
        "get_text",
        "wait_for_element",
        "recover_page",
        "ensure_healthy",
        "restart_browser",
    ];
}
