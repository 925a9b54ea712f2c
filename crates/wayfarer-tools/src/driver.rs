//! Browser driver contract
//!
//! The façade talks to the browser only through [`BrowserDriver`]. Drivers
//! report failures with [`wayfarer_core::Error`]; use
//! [`Error::recoverable`](wayfarer_core::Error::recoverable) for failures that
//! are worth retrying (detached targets, dropped connections) and
//! [`Error::unrecoverable`](wayfarer_core::Error::unrecoverable) otherwise.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wayfarer_core::Result;

/// Opaque page identifier issued by the driver
///
/// Identifiers are only valid until the next browser restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Wrap a driver-issued identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An open page as reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page identifier
    pub id: PageId,
    /// Current URL
    pub url: String,
    /// Document title
    pub title: String,
}

/// Capabilities the browser driver must provide
#[async_trait::async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Open a new page at `url`
    async fn create_page(&self, url: &str) -> Result<PageId>;

    /// Navigate an existing page
    async fn navigate(&self, page: &PageId, url: &str) -> Result<()>;

    /// Evaluate a script in the page and return its JSON result
    async fn execute_script(&self, page: &PageId, script: &str) -> Result<serde_json::Value>;

    /// Capture a PNG screenshot
    async fn screenshot(&self, page: &PageId) -> Result<Vec<u8>>;

    /// Click the first element matching `selector`
    async fn click(&self, page: &PageId, selector: &str) -> Result<()>;

    /// Text content of the first element matching `selector`
    async fn get_text(&self, page: &PageId, selector: &str) -> Result<String>;

    /// Wait until an element matching `selector` appears
    async fn wait_for_element(&self, page: &PageId, selector: &str, timeout: Duration)
        -> Result<()>;

    /// Open pages, in driver order
    async fn list_pages(&self) -> Result<Vec<PageInfo>>;

    /// Check that the browser process responds
    async fn health_check(&self) -> Result<()>;

    /// Restart the browser process; invalidates every page identifier
    async fn restart(&self) -> Result<()>;
}
