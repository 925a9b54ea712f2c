//! Operation façade
//!
//! [`BrowserOperations`] maps every browser action onto a named retry
//! strategy. Routine failures that exhaust their retries are returned to the
//! caller as-is; escalation to health checks or restarts is left to the
//! [`Supervisor`](super::Supervisor) or the caller.

use crate::driver::{BrowserDriver, PageId, PageInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use wayfarer_core::resilience::{
    BROWSER_HEALTH, BROWSER_RESTART, NAVIGATION, PAGE_RECOVERY, TOOL_OPERATION,
};
use wayfarer_core::{Error, OperationClass, Result, RetryExecutor};

/// URL used for pages created without a destination
pub const BLANK_PAGE: &str = "about:blank";

/// Restarts are expensive; a critical strategy may not retry more than this
pub const MAX_RESTART_ATTEMPTS: u32 = 3;

const REQUIRED_STRATEGIES: &[(&str, OperationClass)] = &[
    (TOOL_OPERATION, OperationClass::Routine),
    (NAVIGATION, OperationClass::Routine),
    (PAGE_RECOVERY, OperationClass::Health),
    (BROWSER_HEALTH, OperationClass::Health),
    (BROWSER_RESTART, OperationClass::Critical),
];

/// Resilient browser operations over a [`BrowserDriver`]
pub struct BrowserOperations {
    driver: Arc<dyn BrowserDriver>,
    executor: RetryExecutor,
    cancel: CancellationToken,
}

impl BrowserOperations {
    /// Create the façade, checking that every strategy it uses is registered
    /// with the expected class
    pub fn new(driver: Arc<dyn BrowserDriver>, executor: RetryExecutor) -> Result<Self> {
        for (name, class) in REQUIRED_STRATEGIES {
            let strategy = executor.registry().expect_class(name, *class)?;
            if strategy.class == OperationClass::Critical
                && strategy.max_attempts > MAX_RESTART_ATTEMPTS
            {
                return Err(Error::InvalidStrategy {
                    strategy: strategy.name.clone(),
                    reason: format!(
                        "critical strategies may not exceed {MAX_RESTART_ATTEMPTS} attempts"
                    ),
                });
            }
        }

        Ok(Self {
            driver,
            executor,
            cancel: CancellationToken::new(),
        })
    }

    /// Get the executor
    #[must_use]
    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// Token cancelled by [`shutdown`](Self::shutdown)
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort every in-flight and future retry loop
    pub fn shutdown(&self) {
        info!("Shutting down browser operations");
        self.cancel.cancel();
    }

    /// Navigate to `url`, reusing the first open page when there is one
    ///
    /// Returns the page that ended up at `url`. Concurrent calls against an
    /// empty browser may each create a page.
    #[instrument(skip(self))]
    pub async fn navigate(&self, url: &str) -> Result<PageId> {
        require("navigate", "url", url)?;
        let driver = &self.driver;

        self.executor
            .run_with_result_cancellable(NAVIGATION, "navigate", &self.cancel, move || async move {
                let pages = driver.list_pages().await?;
                match pages.into_iter().next() {
                    Some(page) => {
                        driver.navigate(&page.id, url).await?;
                        Ok(page.id)
                    }
                    None => driver.create_page(url).await,
                }
            })
            .await
    }

    /// Open a new page at `url`
    #[instrument(skip(self))]
    pub async fn create_page(&self, url: &str) -> Result<PageId> {
        require("create_page", "url", url)?;
        let driver = &self.driver;
        self.executor
            .run_with_result_cancellable(TOOL_OPERATION, "create_page", &self.cancel, move || {
                driver.create_page(url)
            })
            .await
    }

    /// List open pages
    #[instrument(skip(self))]
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>> {
        let driver = &self.driver;
        self.executor
            .run_with_result_cancellable(TOOL_OPERATION, "list_pages", &self.cancel, move || {
                driver.list_pages()
            })
            .await
    }

    /// Capture a PNG screenshot of `page`
    #[instrument(skip(self), fields(page = %page))]
    pub async fn screenshot(&self, page: &PageId) -> Result<Vec<u8>> {
        let driver = &self.driver;
        self.executor
            .run_with_result_cancellable(TOOL_OPERATION, "screenshot", &self.cancel, move || {
                driver.screenshot(page)
            })
            .await
    }

    /// Evaluate `script` in `page`
    #[instrument(skip(self, script), fields(page = %page))]
    pub async fn execute_script(&self, page: &PageId, script: &str) -> Result<serde_json::Value> {
        require("execute_script", "script", script)?;
        let driver = &self.driver;
        self.executor
            .run_with_result_cancellable(TOOL_OPERATION, "execute_script", &self.cancel, move || {
                driver.execute_script(page, script)
            })
            .await
    }

    /// Click the first element matching `selector`
    #[instrument(skip(self), fields(page = %page))]
    pub async fn click(&self, page: &PageId, selector: &str) -> Result<()> {
        require("click", "selector", selector)?;
        let driver = &self.driver;
        self.executor
            .run_cancellable(TOOL_OPERATION, "click", &self.cancel, move || {
                driver.click(page, selector)
            })
            .await
    }

    /// Text content of the first element matching `selector`
    #[instrument(skip(self), fields(page = %page))]
    pub async fn get_text(&self, page: &PageId, selector: &str) -> Result<String> {
        require("get_text", "selector", selector)?;
        let driver = &self.driver;
        self.executor
            .run_with_result_cancellable(TOOL_OPERATION, "get_text", &self.cancel, move || {
                driver.get_text(page, selector)
            })
            .await
    }

    /// Wait up to `timeout` for `selector` to appear
    #[instrument(skip(self), fields(page = %page))]
    pub async fn wait_for_element(
        &self,
        page: &PageId,
        selector: &str,
        timeout: Duration,
    ) -> Result<()> {
        require("wait_for_element", "selector", selector)?;
        let driver = &self.driver;
        self.executor
            .run_cancellable(TOOL_OPERATION, "wait_for_element", &self.cancel, move || {
                driver.wait_for_element(page, selector, timeout)
            })
            .await
    }

    /// Bring `page` back to a usable state
    ///
    /// A page that is still open is reloaded at its current URL and keeps its
    /// identifier. A page that is gone is replaced by a fresh blank page, whose
    /// identifier is returned.
    #[instrument(skip(self), fields(page = %page))]
    pub async fn recover_page(&self, page: &PageId) -> Result<PageId> {
        let driver = &self.driver;
        self.executor
            .run_with_result_cancellable(PAGE_RECOVERY, "recover_page", &self.cancel, move || async move {
                let pages = driver.list_pages().await?;
                match pages.into_iter().find(|p| &p.id == page) {
                    Some(existing) => {
                        let url = if existing.url.is_empty() {
                            BLANK_PAGE
                        } else {
                            existing.url.as_str()
                        };
                        driver.navigate(&existing.id, url).await?;
                        Ok(existing.id)
                    }
                    None => {
                        warn!(page = %page, "Page is gone, opening a replacement");
                        driver.create_page(BLANK_PAGE).await
                    }
                }
            })
            .await
    }

    /// Check that the browser responds
    #[instrument(skip(self))]
    pub async fn ensure_healthy(&self) -> Result<()> {
        let driver = &self.driver;
        self.executor
            .run_cancellable(BROWSER_HEALTH, "ensure_healthy", &self.cancel, move || {
                driver.health_check()
            })
            .await
    }

    /// Restart the browser process
    ///
    /// Every page identifier obtained before a successful restart is invalid.
    #[instrument(skip(self))]
    pub async fn restart_browser(&self) -> Result<()> {
        let driver = &self.driver;
        self.executor
            .run_cancellable(BROWSER_RESTART, "restart_browser", &self.cancel, move || {
                driver.restart()
            })
            .await?;

        info!("Browser restarted; all previous page identifiers are invalid");
        Ok(())
    }
}

impl std::fmt::Debug for BrowserOperations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserOperations")
            .field("executor", &self.executor)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn require(operation: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!(
            "{operation}: '{field}' must not be empty"
        )));
    }
    Ok(())
}
