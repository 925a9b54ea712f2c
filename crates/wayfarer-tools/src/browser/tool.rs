//! Browser tool implementation
//!
//! Exposes the operation façade as a single `browser` tool. Every file the
//! tool writes goes through the path sandbox first.

use crate::error::{Error, Result};
use crate::tool::{RiskLevel, Tool, ToolDefinition, ToolResult};
use crate::sandbox::{FileOperation, PathSandbox};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;
use wayfarer_core::OperationClass;

use super::actions::BrowserAction;
use super::config::BrowserConfig;
use super::facade::BrowserOperations;
use super::supervisor::Supervisor;

/// Browser automation tool
pub struct BrowserTool {
    pub(crate) definition: ToolDefinition,
    pub(crate) config: BrowserConfig,
    operations: Arc<BrowserOperations>,
    sandbox: Arc<PathSandbox>,
    supervisor: Option<Arc<Supervisor>>,
}

impl BrowserTool {
    /// Create a browser tool over `operations`
    #[must_use]
    pub fn new(
        operations: Arc<BrowserOperations>,
        sandbox: Arc<PathSandbox>,
        config: BrowserConfig,
    ) -> Self {
        let definition = ToolDefinition::new(
            "browser",
            "Drive a web browser: navigate (reuses the open page), create pages from a URL or HTML, list pages, take screenshots, run JavaScript, click, read text and wait for elements. Pages are addressed by page_id; restart_browser invalidates every page_id.",
        )
        .with_risk_level(RiskLevel::Medium)
        .with_enabled(config.enabled)
        .with_parameters(Self::build_parameters_schema());

        Self {
            definition,
            config,
            operations,
            sandbox,
            supervisor: None,
        }
    }

    /// Route routine actions through `supervisor`
    ///
    /// A disabled supervisor is not attached.
    #[must_use]
    pub fn with_supervisor(mut self, supervisor: Arc<Supervisor>) -> Self {
        if supervisor.is_enabled() {
            self.supervisor = Some(supervisor);
        } else {
            debug!("Supervisor disabled, routine actions run unsupervised");
        }
        self
    }

    fn build_parameters_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "Action to perform",
                    "enum": BrowserAction::NAMES
                },
                "page_id": {
                    "type": "string",
                    "description": "Target page (from navigate, create_page or list_pages)"
                },
                "url": {
                    "type": "string",
                    "description": "URL for navigate or create_page"
                },
                "html": {
                    "type": "string",
                    "description": "HTML content for create_page"
                },
                "path": {
                    "type": "string",
                    "description": "File to write (screenshot PNG or create_page HTML)"
                },
                "selector": {
                    "type": "string",
                    "description": "CSS selector for click, get_text and wait_for_element"
                },
                "script": {
                    "type": "string",
                    "description": "JavaScript code for execute_script"
                },
                "timeout_ms": {
                    "type": "integer",
                    "description": "Timeout in milliseconds for wait_for_element"
                }
            },
            "required": ["action"]
        })
    }

    /// Parse input JSON into a BrowserAction
    pub(crate) fn parse_action(&self, input: &serde_json::Value) -> Result<BrowserAction> {
        serde_json::from_value(input.clone())
            .map_err(|e| Error::InvalidInput(format!("invalid browser action: {e}")))
    }

    async fn execute_action(&self, action: BrowserAction) -> Result<serde_json::Value> {
        let supervisor = match &self.supervisor {
            Some(s) if action.class() == OperationClass::Routine => s,
            _ => return self.dispatch(action).await,
        };

        let result = self.dispatch(action).await;
        match &result {
            Ok(_) => supervisor.record_success(),
            Err(Error::Operation(e)) => supervisor.record_failure(e).await,
            Err(_) => {}
        }
        result
    }

    async fn dispatch(&self, action: BrowserAction) -> Result<serde_json::Value> {
        let ops = &self.operations;
        let output = match action {
            BrowserAction::Navigate { url } => {
                let page_id = ops.navigate(&url).await?;
                serde_json::json!({ "page_id": page_id, "url": url })
            }
            BrowserAction::CreatePage { url, html, path } => {
                self.create_page(url, html, path).await?
            }
            BrowserAction::ListPages => {
                let pages = ops.list_pages().await?;
                serde_json::json!({ "pages": pages })
            }
            BrowserAction::Screenshot { page_id, path } => match path {
                Some(path) => {
                    // Refuse the destination before anything is captured
                    let target = self.sandbox.validate(&path, FileOperation::Write)?;
                    let png = ops.screenshot(&page_id).await?;
                    self.write_file(&target, png.as_slice()).await?;
                    serde_json::json!({
                        "page_id": page_id,
                        "path": target.display().to_string(),
                        "bytes": png.len()
                    })
                }
                None => {
                    let png = ops.screenshot(&page_id).await?;
                    serde_json::json!({
                        "page_id": page_id,
                        "format": "png",
                        "data": BASE64_STANDARD.encode(&png)
                    })
                }
            },
            BrowserAction::ExecuteScript { page_id, script } => {
                let value = ops.execute_script(&page_id, &script).await?;
                serde_json::json!({ "page_id": page_id, "result": value })
            }
            BrowserAction::Click { page_id, selector } => {
                ops.click(&page_id, &selector).await?;
                serde_json::json!({ "page_id": page_id, "clicked": selector })
            }
            BrowserAction::GetText { page_id, selector } => {
                let text = ops.get_text(&page_id, &selector).await?;
                serde_json::json!({ "page_id": page_id, "text": text })
            }
            BrowserAction::WaitForElement {
                page_id,
                selector,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(self.config.default_wait_timeout_ms);
                ops.wait_for_element(&page_id, &selector, Duration::from_millis(timeout))
                    .await?;
                serde_json::json!({ "page_id": page_id, "found": selector })
            }
            BrowserAction::RecoverPage { page_id } => {
                let recovered = ops.recover_page(&page_id).await?;
                serde_json::json!({
                    "page_id": recovered,
                    "replaced": recovered != page_id
                })
            }
            BrowserAction::EnsureHealthy => {
                ops.ensure_healthy().await?;
                serde_json::json!({ "healthy": true })
            }
            BrowserAction::RestartBrowser => {
                ops.restart_browser().await?;
                serde_json::json!({ "restarted": true, "page_ids_invalidated": true })
            }
        };
        Ok(output)
    }

    async fn create_page(
        &self,
        url: Option<String>,
        html: Option<String>,
        path: Option<String>,
    ) -> Result<serde_json::Value> {
        let (url, written) = match (url, html) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidInput(
                    "create_page takes either 'url' or 'html', not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::InvalidInput(
                    "create_page requires 'url' or 'html'".to_string(),
                ))
            }
            (Some(url), None) => (url, None),
            (None, Some(html)) => {
                let path = path.unwrap_or_else(|| self.default_page_path());
                let target = self.sandbox.validate(&path, FileOperation::Write)?;
                self.write_file(&target, html.as_bytes()).await?;
                let url = Url::from_file_path(&target).map_err(|()| {
                    Error::InvalidInput(format!("cannot build a file URL for '{}'", target.display()))
                })?;
                (url.to_string(), Some(target))
            }
        };

        let page_id = match self.operations.create_page(&url).await {
            Ok(page_id) => page_id,
            Err(e) => {
                if let Some(orphan) = &written {
                    self.remove_file(orphan).await;
                }
                return Err(e.into());
            }
        };
        Ok(serde_json::json!({
            "page_id": page_id,
            "url": url,
            "path": written.map(|p| p.display().to_string())
        }))
    }

    fn default_page_path(&self) -> String {
        self.config
            .output_dir
            .join(format!("page-{}.html", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned()
    }

    /// Write `data` to a path already approved by the sandbox
    async fn write_file(&self, target: &Path, data: &[u8]) -> Result<()> {
        self.sandbox.validate_size(data.len() as u64)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, data).await?;

        info!(path = %target.display(), bytes = data.len(), "Browser tool wrote file");
        Ok(())
    }

    async fn remove_file(&self, target: &Path) {
        match tokio::fs::remove_file(target).await {
            Ok(()) => debug!(path = %target.display(), "Removed unopened page file"),
            Err(e) => warn!(path = %target.display(), error = %e, "Failed to remove unopened page file"),
        }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        if !self.definition.enabled {
            return Ok(ToolResult::failure(
                "Browser tool is disabled in configuration",
                start.elapsed().as_millis() as u64,
            ));
        }

        self.validate_input(&input)?;
        let action = self.parse_action(&input)?;
        let name = action.name();
        debug!(
            action = name,
            writes_files = action.writes_files(),
            "Executing browser action"
        );

        let result = self.execute_action(action).await;
        let duration = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => Ok(ToolResult::success(output, duration)),
            Err(Error::Operation(e)) => {
                warn!(action = name, error = %e, "Browser action failed");
                let failure = ToolResult::failure(e.to_string(), duration);
                Ok(match e.suggestion().or_else(|| e.root_cause().suggestion()) {
                    Some(hint) => failure.with_suggestion(hint),
                    None => failure,
                })
            }
            Err(e) => Err(e),
        }
    }
}
