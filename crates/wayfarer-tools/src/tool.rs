//! Tool contract
//!
//! The shape every tool exposes to its caller: a [`ToolDefinition`] with a
//! JSON parameter schema, and a [`ToolResult`] per execution.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Risk level of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Read-only operations
    Low,
    /// Writes confined by the path sandbox
    Medium,
    /// Process restarts, arbitrary script execution
    High,
}

impl RiskLevel {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool metadata and schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
    /// Risk level
    pub risk_level: RiskLevel,
    /// Whether the tool accepts calls
    pub enabled: bool,
}

impl ToolDefinition {
    /// Create an enabled, low-risk definition with an empty schema
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            risk_level: RiskLevel::Low,
            enabled: true,
        }
    }

    /// Set the parameters schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the risk level
    #[must_use]
    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    /// Set enabled status
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Output data
    pub output: serde_json::Value,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    /// Create a successful result
    #[must_use]
    pub fn success(output: serde_json::Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            duration_ms,
        }
    }

    /// Create a failed result
    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// Attach a recovery hint to a failed result
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.output = serde_json::json!({
            "error": self.error.clone().unwrap_or_default(),
            "suggestion": suggestion.into()
        });
        self
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with given input
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult>;

    /// Validate input before execution
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        if !input.is_object() {
            return Err(Error::InvalidInput(format!(
                "{} input must be a JSON object",
                self.definition().name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
            self.validate_input(&input)?;
            Ok(ToolResult::success(input, 0))
        }
    }

    #[test]
    fn test_tool_definition_builder() {
        let def = ToolDefinition::new("browser", "Drive a browser")
            .with_risk_level(RiskLevel::Medium)
            .with_enabled(false);

        assert_eq!(def.name, "browser");
        assert_eq!(def.risk_level, RiskLevel::Medium);
        assert!(!def.enabled);
        assert_eq!(def.parameters["type"], "object");

        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["risk_level"], "medium");
    }

    #[test]
    fn test_tool_result_with_suggestion() {
        let success = ToolResult::success(serde_json::json!({"data": "test"}), 100);
        assert!(success.success);
        assert!(success.error.is_none());

        let failure = ToolResult::failure("page gone", 50).with_suggestion("call recover_page");
        assert!(!failure.success);
        assert_eq!(failure.error.as_deref(), Some("page gone"));
        assert_eq!(failure.output["error"], "page gone");
        assert_eq!(failure.output["suggestion"], "call recover_page");
    }

    #[tokio::test]
    async fn test_default_validation_rejects_non_object_input() {
        let tool = EchoTool {
            definition: ToolDefinition::new("echo", "Echo input"),
        };

        let result = tool.execute(serde_json::json!({"ping": 1})).await.unwrap();
        assert_eq!(result.output["ping"], 1);

        let err = tool.execute(serde_json::json!("text")).await.unwrap_err();
        match err {
            Error::InvalidInput(msg) => assert!(msg.contains("echo")),
            other => unreachable!("Expected InvalidInput, got {:?}", other),
        }
    }
}
