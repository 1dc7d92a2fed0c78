//! The `Tool` trait — a named external action the model can invoke.

use async_trait::async_trait;

use crate::error::ToolError;
use crate::llm::ToolDefinition;

/// A callable external action.
///
/// Side effects (network calls, notifications) live entirely inside
/// `invoke`; the registry and engine treat the implementation as opaque.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as advertised to the model.
    fn name(&self) -> &str;

    /// Description used by the model for tool selection.
    fn description(&self) -> &str;

    /// JSON schema of the arguments `invoke` accepts.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool. Failures are reported as `ToolError` and fed back
    /// to the model as a tool result, not swallowed.
    async fn invoke(&self, args: serde_json::Value) -> Result<String, ToolError>;

    /// Descriptor for LLM function calling.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Pull a required string argument out of a JSON args object.
pub(crate) fn require_str_arg<'a>(
    tool: &str,
    args: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters {
            name: tool.to_string(),
            reason: format!("missing string field `{key}`"),
        })
}
