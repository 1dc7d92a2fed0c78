//! LLM integration for Concierge.
//!
//! Defines the message/tool types shared across the crate and the
//! `ChatModel` trait the engine talks to. The only shipped implementation
//! is `OpenAiModel`, a thin reqwest client for any OpenAI-compatible
//! chat-completions endpoint.

pub mod openai;

pub use openai::OpenAiModel;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id; the matching tool result must echo it.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One message in a conversation thread.
///
/// Threads are append-only ordered sequences of these; order is causally
/// meaningful (a tool result references an earlier call id) and is never
/// rearranged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Tool invocations requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool-result messages only; matches a requested call id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Assistant message carrying tool-call requests.
    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Tool-result message answering the call with the given id.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Tool descriptor advertised to the model for function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's arguments.
    pub parameters: serde_json::Value,
}

/// One model response: final text and/or requested tool calls.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Chat model boundary.
///
/// The engine sends the ordered message sequence plus the registered tool
/// definitions and gets back one response, optionally annotated with tool
/// calls. Everything else about the provider is out of scope.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, LlmError>;
}

/// Configuration for creating a chat model.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Base URL up to and including `/v1`.
    pub base_url: String,
}

/// Create a chat model from configuration.
pub fn create_model(config: &ModelConfig) -> Arc<dyn ChatModel> {
    tracing::info!("Using chat model {} at {}", config.model, config.base_url);
    Arc::new(OpenAiModel::new(
        config.api_key.clone(),
        &config.model,
        &config.base_url,
    ))
}
