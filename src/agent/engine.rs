//! Conversation engine — the per-turn tool-use state machine.
//!
//! One turn: load history, append the user message, then loop
//! model → tool execution → model until the model stops requesting tools.
//! The finished sequence is persisted exactly once, at successful turn
//! completion; any aborting error leaves the store untouched.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{EngineError, Error, Result};
use crate::llm::{ChatMessage, ChatModel, Role, ToolCall, ToolDefinition};
use crate::store::ThreadStore;
use crate::tools::ToolRegistry;

/// Outcome of one successful turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// The final assistant message.
    pub reply: ChatMessage,
    /// Everything persisted for this turn, user message first.
    pub appended: Vec<ChatMessage>,
}

/// Drives turns against the model, the tool registry, and the store.
pub struct ConversationEngine {
    llm: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    store: Arc<dyn ThreadStore>,
    config: EngineConfig,
}

impl ConversationEngine {
    pub fn new(
        llm: Arc<dyn ChatModel>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn ThreadStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            llm,
            tools,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    /// Run one full turn for `thread_id`.
    ///
    /// Persisted shape per turn: the user message, one tool-result message
    /// per executed call, and the final assistant message. Assistant
    /// messages that only request tools stay in the model context for the
    /// duration of the turn; later turns rebuild context from persisted
    /// user/assistant messages.
    pub async fn run_turn(&self, thread_id: &str, user_text: &str) -> Result<TurnResult> {
        let history = self.store.load(thread_id).await?;

        let user_message = ChatMessage::user(user_text);
        let mut context = self.context_from_history(&history);
        context.push(user_message.clone());

        // New messages for this turn, in persist order.
        let mut appended = vec![user_message];

        let tool_definitions: Vec<ToolDefinition> = self.tools.definitions();
        let mut rounds = 0usize;

        loop {
            let response = self.llm.complete(&context, &tool_definitions).await?;

            if !response.has_tool_calls() {
                // Terminal state: no further tool call requested.
                let reply = ChatMessage::assistant(response.content);
                appended.push(reply.clone());
                self.store.append(thread_id, &appended).await?;
                tracing::debug!(
                    thread_id,
                    messages = appended.len(),
                    rounds,
                    "Turn completed"
                );
                return Ok(TurnResult { reply, appended });
            }

            rounds += 1;
            if rounds > self.config.max_tool_rounds {
                tracing::warn!(thread_id, rounds, "Tool loop limit hit, aborting turn");
                return Err(Error::Engine(EngineError::ToolLoopLimit {
                    max: self.config.max_tool_rounds,
                }));
            }

            // The tool-call message must precede its results in the context.
            context.push(ChatMessage::assistant_with_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let result = self.execute_tool(call).await?;
                let message = ChatMessage::tool_result(call.id.clone(), result);
                context.push(message.clone());
                appended.push(message);
            }
        }
    }

    /// Execute one requested tool call.
    ///
    /// Recoverable failures become conversational content so the model can
    /// react; registry misses propagate and abort the turn.
    async fn execute_tool(&self, call: &ToolCall) -> Result<String> {
        let tool = self.tools.lookup(&call.name)?;
        tracing::debug!(tool = %call.name, call_id = %call.id, "Executing tool");

        match tool.invoke(call.arguments.clone()).await {
            Ok(output) => Ok(output),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed, reporting to model");
                Ok(format!("Error: {e}"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Model context from persisted history.
    ///
    /// Only user/assistant messages are replayed; stored tool results
    /// informed the assistant reply that follows them and have no matching
    /// call message on the wire anymore. The configured system prompt goes
    /// first and is never persisted.
    fn context_from_history(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut context = Vec::with_capacity(history.len() + 2);
        if let Some(ref prompt) = self.config.system_prompt {
            context.push(ChatMessage::system(prompt.clone()));
        }
        context.extend(
            history
                .iter()
                .filter(|m| matches!(m.role, Role::User | Role::Assistant))
                .cloned(),
        );
        context
    }
}

// ── Tests ───────────────────────────────────────────────────────────
