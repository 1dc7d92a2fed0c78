//! Tool registry — name-unique, registration-ordered.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ToolError;
use crate::llm::ToolDefinition;
use crate::tools::tool::Tool;

/// Registry of available tools.
///
/// Built with `&mut self` during startup, then shared read-only behind an
/// `Arc` — no locking is needed during a turn. Registration order is kept
/// because it is the order advertised to the model.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Duplicate names are a configuration error.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::Duplicate { name });
        }
        self.index.insert(name.clone(), self.tools.len());
        self.tools.push(tool);
        tracing::debug!("Registered tool: {}", name);
        Ok(())
    }

    /// Look up a tool by name. Total: unknown names are an error, never
    /// silently ignored.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| ToolError::NotFound {
                name: name.to_string(),
            })
    }

    /// All tools, in registration order.
    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions for LLM function calling, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
