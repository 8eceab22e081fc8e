//! Capability system: trait, registry, and the trail finder.
//!
//! Every capability implements the `Tool` trait and registers itself in the
//! `ToolRegistry`. The orchestrator advertises the registry's definitions to
//! the model and dispatches invocations by name.

pub mod trail_finder;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, TrailbotError};
use crate::provider::types::{Invocation, ToolDefinition, ToolFunctionDef};

/// Trait that all capabilities must implement.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used in function calls (e.g., "get_lat_long").
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters(&self) -> Value;

    /// Run the capability and produce the text shown to the user.
    async fn execute(&self, call: &Invocation) -> Result<String>;
}

/// Registry of capabilities, looked up by name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        debug!(tool = tool.name(), "Registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Execute the tool named by `call`.
    ///
    /// An unknown name is a shape mismatch, not a hard failure.
    pub async fn execute(&self, call: &Invocation) -> Result<String> {
        let tool = self.tools.get(&call.name).ok_or_else(|| {
            TrailbotError::CapabilityShapeMismatch(format!("unknown capability `{}`", call.name))
        })?;
        debug!(tool = %call.name, "Executing tool");
        tool.execute(call).await
    }

    /// Get all tool definitions in OpenAI function-calling format.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                def_type: "function".into(),
                function: ToolFunctionDef {
                    name: tool.name().into(),
                    description: tool.description().into(),
                    parameters: tool.parameters(),
                },
            })
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
