//! Tools exposed to the placement agent.
//!
//! A tool takes a single free-text `query` argument and returns text. The
//! [`Toolbox`] advertises the registered tools to the model as functions and
//! dispatches the model's calls back to them.

mod guard;
mod semantic;
mod sql;

pub use guard::QueryGuard;
pub use semantic::SemanticSearchTool;
pub use sql::{QueryRows, SqlQueryTool, PLACEMENTS_SCHEMA};

use crate::error::{PlacementError, Result};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// A capability the agent can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    /// Description the model uses to choose between tools.
    fn description(&self) -> &str;

    /// Run the tool on the model-supplied input.
    async fn call(&self, input: &str) -> Result<String>;
}

/// The complete set of tools offered to the agent.
#[derive(Clone, Default)]
pub struct Toolbox {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. On duplicate names the first registration wins.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function definitions for the chat completions `tools` field.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.tools
            .iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.name().to_string(),
                    description: Some(tool.description().to_string()),
                    parameters: Some(serde_json::json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "Input for the tool"
                            }
                        },
                        "required": ["query"]
                    })),
                    strict: None,
                },
            })
            .collect()
    }

    /// Execute a model tool call.
    ///
    /// Unknown tools and malformed arguments come back as text for the model to
    /// react to. Errors raised by the tool itself propagate.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String> {
        let Some(tool) = self.get(name) else {
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.names().join(", ")
            ));
        };

        let input = match parse_tool_input(arguments) {
            Ok(input) => input,
            Err(e) => return Ok(format!("Failed to parse tool call: {}", e)),
        };

        info!("Agent calling tool: {} with input: {}", name, input);
        tool.call(&input).await
    }
}

/// Extract the `query` argument from a tool call's JSON arguments.
///
/// A bare JSON string is accepted as the query itself.
pub fn parse_tool_input(arguments: &str) -> Result<String> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| PlacementError::Tool(format!("Invalid tool arguments: {}", e)))?;

    match args {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Object(map) => map
            .get("query")
            .and_then(|q| q.as_str())
            .map(str::to_string)
            .ok_or_else(|| PlacementError::Tool("Missing 'query' argument".to_string())),
        other => Err(PlacementError::Tool(format!(
            "Expected an object with a 'query' field, got {}",
            other
        ))),
    }
}
