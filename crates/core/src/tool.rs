//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools let the agent reach outside the game catalog: search the web,
//! look up an encyclopedia article, save text to disk. Every tool takes a
//! single declared string argument and produces a string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::ToolError;

/// The single argument a tool requires, e.g. `query` or `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolArgument {
    /// Key the model must put under `args`
    pub name: &'static str,

    /// Short description shown to the model
    pub description: &'static str,
}

/// How a tool invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    /// The tool ran and returned output
    Success,
    /// The declared argument was absent from the call
    MissingArgument,
    /// The tool itself reported a failure
    Failed,
    /// No tool with that name is registered
    NotFound,
}

/// The result of a tool invocation. Always produced, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The tool that was invoked
    pub tool_name: String,

    /// How the invocation ended
    pub status: ToolStatus,

    /// The output content, or a descriptive error text
    pub output: String,
}

impl ToolResult {
    pub fn success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

/// The core Tool trait.
///
/// Each tool (search, wikipedia, save) implements this trait and is
/// registered in the ToolRegistry. Implementations must be safe to call
/// concurrently and must bound their own waits (network timeouts).
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search", "save").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// The argument this tool requires.
    fn argument(&self) -> ToolArgument;

    /// Execute the tool with the value of its declared argument.
    async fn execute(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools, keyed by lower-case name.
///
/// The agent loop uses this to:
/// 1. Describe the available tools in the prompt
/// 2. Look up and invoke tools when the model requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    /// Registration order, for stable listings
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_lowercase();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Whether a tool with this (lower-case) name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// List all registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Render one line per tool for the prompt template.
    pub fn describe(&self) -> String {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| {
                let arg = t.argument();
                format!("- {}: {} Args: {} (str) - {}", t.name(), t.description(), arg.name, arg.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Invoke a tool with the model-supplied arguments.
    ///
    /// Never fails: a missing argument, an unknown tool, or an error inside
    /// the tool are all turned into a descriptive `ToolResult`.
    pub async fn invoke(&self, name: &str, args: &HashMap<String, String>) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            return ToolResult {
                tool_name: name.to_string(),
                status: ToolStatus::NotFound,
                output: format!("Error: {}", ToolError::NotFound(name.to_string())),
            };
        };

        let argument = tool.argument();
        let Some(input) = args.get(argument.name) else {
            return ToolResult {
                tool_name: name.to_string(),
                status: ToolStatus::MissingArgument,
                output: ToolError::MissingArgument {
                    tool_name: name.to_string(),
                    argument: argument.name.to_string(),
                }
                .to_string(),
            };
        };

        match tool.execute(input).await {
            Ok(output) => ToolResult {
                tool_name: name.to_string(),
                status: ToolStatus::Success,
                output,
            },
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool execution failed");
                ToolResult {
                    tool_name: name.to_string(),
                    status: ToolStatus::Failed,
                    output: format!("Error calling tool '{name}': {e}"),
                }
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
