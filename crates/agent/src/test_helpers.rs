//! Shared test doubles for the agent crate.

use async_trait::async_trait;
use gamewise_core::catalog::{GameDocument, Retriever};
use gamewise_core::error::{ProviderError, RetrievalError, ToolError};
use gamewise_core::message::Message;
use gamewise_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use gamewise_core::tool::{Tool, ToolArgument, ToolRegistry};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply and records the prompt.
/// Panics if more calls are made than replies provided.
pub struct SequentialMockProvider {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl SequentialMockProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt sent so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let replies = self.replies.lock().unwrap();

        let call = prompts.len();
        if call >= replies.len() {
            panic!(
                "SequentialMockProvider: no more replies (call #{}, have {})",
                call,
                replies.len()
            );
        }

        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        prompts.push(prompt);

        Ok(make_text_response(&replies[call]))
    }
}

/// A provider that is never reachable.
pub struct UnavailableProvider;

#[async_trait]
impl Provider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A retriever that always returns the same games.
pub struct FixedRetriever {
    games: Vec<GameDocument>,
}

impl FixedRetriever {
    pub fn new(games: Vec<GameDocument>) -> Self {
        Self { games }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn two_games() -> Self {
        Self::new(vec![
            GameDocument::new("Doom", "id Software", "1993"),
            GameDocument::new("Half-Life", "Valve", "1998"),
        ])
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn retrieve(&self, _query: &str) -> Result<Vec<GameDocument>, RetrievalError> {
        Ok(self.games.clone())
    }
}

/// Echoes its input back as `"echo: {input}"`.
pub struct EchoTool {
    name: &'static str,
    argument: &'static str,
}

impl EchoTool {
    pub fn new(name: &'static str, argument: &'static str) -> Self {
        Self { name, argument }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Echoes back the input."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument {
            name: self.argument,
            description: "anything",
        }
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        Ok(format!("echo: {input}"))
    }
}

/// Always fails, like a tool whose network is down.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument {
            name: "query",
            description: "ignored",
        }
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "wikipedia".into(),
            reason: "network unreachable".into(),
        })
    }
}

pub fn registry_with(tools: Vec<Box<dyn Tool>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool);
    }
    registry
}

/// `search`, `wikipedia` and `save` echo tools, registered in that order.
pub fn echo_registry() -> ToolRegistry {
    registry_with(vec![
        Box::new(EchoTool::new("search", "query")),
        Box::new(EchoTool::new("wikipedia", "query")),
        Box::new(EchoTool::new("save", "text")),
    ])
}
