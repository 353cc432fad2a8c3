//! The bounded ask loop.

use std::sync::Arc;
use gamewise_config::AgentConfig;
use gamewise_core::catalog::Retriever;
use gamewise_core::event::{DomainEvent, EventBus};
use gamewise_core::message::Message;
use gamewise_core::provider::{Provider, ProviderRequest};
use gamewise_core::tool::ToolRegistry;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::context::{format_games_context, ConversationState};
use crate::dispatcher::ActionDispatcher;
use crate::parser::{parse_action, Action};
use crate::prompt::PromptTemplate;

/// Returned when repeated parse failures leave only a very short reply.
pub const FORMAT_APOLOGY: &str =
    "I apologize, but I'm having trouble formatting my response correctly.";

/// Returned when the iteration budget runs out.
pub const EXHAUSTED_APOLOGY: &str = "I apologize, but I couldn't complete your request within the available steps. Please try rephrasing your question.";

/// Characters of an unparseable reply echoed back in the corrective entry.
const RECEIVED_PREVIEW_CHARS: usize = 100;

/// Characters of each model reply carried in `ModelResponded` events.
const EVENT_PREVIEW_CHARS: usize = 200;

/// Thresholds of the ask loop.
///
/// `max_loops` bounds model calls; `max_parse_retries` separately bounds
/// corrective retries for unparseable replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPolicy {
    pub max_loops: u32,
    pub natural_answer_min_chars: usize,
    pub last_resort_min_chars: usize,
    pub max_parse_retries: u32,
}

impl Default for LoopPolicy {
    fn default() -> Self {
        Self {
            max_loops: 5,
            natural_answer_min_chars: 30,
            last_resort_min_chars: 20,
            max_parse_retries: 2,
        }
    }
}

impl From<&AgentConfig> for LoopPolicy {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_loops: config.max_loops,
            natural_answer_min_chars: config.natural_answer_min_chars,
            last_resort_min_chars: config.last_resort_min_chars,
            max_parse_retries: config.max_parse_retries,
        }
    }
}

impl LoopPolicy {
    /// Prose the model wrote instead of following the protocol.
    fn is_natural_answer(&self, reply: &str) -> bool {
        reply.chars().count() > self.natural_answer_min_chars && !reply.trim_start().starts_with('{')
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `final_answer` with content
    FinalAnswer,
    /// Unparseable prose accepted as the answer
    NaturalLanguage,
    /// Parse retries used up
    ParseFallback,
    /// Iteration budget used up
    Exhausted,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::FinalAnswer => "final_answer",
            Termination::NaturalLanguage => "natural_language",
            Termination::ParseFallback => "parse_fallback",
            Termination::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one `ask` produced.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    /// Model calls made
    pub iterations: u32,
    pub termination: Termination,
    pub history: Vec<String>,
}

/// The agent loop: retrieve, prompt, parse, dispatch, repeat.
pub struct AgentLoop {
    /// The text model
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per model reply
    max_tokens: Option<u32>,

    /// Game catalog lookup
    retriever: Arc<dyn Retriever>,

    /// Tool registry, shared with the dispatcher
    tools: Arc<ToolRegistry>,

    dispatcher: ActionDispatcher,

    prompt: PromptTemplate,

    policy: LoopPolicy,

    /// Event bus for progress events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop with the default prompt and policy.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        retriever: Arc<dyn Retriever>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            retriever,
            dispatcher: ActionDispatcher::new(tools.clone()),
            tools,
            prompt: PromptTemplate::default(),
            policy: LoopPolicy::default(),
            event_bus,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_policy(mut self, policy: LoopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the default number of model calls per question.
    pub fn with_max_loops(mut self, max: u32) -> Self {
        self.policy.max_loops = max;
        self
    }

    pub fn with_prompt_template(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn policy(&self) -> &LoopPolicy {
        &self.policy
    }

    /// Answer a question within the configured budget.
    pub async fn ask(&self, question: &str) -> Result<String, gamewise_core::Error> {
        self.ask_with_budget(question, self.policy.max_loops).await
    }

    /// Answer a question with at most `max_loops` model calls.
    pub async fn ask_with_budget(
        &self,
        question: &str,
        max_loops: u32,
    ) -> Result<String, gamewise_core::Error> {
        Ok(self.run_with_budget(question, max_loops).await?.answer)
    }

    /// Answer a question and report how the loop ended.
    pub async fn run(&self, question: &str) -> Result<AskOutcome, gamewise_core::Error> {
        self.run_with_budget(question, self.policy.max_loops).await
    }

    /// The loop itself.
    ///
    /// Returns `Err` only when the model or the retriever fails. Protocol
    /// mistakes by the model and tool failures are fed back into the
    /// conversation instead.
    pub async fn run_with_budget(
        &self,
        question: &str,
        max_loops: u32,
    ) -> Result<AskOutcome, gamewise_core::Error> {
        let max_loops = max_loops.max(1);
        info!(max_loops, "Answering question");

        let games = self.retriever.retrieve(question).await?;
        debug!(retriever = %self.retriever.name(), games = games.len(), "Retrieved games");

        let mut state = ConversationState::new(question, format_games_context(&games));
        let tool_list = self.tools.describe();
        let mut parse_failures = 0u32;

        for iteration in 1..=max_loops {
            let prompt = self.prompt.render(&state.prompt_variables(), &tool_list);
            let request = ProviderRequest {
                model: self.model.clone(),
                messages: vec![Message::user(prompt)],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stop: vec![],
            };

            let response = self.provider.complete(request).await?;
            let reply = response.message.content.trim().to_string();
            debug!(iteration, reply = %reply, "Model response");

            self.event_bus.publish(DomainEvent::ModelResponded {
                iteration,
                model: response.model.clone(),
                response_preview: reply.chars().take(EVENT_PREVIEW_CHARS).collect(),
                tokens_used: response.usage.as_ref().map(|u| u.total_tokens),
                timestamp: Utc::now(),
            });

            let action = parse_action(&reply);

            if let Action::Malformed { .. } = action {
                parse_failures += 1;
                warn!(iteration, failures = parse_failures, "Could not parse model response");
                self.event_bus.publish(DomainEvent::ParseFailed {
                    iteration,
                    failures: parse_failures,
                    timestamp: Utc::now(),
                });

                if self.policy.is_natural_answer(&reply) {
                    return Ok(self.finish(reply, iteration, Termination::NaturalLanguage, state));
                }

                if parse_failures <= self.policy.max_parse_retries {
                    state.append(format_correction(&reply));
                    continue;
                }

                let answer = if reply.chars().count() > self.policy.last_resort_min_chars {
                    reply
                } else {
                    FORMAT_APOLOGY.to_string()
                };
                return Ok(self.finish(answer, iteration, Termination::ParseFallback, state));
            }

            let dispatch = self.dispatcher.dispatch(&action, &state).await;

            if let Some(invocation) = &dispatch.invocation {
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: invocation.result.tool_name.clone(),
                    arguments: invocation.arguments.clone(),
                    success: invocation.result.success(),
                    duration_ms: invocation.duration_ms,
                    timestamp: Utc::now(),
                });
            }

            if let Some(answer) = dispatch.answer {
                return Ok(self.finish(answer, iteration, Termination::FinalAnswer, state));
            }

            for entry in dispatch.history {
                state.append(entry);
            }
            if let Some(question) = dispatch.working_question {
                state.set_working_question(question);
            }
        }

        warn!(max_loops, "Iteration budget exhausted");
        Ok(self.finish(
            EXHAUSTED_APOLOGY.to_string(),
            max_loops,
            Termination::Exhausted,
            state,
        ))
    }

    fn finish(
        &self,
        answer: String,
        iterations: u32,
        termination: Termination,
        state: ConversationState,
    ) -> AskOutcome {
        info!(iterations, termination = %termination, "Answer produced");
        self.event_bus.publish(DomainEvent::AnswerProduced {
            iterations,
            termination: termination.to_string(),
            timestamp: Utc::now(),
        });

        AskOutcome {
            answer,
            iterations,
            termination,
            history: state.into_history(),
        }
    }
}

/// Corrective history entry for an unparseable reply.
fn format_correction(reply: &str) -> String {
    let received: String = reply.chars().take(RECEIVED_PREVIEW_CHARS).collect();
    format!(
        "Error: Invalid JSON format. Your response must be valid JSON.\nReceived: {received}...\nRequired format: {{\"tool\": \"tool_name\", \"args\": {{...}}}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use gamewise_core::catalog::GameDocument;

    fn agent(provider: Arc<SequentialMockProvider>, retriever: FixedRetriever) -> AgentLoop {
        AgentLoop::new(
            provider,
            "mock-model",
            Arc::new(retriever),
            Arc::new(echo_registry()),
            Arc::new(EventBus::default()),
        )
    }

    #[tokio::test]
    async fn final_answer_round_trips_unchanged() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "final_answer", "args": {"answer": "X"}}"#,
        ]));
        let outcome = agent(provider.clone(), FixedRetriever::empty()).run("q").await.unwrap();

        assert_eq!(outcome.answer, "X");
        assert_eq!(outcome.termination, Termination::FinalAnswer);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn catalog_question_returns_listed_games() {
        let answer = "We have Doom by id Software (1993) and Half-Life by Valve (1998).";
        let reply = format!(r#"{{"tool": "final_answer", "args": {{"answer": "{answer}"}}}}"#);
        let provider = Arc::new(SequentialMockProvider::new(&[reply.as_str()]));

        let result = agent(provider.clone(), FixedRetriever::two_games())
            .ask("What games do you have?")
            .await
            .unwrap();

        assert_eq!(result, answer);
        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("1. Doom by id Software (1993)\n2. Half-Life by Valve (1998)"));
        assert!(prompt.contains("Question: What games do you have?"));
    }

    #[tokio::test]
    async fn empty_retrieval_is_reported_to_the_model() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "final_answer", "args": {"answer": "none"}}"#,
        ]));
        agent(provider.clone(), FixedRetriever::empty()).ask("anything?").await.unwrap();
        assert!(provider.prompts()[0].contains("No games found in database."));
    }

    #[tokio::test]
    async fn natural_prose_is_accepted_immediately() {
        let prose = "Doom was released by id Software in December 1993.";
        let provider = Arc::new(SequentialMockProvider::new(&[prose]));

        let outcome = agent(provider.clone(), FixedRetriever::empty()).run("When?").await.unwrap();

        assert_eq!(outcome.answer, prose);
        assert_eq!(outcome.termination, Termination::NaturalLanguage);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn repeated_garbage_returns_third_reply() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            "{garbage one",
            "{garbage two",
            "{still not json, third attempt}",
        ]));

        let outcome = agent(provider.clone(), FixedRetriever::empty()).run("q").await.unwrap();

        assert_eq!(outcome.answer, "{still not json, third attempt}");
        assert_eq!(outcome.termination, Termination::ParseFallback);
        assert_eq!(provider.call_count(), 3);
        assert_eq!(outcome.history.len(), 2);
        assert!(outcome.history[0].starts_with("Error: Invalid JSON format."));
        assert!(outcome.history[0].contains("Received: {garbage one..."));
    }

    #[tokio::test]
    async fn short_garbage_gets_the_apology() {
        let provider = Arc::new(SequentialMockProvider::new(&["{", "{x", "{y"]));
        let answer = agent(provider, FixedRetriever::empty()).ask("q").await.unwrap();
        assert_eq!(answer, FORMAT_APOLOGY);
    }

    #[tokio::test]
    async fn tool_call_then_final_answer() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"```json
{"tool": "search", "args": {"query": "Half-Life release"}}
```"#,
            r#"{"tool": "final_answer", "args": {"answer": "1998"}}"#,
        ]));

        let outcome = agent(provider.clone(), FixedRetriever::two_games())
            .run("When was Half-Life released?")
            .await
            .unwrap();

        assert_eq!(outcome.answer, "1998");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(
            outcome.history,
            vec!["You called: search\nArguments: {\"query\":\"Half-Life release\"}\nResult: echo: Half-Life release".to_string()]
        );

        let second_prompt = &provider.prompts()[1];
        assert!(second_prompt.contains("Original question: When was Half-Life released?"));
        assert!(second_prompt.contains("You just received this result from search: echo: Half-Life release"));
        assert!(second_prompt.contains("You called: search"));
    }

    #[tokio::test]
    async fn unknown_tool_continues_the_loop() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "frobnicate", "args": {}}"#,
            r#"{"tool": "final_answer", "args": {"answer": "ok"}}"#,
        ]));

        let outcome = agent(provider.clone(), FixedRetriever::empty()).run("q").await.unwrap();

        assert_eq!(outcome.answer, "ok");
        assert_eq!(
            outcome.history,
            vec!["Error: Unknown tool: 'frobnicate'. Available tools are: search, wikipedia, save, final_answer".to_string()]
        );
        assert!(provider.prompts()[1].contains("Unknown tool: 'frobnicate'"));
    }

    #[tokio::test]
    async fn missing_argument_continues_the_loop() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "search", "args": {}}"#,
            r#"{"tool": "final_answer", "args": {"answer": "done"}}"#,
        ]));

        let outcome = agent(provider, FixedRetriever::empty()).run("q").await.unwrap();

        assert_eq!(outcome.answer, "done");
        assert!(outcome.history[0].contains("requires"));
        assert!(outcome.history[0].contains("query"));
    }

    #[tokio::test]
    async fn tool_failure_is_reported_to_the_model() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "wikipedia", "args": {"query": "Tetris"}}"#,
            r#"{"tool": "final_answer", "args": {"answer": "Tetris is from 1984."}}"#,
        ]));
        let agent = AgentLoop::new(
            provider.clone(),
            "mock-model",
            Arc::new(FixedRetriever::empty()),
            Arc::new(registry_with(vec![Box::new(FailingTool)])),
            Arc::new(EventBus::default()),
        );

        let outcome = agent.run("Tetris?").await.unwrap();

        assert_eq!(outcome.answer, "Tetris is from 1984.");
        assert!(outcome.history[0].contains("Error calling tool 'wikipedia'"));
        assert!(provider.prompts()[1].contains("network unreachable"));
    }

    #[tokio::test]
    async fn empty_final_answer_is_not_terminal() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "final_answer", "args": {"answer": ""}}"#,
            r#"{"tool": "final_answer", "args": {"answer": "second try"}}"#,
        ]));

        let outcome = agent(provider, FixedRetriever::empty()).run("q").await.unwrap();
        assert_eq!(outcome.answer, "second try");
        assert_eq!(
            outcome.history,
            vec!["Error: final_answer requires a non-empty 'answer' in args".to_string()]
        );
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_apology() {
        let call = r#"{"tool": "search", "args": {"query": "more"}}"#;
        let provider = Arc::new(SequentialMockProvider::new(&[call, call, call]));

        let outcome = agent(provider.clone(), FixedRetriever::empty())
            .run_with_budget("q", 3)
            .await
            .unwrap();

        assert_eq!(outcome.answer, EXHAUSTED_APOLOGY);
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(provider.call_count(), 3);
        assert_eq!(outcome.history.len(), 3);
    }

    #[tokio::test]
    async fn never_exceeds_the_budget() {
        for max_loops in 1..=6u32 {
            let call = r#"{"tool": "frobnicate", "args": {}}"#;
            let replies = vec![call; max_loops as usize];
            let provider = Arc::new(SequentialMockProvider::new(&replies));

            let answer = agent(provider.clone(), FixedRetriever::empty())
                .ask_with_budget("q", max_loops)
                .await
                .unwrap();

            assert_eq!(answer, EXHAUSTED_APOLOGY);
            assert_eq!(provider.call_count(), max_loops as usize);
        }
    }

    #[tokio::test]
    async fn zero_budget_still_calls_the_model_once() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "final_answer", "args": {"answer": "once"}}"#,
        ]));
        let answer = agent(provider, FixedRetriever::empty())
            .ask_with_budget("q", 0)
            .await
            .unwrap();
        assert_eq!(answer, "once");
    }

    #[tokio::test]
    async fn parse_retries_are_counted_apart_from_iterations() {
        // A tool call first, so the parse failures happen at iterations 2-4.
        let provider = Arc::new(SequentialMockProvider::new(&[
            r#"{"tool": "search", "args": {"query": "x"}}"#,
            "{bad",
            "{bad again",
            "{third bad reply, long enough}",
        ]));

        let outcome = agent(provider.clone(), FixedRetriever::empty()).run("q").await.unwrap();

        assert_eq!(outcome.termination, Termination::ParseFallback);
        assert_eq!(outcome.answer, "{third bad reply, long enough}");
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn natural_answer_threshold_is_configurable() {
        let prose = "Valve made it.";
        let provider = Arc::new(SequentialMockProvider::new(&[prose]));

        let outcome = agent(provider, FixedRetriever::empty())
            .with_policy(LoopPolicy {
                natural_answer_min_chars: 5,
                ..LoopPolicy::default()
            })
            .run("Who made Portal 2?")
            .await
            .unwrap();

        assert_eq!(outcome.answer, prose);
        assert_eq!(outcome.termination, Termination::NaturalLanguage);
    }

    #[tokio::test]
    async fn provider_failure_is_an_error() {
        let agent = AgentLoop::new(
            Arc::new(UnavailableProvider),
            "mock-model",
            Arc::new(FixedRetriever::empty()),
            Arc::new(echo_registry()),
            Arc::new(EventBus::default()),
        );

        let err = agent.ask("q").await.unwrap_err();
        assert!(matches!(err, gamewise_core::Error::Provider(_)));
    }

    #[tokio::test]
    async fn events_trace_the_loop() {
        let provider = Arc::new(SequentialMockProvider::new(&[
            "{nope",
            r#"{"tool": "save", "args": {"text": "notes"}}"#,
            r#"{"tool": "final_answer", "args": {"answer": "saved"}}"#,
        ]));
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();

        let agent = AgentLoop::new(
            provider,
            "mock-model",
            Arc::new(FixedRetriever::new(vec![GameDocument::new("Doom", "id Software", "1993")])),
            Arc::new(echo_registry()),
            bus,
        );
        agent.ask("Save notes about Doom").await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event.as_ref() {
                DomainEvent::ModelResponded { .. } => "model".to_string(),
                DomainEvent::ParseFailed { failures, .. } => format!("parse_failed:{failures}"),
                DomainEvent::ToolExecuted { tool_name, success, .. } => format!("tool:{tool_name}:{success}"),
                DomainEvent::AnswerProduced { termination, .. } => format!("answer:{termination}"),
            });
        }

        assert_eq!(
            kinds,
            vec![
                "model",
                "parse_failed:1",
                "model",
                "tool:save:true",
                "model",
                "answer:final_answer",
            ]
        );
    }
}
