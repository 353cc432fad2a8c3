//! Action dispatcher — validates an action against the tool registry and
//! says how the conversation should change.
//!
//! The dispatcher never touches `ConversationState` itself; it returns a
//! [`Dispatch`] describing the new working question, the history entries to
//! append, and the terminal answer if there is one.

use gamewise_core::tool::{ToolRegistry, ToolResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::context::ConversationState;
use crate::parser::{Action, FINAL_ANSWER_TOOL};

/// Appended when the model calls `final_answer` with nothing to say.
pub const EMPTY_FINAL_ANSWER: &str = "Error: final_answer requires a non-empty 'answer' in args";

/// The effect of dispatching one action.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Replaces the working question when set
    pub working_question: Option<String>,

    /// Entries to append to the history, in order
    pub history: Vec<String>,

    /// Terminal answer; the loop stops when set
    pub answer: Option<String>,

    /// The tool invocation this action caused, if any
    pub invocation: Option<Invocation>,
}

/// A tool call that actually reached the registry.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub arguments: String,
    pub result: ToolResult,
    pub duration_ms: u64,
}

pub struct ActionDispatcher {
    tools: Arc<ToolRegistry>,
}

impl ActionDispatcher {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Dispatch an action. `Malformed` is the loop's business and yields an
    /// empty `Dispatch`.
    pub async fn dispatch(&self, action: &Action, state: &ConversationState) -> Dispatch {
        match action {
            Action::FinalAnswer { answer } if !answer.is_empty() => Dispatch {
                answer: Some(answer.clone()),
                ..Default::default()
            },
            Action::FinalAnswer { .. } => {
                debug!("final_answer without content");
                Dispatch {
                    history: vec![EMPTY_FINAL_ANSWER.into()],
                    ..Default::default()
                }
            }
            Action::ToolCall { tool_name, args } if self.tools.contains(tool_name) => {
                self.call_tool(tool_name, args, state).await
            }
            Action::ToolCall { tool_name, .. } => {
                let message = self.unknown_tool_message(tool_name);
                warn!(tool = %tool_name, "Model requested an unknown tool");
                Dispatch {
                    history: vec![format!("Error: {message}")],
                    ..Default::default()
                }
            }
            Action::Malformed { .. } => Dispatch::default(),
        }
    }

    async fn call_tool(
        &self,
        tool_name: &str,
        args: &HashMap<String, String>,
        state: &ConversationState,
    ) -> Dispatch {
        let arguments = render_args(args);
        debug!(tool = %tool_name, arguments = %arguments, "Calling tool");

        let start = Instant::now();
        let result = self.tools.invoke(tool_name, args).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let entry = format!(
            "You called: {tool_name}\nArguments: {arguments}\nResult: {}",
            result.output
        );
        let working_question = format!(
            "Original question: {}\n\nYou just received this result from {tool_name}: {}\n\nNow provide your final answer using the 'final_answer' tool.",
            state.original_question(),
            result.output
        );

        Dispatch {
            working_question: Some(working_question),
            history: vec![entry],
            answer: None,
            invocation: Some(Invocation {
                arguments,
                result,
                duration_ms,
            }),
        }
    }

    fn unknown_tool_message(&self, tool_name: &str) -> String {
        let mut valid = self.tools.names();
        valid.push(FINAL_ANSWER_TOOL);
        format!(
            "Unknown tool: '{tool_name}'. Available tools are: {}",
            valid.join(", ")
        )
    }
}

/// Render arguments as a JSON object with sorted keys.
fn render_args(args: &HashMap<String, String>) -> String {
    let sorted: BTreeMap<&String, &String> = args.iter().collect();
    serde_json::to_string(&sorted).unwrap_or_else(|_| format!("{sorted:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{EchoTool, registry_with};
    use gamewise_core::tool::ToolStatus;

    fn dispatcher() -> ActionDispatcher {
        ActionDispatcher::new(Arc::new(registry_with(vec![Box::new(EchoTool::new("search", "query"))])))
    }

    fn state() -> ConversationState {
        ConversationState::new("Who made Doom?", "1. Doom by id Software (1993)")
    }

    fn call(name: &str, pairs: &[(&str, &str)]) -> Action {
        Action::ToolCall {
            tool_name: name.into(),
            args: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[tokio::test]
    async fn final_answer_is_terminal() {
        let d = dispatcher()
            .dispatch(&Action::FinalAnswer { answer: "id Software".into() }, &state())
            .await;
        assert_eq!(d.answer.as_deref(), Some("id Software"));
        assert!(d.history.is_empty());
        assert!(d.working_question.is_none());
    }

    #[tokio::test]
    async fn empty_final_answer_is_corrected() {
        let d = dispatcher()
            .dispatch(&Action::FinalAnswer { answer: String::new() }, &state())
            .await;
        assert!(d.answer.is_none());
        assert_eq!(d.history, vec![EMPTY_FINAL_ANSWER.to_string()]);
    }

    #[tokio::test]
    async fn known_tool_records_call_and_reframes_question() {
        let d = dispatcher().dispatch(&call("search", &[("query", "doom")]), &state()).await;

        assert!(d.answer.is_none());
        assert_eq!(
            d.history,
            vec![r#"You called: search
Arguments: {"query":"doom"}
Result: echo: doom"#
                .to_string()]
        );
        let question = d.working_question.unwrap();
        assert!(question.starts_with("Original question: Who made Doom?\n\n"));
        assert!(question.contains("You just received this result from search: echo: doom"));
        assert!(question.ends_with("Now provide your final answer using the 'final_answer' tool."));

        let invocation = d.invocation.unwrap();
        assert!(invocation.result.success());
    }

    #[tokio::test]
    async fn missing_argument_is_recorded_not_terminal() {
        let d = dispatcher().dispatch(&call("search", &[]), &state()).await;

        assert!(d.answer.is_none());
        assert_eq!(d.invocation.unwrap().result.status, ToolStatus::MissingArgument);
        assert!(d.history[0].contains("requires"));
        assert!(d.history[0].contains("query"));
        assert!(d.working_question.is_some());
    }

    #[tokio::test]
    async fn unknown_tool_lists_valid_names() {
        let d = dispatcher().dispatch(&call("frobnicate", &[]), &state()).await;

        assert!(d.answer.is_none());
        assert!(d.invocation.is_none());
        assert!(d.working_question.is_none());
        assert_eq!(
            d.history,
            vec!["Error: Unknown tool: 'frobnicate'. Available tools are: search, final_answer".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_is_a_no_op() {
        let d = dispatcher()
            .dispatch(&Action::Malformed { raw_text: "??".into() }, &state())
            .await;
        assert!(d.answer.is_none());
        assert!(d.history.is_empty());
    }
}
