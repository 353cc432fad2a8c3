//! The gamewise agent loop.
//!
//! One `ask` runs a bounded **retrieve → prompt → parse → dispatch** cycle:
//!
//! 1. **Retrieve** games relevant to the question from the catalog
//! 2. **Prompt** the model with the games, the question and the history
//! 3. **Parse** the reply into an [`Action`] (tool call, final answer, or malformed)
//! 4. **Dispatch** the action: run the tool and record the result, or stop
//!
//! The loop stops on a final answer, on prose the model wrote instead of
//! JSON, when parse retries run out, or when the iteration budget is spent.
//! Every path ends in a string; only model or retrieval outages are errors.

pub mod context;
pub mod dispatcher;
pub mod loop_runner;
pub mod parser;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use context::{format_games_context, ConversationState, PromptVariables};
pub use dispatcher::{ActionDispatcher, Dispatch, Invocation};
pub use loop_runner::{AgentLoop, AskOutcome, LoopPolicy, Termination};
pub use parser::{parse_action, Action};
pub use prompt::PromptTemplate;
