//! Context accumulator — the state re-sent to the model each iteration.

use gamewise_core::catalog::GameDocument;

/// Rendered when retrieval finds nothing.
pub const NO_GAMES: &str = "No games found in database.";

/// Format retrieved games as a 1-indexed list, one per line.
pub fn format_games_context(games: &[GameDocument]) -> String {
    if games.is_empty() {
        return NO_GAMES.into();
    }

    games
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("{}. {} by {} ({})", i + 1, doc.title, doc.author, doc.year))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The values substituted into the prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariables {
    pub games: String,
    pub question: String,
    pub history: String,
}

/// Mutable state of a single `ask` invocation.
///
/// History is append-only: entries are never rewritten or removed.
#[derive(Debug, Clone)]
pub struct ConversationState {
    original_question: String,
    working_question: String,
    retrieved_context: String,
    history: Vec<String>,
}

impl ConversationState {
    pub fn new(question: impl Into<String>, retrieved_context: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            working_question: question.clone(),
            original_question: question,
            retrieved_context: retrieved_context.into(),
            history: Vec::new(),
        }
    }

    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    pub fn working_question(&self) -> &str {
        &self.working_question
    }

    pub fn retrieved_context(&self) -> &str {
        &self.retrieved_context
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn append(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    pub fn set_working_question(&mut self, question: impl Into<String>) {
        self.working_question = question.into();
    }

    /// History entries separated by blank lines.
    pub fn rendered_history(&self) -> String {
        self.history.join("\n\n")
    }

    pub fn prompt_variables(&self) -> PromptVariables {
        PromptVariables {
            games: self.retrieved_context.clone(),
            question: self.working_question.clone(),
            history: self.rendered_history(),
        }
    }

    pub fn into_history(self) -> Vec<String> {
        self.history
    }
}
