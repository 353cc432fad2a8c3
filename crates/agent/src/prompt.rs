//! Prompt template — the only place the tool-call protocol is explained
//! to the model.
//!
//! Placeholders are `{games}`, `{question}`, `{history}` (all required) and
//! `{tools}` (optional, filled from the registry). Substitution is a single
//! pass, so braces in the template's JSON examples and in substituted values
//! are left alone.

use gamewise_core::error::Error;
use std::path::Path;

use crate::context::PromptVariables;

const REQUIRED_PLACEHOLDERS: [&str; 3] = ["{games}", "{question}", "{history}"];

pub const DEFAULT_TEMPLATE: &str = r#"You are James, an expert on video games. Answer the user's question using the games from the database below and, when needed, the available tools.

Relevant games from the database:
{games}

Available tools:
{tools}
- final_answer: Give your final answer to the user. Args: answer (str) - the complete answer

You MUST respond ONLY with a single JSON object in this exact format:
{"tool": "<tool name>", "args": {...}}

When you have enough information, finish with:
{"tool": "final_answer", "args": {"answer": "your answer"}}

Do not write anything outside the JSON object.

Previous tool calls and results:
{history}

Question: {question}"#;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Build a template, checking that every required placeholder is present.
    pub fn new(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !text.contains(p))
            .collect();

        if !missing.is_empty() {
            return Err(Error::Config {
                message: format!("prompt template is missing {}", missing.join(", ")),
            });
        }

        Ok(Self { text })
    }

    /// Load a template from a file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read prompt template {}: {e}", path.display()),
        })?;
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute the prompt variables and the tool list.
    pub fn render(&self, vars: &PromptVariables, tools: &str) -> String {
        let substitutions = [
            ("{games}", vars.games.as_str()),
            ("{question}", vars.question.as_str()),
            ("{history}", vars.history.as_str()),
            ("{tools}", tools),
        ];

        let mut out = String::with_capacity(self.text.len() + vars.games.len() + vars.history.len());
        let mut rest = self.text.as_str();

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];

            match substitutions.iter().find(|(key, _)| rest.starts_with(key)) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &rest[key.len()..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
