//! Web search tool — DuckDuckGo Instant Answer API.
//!
//! The Instant Answer API needs no key. It returns an abstract, a list of
//! related topics, and sometimes a direct answer; the tool stitches those
//! into plain text for the model.

use async_trait::async_trait;
use gamewise_core::error::ToolError;
use gamewise_core::tool::{Tool, ToolArgument};
use serde_json::Value;
use tracing::debug;

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";

/// Related topics included in the output.
const MAX_RELATED_TOPICS: usize = 3;

pub struct SearchTool {
    client: reqwest::Client,
    endpoint: String,
}

impl SearchTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, DUCKDUCKGO_URL)
    }

    /// Point the tool at a different Instant Answer compatible endpoint.
    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

/// Collect the useful text from an Instant Answer response.
///
/// Returns `None` when the response carries nothing worth showing.
pub fn summarize_instant_answer(data: &Value) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(text) = non_empty_str(&data["AbstractText"]) {
        parts.push(text.to_string());
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        parts.extend(
            topics
                .iter()
                .take(MAX_RELATED_TOPICS)
                .filter_map(|topic| non_empty_str(&topic["Text"]))
                .map(String::from),
        );
    }

    if let Some(answer) = non_empty_str(&data["Answer"]) {
        parts.push(answer.to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Use DuckDuckGo to search for current information."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument {
            name: "query",
            description: "the search query",
        }
    }

    async fn execute(&self, query: &str) -> Result<String, ToolError> {
        debug!(query = %query, "DuckDuckGo search");

        // Failures are reported to the model as text so it can switch tools.
        let output = match self.fetch(query).await {
            Ok(data) => summarize_instant_answer(&data).unwrap_or_else(|| {
                format!(
                    "DuckDuckGo returned no results. Suggestion: Try using the 'wikipedia' tool for '{query}'"
                )
            }),
            Err(e) => format!("Search error: {e}. Try using the 'wikipedia' tool instead."),
        };

        Ok(output)
    }
}
