//! Wikipedia tool — page summaries from the REST API.

use async_trait::async_trait;
use gamewise_core::error::ToolError;
use gamewise_core::tool::{Tool, ToolArgument};
use serde_json::Value;
use tracing::debug;

const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

pub struct WikipediaTool {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, SUMMARY_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Summary URL for a free-text query; page titles use underscores.
    pub fn summary_url(&self, query: &str) -> Result<reqwest::Url, ToolError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ToolError::InvalidArguments(format!("bad Wikipedia URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::InvalidArguments("Wikipedia URL cannot be a base".into()))?
            .push(&query.trim().replace(' ', "_"));
        Ok(url)
    }
}

/// Render a summary payload, or the "no summary" notice.
pub fn format_summary(data: &Value) -> String {
    let Some(extract) = data["extract"].as_str().filter(|s| !s.is_empty()) else {
        return "No summary available for this topic.".into();
    };

    let title = data["title"].as_str().unwrap_or_default();
    let source = data["content_urls"]["desktop"]["page"]
        .as_str()
        .unwrap_or_default();

    format!("**{title}**\n\n{extract}\n\nSource: {source}")
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Search Wikipedia for detailed information."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument {
            name: "query",
            description: "the topic to look up",
        }
    }

    async fn execute(&self, query: &str) -> Result<String, ToolError> {
        let url = self.summary_url(query)?;
        debug!(url = %url, "Wikipedia lookup");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "wikipedia".into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(format!(
                "No Wikipedia page found for '{query}'. Try a different search term or use the 'search' tool."
            ));
        }
        if !status.is_success() {
            return Ok(format!(
                "Wikipedia error {}. Try rephrasing your query or use the 'search' tool.",
                status.as_u16()
            ));
        }

        let data: Value = response.json().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: "wikipedia".into(),
            reason: format!("invalid response body: {e}"),
        })?;

        Ok(format_summary(&data))
    }
}
