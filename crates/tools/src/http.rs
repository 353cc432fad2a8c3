//! Shared HTTP client for the network-backed tools.

use gamewise_config::ToolsConfig;
use std::time::Duration;

/// Build a client with the configured timeout and user agent.
///
/// Every network tool must bound its wait; the agent loop has no timeout
/// of its own around tool calls.
pub fn build_client(config: &ToolsConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
