//! Built-in tool implementations for Gamewise.
//!
//! Tools let the agent reach past the game catalog: search the web for
//! current information, pull an encyclopedia summary, and save an answer
//! to disk.

pub mod http;
pub mod save;
pub mod search;
pub mod wikipedia;

use gamewise_config::ToolsConfig;
use gamewise_core::tool::ToolRegistry;

/// Create the default tool registry: `search`, `wikipedia`, `save`.
///
/// Registration order is the order tools are listed to the model.
pub fn default_registry(config: &ToolsConfig) -> ToolRegistry {
    let client = http::build_client(config);

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(search::SearchTool::new(client.clone())));
    registry.register(Box::new(wikipedia::WikipediaTool::new(client)));
    registry.register(Box::new(save::SaveTool::new(&config.results_dir)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_tools_in_order() {
        let registry = default_registry(&ToolsConfig::default());
        assert_eq!(registry.names(), vec!["search", "wikipedia", "save"]);
    }

    #[test]
    fn default_registry_describes_arguments() {
        let registry = default_registry(&ToolsConfig::default());
        let text = registry.describe();
        assert!(text.contains("- search: Use DuckDuckGo to search for current information."));
        assert!(text.contains("- save: Save text to a file in the results directory. Args: text (str)"));
    }
}
