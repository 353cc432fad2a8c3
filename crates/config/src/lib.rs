//! Configuration loading, validation, and management for gamewise.
//!
//! Loads configuration from `~/.gamewise/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.gamewise/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Agent loop policy
    #[serde(default)]
    pub agent: AgentConfig,

    /// Game catalog and retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_model() -> String {
    "llama3.2".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agent", &self.agent)
            .field("retrieval", &self.retrieval)
            .field("tools", &self.tools)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Bounds of the ask loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model calls allowed per question
    #[serde(default = "default_max_loops")]
    pub max_loops: u32,

    /// Unparseable prose longer than this (and not starting with `{`)
    /// is returned as the answer
    #[serde(default = "default_natural_answer_min_chars")]
    pub natural_answer_min_chars: usize,

    /// After repeated parse failures, a raw reply longer than this is
    /// returned instead of the apology
    #[serde(default = "default_last_resort_min_chars")]
    pub last_resort_min_chars: usize,

    /// Corrective retries granted for unparseable replies
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: u32,

    /// Optional path to a custom prompt template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<PathBuf>,
}

fn default_max_loops() -> u32 {
    5
}
fn default_natural_answer_min_chars() -> usize {
    30
}
fn default_last_resort_min_chars() -> usize {
    20
}
fn default_max_parse_retries() -> u32 {
    2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_loops: default_max_loops(),
            natural_answer_min_chars: default_natural_answer_min_chars(),
            last_resort_min_chars: default_last_resort_min_chars(),
            max_parse_retries: default_max_parse_retries(),
            prompt_template: None,
        }
    }
}

/// How the catalog is searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Term overlap with title and author (no embedding model needed)
    #[default]
    Keyword,
    /// Cosine similarity over provider embeddings
    Embedding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// JSONL catalog, one game per line
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Documents returned per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub mode: RetrievalMode,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_catalog_path() -> PathBuf {
    AppConfig::config_dir().join("games.jsonl")
}
fn default_top_k() -> usize {
    2
}
fn default_embedding_model() -> String {
    "mxbai-embed-large".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            top_k: default_top_k(),
            mode: RetrievalMode::default(),
            embedding_model: default_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Where the `save` tool writes its files
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Network timeout for `search` and `wikipedia`
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sent with every tool HTTP request (some APIs reject anonymous clients)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "gamewise/0.1 (game-knowledge assistant)".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default location.
    ///
    /// Looks for `~/.gamewise/config.toml`. If not found, returns defaults.
    /// Environment variables override file settings.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("GAMEWISE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("GAMEWISE_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("GAMEWISE_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gamewise")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_loops == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_loops must be at least 1".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.tools.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            retrieval: RetrievalConfig::default(),
            tools: ToolsConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
