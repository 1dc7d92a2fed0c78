//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::openai::DEFAULT_BASE_URL;

/// Default system prompt advertised alongside the tool set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. \
Use a tool when it helps answer the request; respond normally when no tool is needed.";

/// Turn-loop configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// System prompt injected into each model request (never persisted).
    pub system_prompt: Option<String>,
    /// Upper bound on tool rounds per turn; exceeding it aborts the turn.
    pub max_tool_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tool_rounds: 8,
        }
    }
}

/// Agent configuration, read from the environment at startup.
#[derive(Clone)]
pub struct AgentConfig {
    /// Agent name for identification.
    pub name: String,
    /// Chat model identifier.
    pub model: String,
    /// OpenAI-compatible API base URL.
    pub base_url: String,
    /// API key for the model provider.
    pub api_key: SecretString,
    /// Path of the local thread database.
    pub db_path: PathBuf,
    pub engine: EngineConfig,
    /// HTTP chat API port; the server is only started when set.
    pub http_port: Option<u16>,
    /// Thread id used by the CLI channel.
    pub cli_thread: String,
    /// Root directory for the file-writing tool; registered only when set.
    pub files_dir: Option<PathBuf>,
    /// Serper key; the search tool is registered only when present.
    pub serper_api_key: Option<SecretString>,
    /// Pushover app token + user key; the push tool needs both.
    pub pushover_token: Option<SecretString>,
    pub pushover_user: Option<SecretString>,
}

impl AgentConfig {
    /// Build configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let http_port = match std::env::var("CONCIERGE_HTTP_PORT") {
            Ok(raw) => Some(raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "CONCIERGE_HTTP_PORT".to_string(),
                message: e.to_string(),
            })?),
            Err(_) => None,
        };

        let max_tool_rounds = match std::env::var("CONCIERGE_MAX_TOOL_ROUNDS") {
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                key: "CONCIERGE_MAX_TOOL_ROUNDS".to_string(),
                message: e.to_string(),
            })?,
            Err(_) => EngineConfig::default().max_tool_rounds,
        };

        let system_prompt = std::env::var("CONCIERGE_SYSTEM_PROMPT")
            .ok()
            .or_else(|| Some(DEFAULT_SYSTEM_PROMPT.to_string()));

        Ok(Self {
            name: "concierge".to_string(),
            model: std::env::var("CONCIERGE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            base_url: std::env::var("CONCIERGE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: SecretString::from(api_key),
            db_path: std::env::var("CONCIERGE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/concierge.db")),
            engine: EngineConfig {
                system_prompt,
                max_tool_rounds,
            },
            http_port,
            cli_thread: std::env::var("CONCIERGE_THREAD").unwrap_or_else(|_| "cli".to_string()),
            files_dir: std::env::var("CONCIERGE_FILES_DIR").ok().map(PathBuf::from),
            serper_api_key: std::env::var("SERPER_API_KEY").ok().map(SecretString::from),
            pushover_token: std::env::var("PUSHOVER_TOKEN").ok().map(SecretString::from),
            pushover_user: std::env::var("PUSHOVER_USER").ok().map(SecretString::from),
        })
    }
}
