//! Configuration file structure

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::providers::ProviderModelConfig;

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// LLM provider and model
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Conversation limits and sampling
    #[serde(default)]
    pub chat: ChatSettings,

    /// Tool servers connected at startup
    #[serde(default)]
    pub tool_servers: Vec<ToolServerConfig>,
}

impl ConfigFile {
    /// Check every section for out-of-range values
    pub fn validate(&self) -> ConfigResult<()> {
        self.chat.validate()?;

        let mut seen = std::collections::HashSet::new();
        for server in &self.tool_servers {
            if server.name.trim().is_empty() {
                return Err(ConfigError::invalid("tool_servers.name", "must not be empty"));
            }
            if !seen.insert(server.name.as_str()) {
                return Err(ConfigError::invalid(
                    "tool_servers.name",
                    format!("duplicate server name '{}'", server.name),
                ));
            }
        }
        Ok(())
    }
}

/// Which model to talk to and how to authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider identifier (anthropic, openai, ollama, ...)
    #[serde(default = "default_provider_id")]
    pub id: String,
    /// Model identifier as used by the provider's API
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; falls back to the provider's environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL, honoured for every provider (proxies, gateways,
    /// OpenAI-compatible servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            id: default_provider_id(),
            model: default_model(),
            api_key: None,
            api_base: None,
        }
    }
}

impl ProviderSettings {
    /// Request-level model configuration for the provider
    pub fn model_config(&self) -> ProviderModelConfig {
        let mut config = ProviderModelConfig::new(&self.model);
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base);
        }
        config
    }
}

fn default_provider_id() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

/// Limits applied to every conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// System prompt sent with every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens generated per model call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Number of most recent history entries sent per request
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Tool rounds allowed per turn before the loop gives up
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Estimated token ceiling for each user's retained history
    #[serde(default = "default_token_ceiling")]
    pub token_ceiling: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            history_window: default_history_window(),
            max_depth: default_max_depth(),
            token_ceiling: default_token_ceiling(),
        }
    }
}

impl ChatSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid("chat.temperature", "must be between 0.0 and 2.0"));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid("chat.max_tokens", "must be positive"));
        }
        // A window of one could never hold an invocation together with its result
        if self.history_window < 2 {
            return Err(ConfigError::invalid("chat.history_window", "must be at least 2"));
        }
        if self.token_ceiling == 0 {
            return Err(ConfigError::invalid("chat.token_ceiling", "must be positive"));
        }
        Ok(())
    }
}

fn default_system_prompt() -> String {
    "You are a helpful assistant. Use the available tools when they help answer the user, \
     and answer concisely."
        .to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_history_window() -> usize {
    6
}

fn default_max_depth() -> usize {
    10
}

fn default_token_ceiling() -> usize {
    100_000
}

/// How to reach a tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolTransport {
    /// Spawn a child process and speak MCP over its stdio
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
    },
    /// Streamable HTTP endpoint
    Http { url: String },
    /// Unix domain socket
    Unix { path: String },
}

/// Configuration for a single tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServerConfig {
    /// Connection identifier, unique among tool servers
    pub name: String,
    /// Transport configuration
    pub transport: ToolTransport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: ConfigFile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.provider.id, "anthropic");
        assert_eq!(config.chat.history_window, 6);
        assert_eq!(config.chat.max_depth, 10);
        assert!(config.tool_servers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tool_server_transports() {
        let yaml = r#"
tool_servers:
  - name: time
    transport:
      type: stdio
      command: docker
      args: ["run", "--rm", "-i", "mcp/time"]
  - name: browser
    transport:
      type: http
      url: http://localhost:3001/mcp
  - name: editor
    transport:
      type: unix
      path: /tmp/editor.sock
"#;
        let config: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tool_servers.len(), 3);
        match &config.tool_servers[0].transport {
            ToolTransport::Stdio { command, args, env } => {
                assert_eq!(command, "docker");
                assert_eq!(args.len(), 4);
                assert!(env.is_empty());
            }
            other => panic!("expected stdio transport, got {:?}", other),
        }
        assert_eq!(
            config.tool_servers[1].transport,
            ToolTransport::Http { url: "http://localhost:3001/mcp".to_string() }
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ConfigFile::default();
        config.chat.history_window = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "chat.history_window", .. })));

        let mut config = ConfigFile::default();
        let server = ToolServerConfig {
            name: "memory".to_string(),
            transport: ToolTransport::Http { url: "http://localhost".to_string() },
        };
        config.tool_servers = vec![server.clone(), server];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_config() {
        let settings = ProviderSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let model = settings.model_config();
        assert_eq!(model.model, "claude-3-5-sonnet-latest");
        assert_eq!(model.api_key.as_deref(), Some("sk-test"));
        assert!(model.api_base.is_none());
    }
}
