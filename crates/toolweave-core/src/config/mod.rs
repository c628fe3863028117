//! Configuration
//!
//! A single YAML file describes the model provider, the conversation
//! limits and the tool servers to connect at startup. It can live at
//! user level (`~/.config/toolweave/config.yaml`) or workspace level
//! (`.config/toolweave/config.yaml`).

mod error;
mod file;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use file::{ConfigLevel, FileConfigProvider};
pub use schema::{ChatSettings, ConfigFile, ProviderSettings, ToolServerConfig, ToolTransport};
