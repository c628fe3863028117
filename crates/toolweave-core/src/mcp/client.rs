//! MCP Client using the official rmcp SDK
//!
//! Connects to tool servers over a child process's stdio, streamable HTTP
//! or a Unix socket.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join3;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    RoleClient,
};
use serde_json::Value;
use thiserror::Error;

#[cfg(unix)]
use tokio::net::UnixStream;

use crate::config::{ToolServerConfig, ToolTransport};
use crate::logging::Logger;
use crate::tools::{ToolDescriptor, ToolOutput, ToolProvider};

use super::capability::Capability;
use super::content::normalize_call_result;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// The call could not be completed
    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    /// The server ran the tool and reported a failure
    #[error("Tool '{tool}' reported an error: {message}")]
    ToolReportedError { tool: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "toolweave".to_string(),
            title: Some("Toolweave".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// MCP client for one tool server
pub struct McpClient {
    /// Connection identifier
    id: String,
    /// The underlying rmcp running service
    client: RunningService<RoleClient, ClientInfo>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect using a configured transport
    pub async fn connect(config: &ToolServerConfig, logger: Arc<dyn Logger>) -> McpResult<Self> {
        match &config.transport {
            ToolTransport::Stdio { command, args, env } => {
                let mut cmd = tokio::process::Command::new(command);
                cmd.args(args).envs(env);
                Self::connect_stdio(&config.name, cmd, logger).await
            }
            ToolTransport::Http { url } => Self::connect_http(&config.name, url, logger).await,
            ToolTransport::Unix { path } => Self::connect_unix(&config.name, path, logger).await,
        }
    }

    /// Spawn a tool server and speak MCP over its stdio
    pub async fn connect_stdio(
        id: &str,
        command: tokio::process::Command,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::TokioChildProcess;

        logger.info(&format!(
            "[McpClient] Spawning '{}': {:?}",
            id,
            command.as_std().get_program()
        ));

        let process = TokioChildProcess::new(command)
            .map_err(|e| McpError::ConnectionFailed(format!("failed to spawn '{}': {}", id, e)))?;

        let client = client_info()
            .serve(process)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Self::connected(id, client, logger)
    }

    /// Connect to an MCP server over a Unix socket
    #[cfg(unix)]
    pub async fn connect_unix(id: &str, socket_path: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting '{}' to Unix socket: {}", id, socket_path));

        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", socket_path, e)))?;

        let client = client_info()
            .serve(stream)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Self::connected(id, client, logger)
    }

    #[cfg(not(unix))]
    pub async fn connect_unix(id: &str, socket_path: &str, _logger: Arc<dyn Logger>) -> McpResult<Self> {
        Err(McpError::ConnectionFailed(format!(
            "'{}': Unix sockets are not supported on this platform ({})",
            id, socket_path
        )))
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(id: &str, url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        logger.info(&format!("[McpClient] Connecting '{}' to HTTP: {}", id, url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Self::connected(id, client, logger)
    }

    fn connected(
        id: &str,
        client: RunningService<RoleClient, ClientInfo>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] '{}' connected and initialized", id));
        Ok(Self {
            id: id.to_string(),
            client,
            logger,
        })
    }

    /// List everything the server declares: resources, tools and prompts
    ///
    /// Only the kinds present in the server's capabilities are queried, and
    /// those queries run concurrently.
    pub async fn list_capabilities(&self) -> McpResult<Vec<Capability>> {
        let (has_resources, has_tools, has_prompts) = match self.client.peer_info() {
            Some(info) => (
                info.capabilities.resources.is_some(),
                info.capabilities.tools.is_some(),
                info.capabilities.prompts.is_some(),
            ),
            None => (false, false, false),
        };

        let (resources, tools, prompts) = try_join3(
            self.query_resources(has_resources),
            self.query_tools(has_tools),
            self.query_prompts(has_prompts),
        )
        .await?;

        self.logger.info(&format!(
            "[McpClient] '{}' offers {} resources, {} tools, {} prompts",
            self.id,
            resources.len(),
            tools.len(),
            prompts.len()
        ));

        Ok(resources.into_iter().chain(tools).chain(prompts).collect())
    }

    async fn query_resources(&self, declared: bool) -> McpResult<Vec<Capability>> {
        if !declared {
            return Ok(Vec::new());
        }
        let result = self
            .client
            .list_resources(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(result
            .resources
            .into_iter()
            .map(|r| Capability::Resource {
                uri: r.raw.uri,
                name: r.raw.name,
            })
            .collect())
    }

    async fn query_tools(&self, declared: bool) -> McpResult<Vec<Capability>> {
        if !declared {
            return Ok(Vec::new());
        }
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(result
            .tools
            .iter()
            .map(|t| Capability::Tool(ToolDescriptor::from(t)))
            .collect())
    }

    async fn query_prompts(&self, declared: bool) -> McpResult<Vec<Capability>> {
        if !declared {
            return Ok(Vec::new());
        }
        let result = self
            .client
            .list_prompts(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(result
            .prompts
            .into_iter()
            .map(|p| Capability::Prompt {
                name: p.name,
                description: p.description,
            })
            .collect())
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger.info(&format!("[McpClient] '{}' calling tool: {}", self.id, name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        self.client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info(&format!("[McpClient] Closing '{}'", self.id));
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    fn id(&self) -> &str {
        &self.id
    }

    async fn discover(&self) -> McpResult<Vec<ToolDescriptor>> {
        Ok(self
            .list_capabilities()
            .await?
            .into_iter()
            .filter_map(Capability::into_tool)
            .collect())
    }

    async fn invoke(&self, name: &str, input: Value) -> McpResult<ToolOutput> {
        let result = self.call_tool(name, input).await?;
        normalize_call_result(name, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_spawn_failure_is_connection_error() {
        let config = ToolServerConfig {
            name: "ghost".to_string(),
            transport: ToolTransport::Stdio {
                command: "toolweave-test-no-such-binary".to_string(),
                args: vec!["--stdio".to_string()],
                env: HashMap::from([("MODE".to_string(), "test".to_string())]),
            },
        };

        let err = McpClient::connect(&config, Arc::new(NoOpLogger)).await.err().unwrap();
        assert!(matches!(err, McpError::ConnectionFailed(ref msg) if msg.contains("ghost")));
    }

    #[tokio::test]
    async fn test_missing_socket_is_connection_error() {
        let err = McpClient::connect_unix("editor", "/nonexistent/toolweave.sock", Arc::new(NoOpLogger))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, McpError::ConnectionFailed(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = McpError::ToolReportedError {
            tool: "fetch".to_string(),
            message: "404".to_string(),
        };
        assert_eq!(err.to_string(), "Tool 'fetch' reported an error: 404");
    }
}
