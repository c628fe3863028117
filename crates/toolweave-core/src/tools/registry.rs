//! Tool registry and router
//!
//! The ToolRegistry is the central component for:
//! - Tracking every connected tool provider
//! - Mapping a tool name to the connection that owns it
//! - Converting registered tools to LLM definitions
//! - Executing tool calls without ever failing a turn

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ToolServerConfig;
use crate::logging::Logger;
use crate::mcp::{McpClient, McpResult};
use crate::types::{Tool, ToolCall, ToolResult};
use crate::{log_error, log_info, log_warn};

use super::error::ToolError;
use super::provider::{ToolDescriptor, ToolOutput, ToolProvider};

/// Outcome of connecting to the configured tool servers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Connections that were discovered and registered
    pub available: Vec<String>,
    /// Connections that failed, with the reason
    pub unavailable: Vec<(String, String)>,
}

#[derive(Default)]
struct Catalog {
    /// Tool name -> connection id
    routes: HashMap<String, String>,
    /// Registered tools in registration order
    tools: Vec<ToolDescriptor>,
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    /// Connection id -> provider
    connections: RwLock<HashMap<String, Arc<dyn ToolProvider>>>,
    catalog: RwLock<Catalog>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            catalog: RwLock::new(Catalog::default()),
            logger,
        }
    }

    /// Track a connection; an id that is already present keeps its first provider
    ///
    /// Returns whether `provider` is the one tracked under its id afterwards.
    pub fn add_connection(&self, provider: Arc<dyn ToolProvider>) -> bool {
        let id = provider.id().to_string();
        let mut connections = self.connections.write();
        if let Some(existing) = connections.get(&id) {
            if Arc::ptr_eq(existing, &provider) {
                return true;
            }
            log_warn!(self.logger, "[ToolRegistry] Connection '{}' already present, keeping the first", id);
            return false;
        }
        connections.insert(id, provider);
        true
    }

    /// Register the tools a connection offers
    ///
    /// The first connection to register a name owns it; later duplicates are
    /// skipped. Returns how many tools were added.
    pub fn register(&self, connection_id: &str, descriptors: Vec<ToolDescriptor>) -> usize {
        let offered = descriptors.len();
        let mut added = 0;
        {
            let mut catalog = self.catalog.write();
            for descriptor in descriptors {
                if let Some(owner) = catalog.routes.get(&descriptor.name) {
                    log_warn!(
                        self.logger,
                        "[ToolRegistry] Skipping duplicate tool '{}' from '{}', already provided by '{}'",
                        descriptor.name,
                        connection_id,
                        owner
                    );
                    continue;
                }
                catalog.routes.insert(descriptor.name.clone(), connection_id.to_string());
                catalog.tools.push(descriptor);
                added += 1;
            }
        }

        log_info!(
            self.logger,
            "[ToolRegistry] Registered {} of {} tools from '{}'",
            added,
            offered,
            connection_id
        );
        added
    }

    /// Discover a provider's tools, then track and register it
    pub async fn register_provider(&self, provider: Arc<dyn ToolProvider>) -> McpResult<usize> {
        let descriptors = provider.discover().await?;
        let id = provider.id().to_string();
        if !self.add_connection(provider) {
            return Ok(0);
        }
        Ok(self.register(&id, descriptors))
    }

    /// Connect to every configured tool server and register what they offer
    ///
    /// Connections are established concurrently. Registration follows the
    /// configuration order so the first listed server wins name clashes.
    /// Failed servers are reported, not retried.
    pub async fn connect_all(&self, configs: &[ToolServerConfig]) -> BootstrapReport {
        let attempts = configs.iter().map(|config| {
            let logger = Arc::clone(&self.logger);
            async move {
                let client = McpClient::connect(config, logger).await?;
                let descriptors = client.discover().await?;
                Ok::<_, crate::mcp::McpError>((client, descriptors))
            }
        });
        let outcomes = join_all(attempts).await;

        let mut report = BootstrapReport::default();
        for (config, outcome) in configs.iter().zip(outcomes) {
            match outcome {
                Ok((client, descriptors)) => {
                    if !self.add_connection(Arc::new(client)) {
                        report
                            .unavailable
                            .push((config.name.clone(), "duplicate tool server name".to_string()));
                        continue;
                    }
                    self.register(&config.name, descriptors);
                    report.available.push(config.name.clone());
                }
                Err(e) => {
                    log_error!(self.logger, "[ToolRegistry] Tool server '{}' unavailable: {}", config.name, e);
                    report.unavailable.push((config.name.clone(), e.to_string()));
                }
            }
        }

        log_info!(
            self.logger,
            "[ToolRegistry] Bootstrap complete: {} available, {} unavailable, {} tools",
            report.available.len(),
            report.unavailable.len(),
            self.tool_count()
        );
        report
    }

    /// Connection id that owns `name`
    pub fn route(&self, name: &str) -> Result<String, ToolError> {
        self.catalog
            .read()
            .routes
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    fn connection(&self, name: &str) -> Result<Arc<dyn ToolProvider>, ToolError> {
        let connection_id = self.route(name)?;
        self.connections
            .read()
            .get(&connection_id)
            .cloned()
            .ok_or(ToolError::ConnectionMissing {
                tool: name.to_string(),
                connection: connection_id,
            })
    }

    /// Invoke a tool through its owning connection
    pub async fn invoke(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError> {
        let provider = self.connection(name)?;
        log_info!(self.logger, "[ToolRegistry] Calling tool '{}' on '{}'", name, provider.id());
        Ok(provider.invoke(name, input).await?)
    }

    /// Execute a tool call from an LLM response
    ///
    /// Never fails: routing and invocation errors become an error result the
    /// model can read.
    pub async fn execute_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        match self.invoke(&tool_call.name, tool_call.input.clone()).await {
            Ok(output) => output.into_result(&tool_call.id),
            Err(e) => {
                log_warn!(self.logger, "[ToolRegistry] Tool '{}' failed: {}", tool_call.name, e);
                ToolResult::error(
                    &tool_call.id,
                    format!("Error executing tool '{}': {}", tool_call.name, e),
                )
            }
        }
    }

    /// Execute a round of tool calls concurrently
    ///
    /// Results come back in the order of `tool_calls` once every call has
    /// resolved.
    pub async fn execute_tool_calls(&self, tool_calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(tool_calls.iter().map(|call| self.execute_tool_call(call))).await
    }

    /// Get tools for sending to LLM
    pub fn llm_tools(&self) -> Vec<Tool> {
        self.catalog.read().tools.iter().map(ToolDescriptor::to_tool).collect()
    }

    /// Registered tool descriptors in registration order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.catalog.read().tools.clone()
    }

    /// Ids of the tracked connections
    pub fn connection_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.connections.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get count of registered tools
    pub fn tool_count(&self) -> usize {
        self.catalog.read().tools.len()
    }
}
