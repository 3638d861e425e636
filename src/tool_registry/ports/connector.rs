//! Multi-client connector port for MCP connections.

use crate::tool_registry::domain::{McpTransport, SystemId, ToolDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for connector operations.
pub type McpConnectorResult<T> = Result<T, McpConnectorError>;

/// Connection management and tool dispatch across several MCP servers.
///
/// Each live connection is keyed by a [`SystemId`]. Connecting an identifier
/// that is already live replaces the previous connection.
#[async_trait]
pub trait McpConnector: Send + Sync {
    /// Connects to an MCP server over HTTP+SSE.
    async fn connect_sse(&self, url: &str, server_id: &SystemId) -> McpConnectorResult<()>;

    /// Connects to an MCP server by launching `command` with `args`.
    async fn connect_stdio(
        &self,
        command: &str,
        args: &[String],
        server_id: &SystemId,
    ) -> McpConnectorResult<()>;

    /// Tears down one connection, or every connection when `server_id` is
    /// `None`. Unknown identifiers are ignored.
    async fn disconnect(&self, server_id: Option<&SystemId>) -> McpConnectorResult<()>;

    /// Returns the tools currently exposed by live connections, each tagged
    /// with its owning connection, in connection order.
    async fn tools(&self) -> McpConnectorResult<Vec<ToolDefinition>>;

    /// Calls `remote_name` on the connection `server_id` and returns its
    /// textual output.
    async fn call_tool(
        &self,
        server_id: &SystemId,
        remote_name: &str,
        arguments: Value,
    ) -> McpConnectorResult<String>;

    /// Connects using the entry point matching the transport variant.
    async fn connect(
        &self,
        server_id: &SystemId,
        transport: &McpTransport,
    ) -> McpConnectorResult<()> {
        match transport {
            McpTransport::HttpSse(config) => self.connect_sse(config.base_url(), server_id).await,
            McpTransport::Stdio(config) => {
                self.connect_stdio(config.command(), config.args(), server_id)
                    .await
            }
        }
    }
}

/// Errors returned by connector adapters.
#[derive(Debug, Clone, Error)]
pub enum McpConnectorError {
    /// The transport could not be opened or the handshake failed.
    #[error("failed to connect to MCP server {server_id}: {reason}")]
    Connection {
        /// Connection identifier.
        server_id: SystemId,
        /// Reason string.
        reason: String,
    },

    /// The server answered with a protocol-level failure.
    #[error("MCP protocol error on {server_id}: {reason}")]
    Protocol {
        /// Connection identifier.
        server_id: SystemId,
        /// Reason string.
        reason: String,
    },

    /// No live connection exists for the identifier.
    #[error("MCP server {0} is not connected")]
    NotConnected(SystemId),

    /// The remote tool reported an error result.
    #[error("MCP tool '{tool_name}' failed: {message}")]
    ToolFailed {
        /// Remote tool name.
        tool_name: String,
        /// Error text returned by the server.
        message: String,
    },

    /// Generic runtime failure.
    #[error("MCP connector runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl McpConnectorError {
    /// Wraps a runtime error from the connector adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    /// Builds a connection error for `server_id`.
    pub fn connection(server_id: &SystemId, reason: impl ToString) -> Self {
        Self::Connection {
            server_id: server_id.clone(),
            reason: reason.to_string(),
        }
    }

    /// Builds a protocol error for `server_id`.
    pub fn protocol(server_id: &SystemId, reason: impl ToString) -> Self {
        Self::Protocol {
            server_id: server_id.clone(),
            reason: reason.to_string(),
        }
    }
}
