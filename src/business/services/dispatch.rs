//! Tool dispatcher backed by an MCP connector.

use crate::agent::ports::{ToolDispatchError, ToolDispatchResult, ToolDispatcher};
use crate::tool_registry::domain::{ToolDefinition, ToolOrigin};
use crate::tool_registry::ports::McpConnector;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Routes remote tool calls to the connection that exposed the tool.
#[derive(Debug)]
pub struct ConnectorToolDispatcher<C: McpConnector> {
    connector: Arc<C>,
}

impl<C: McpConnector> ConnectorToolDispatcher<C> {
    /// Creates a dispatcher over `connector`.
    #[must_use]
    pub const fn new(connector: Arc<C>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl<C: McpConnector> ToolDispatcher for ConnectorToolDispatcher<C> {
    async fn dispatch(&self, tool: &ToolDefinition, arguments: Value) -> ToolDispatchResult<String> {
        let ToolOrigin::Remote {
            server_id,
            remote_name,
        } = tool.origin()
        else {
            return Err(ToolDispatchError::Unsupported(tool.name().to_owned()));
        };

        debug!(%server_id, tool = %remote_name, "calling remote tool");
        self.connector
            .call_tool(server_id, remote_name, arguments)
            .await
            .map_err(|err| ToolDispatchError::Failed(err.to_string()))
    }
}
