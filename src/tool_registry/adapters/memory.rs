//! In-memory connector adapter for lifecycle tests and offline runs.

use crate::tool_registry::{
    domain::{SystemId, ToolDefinition},
    ports::{McpConnector, McpConnectorError, McpConnectorResult},
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A connector call captured by [`InMemoryMcpConnector`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorCall {
    /// `connect_sse` was invoked.
    ConnectSse {
        /// URL passed by the caller.
        url: String,
        /// Connection identifier.
        server_id: SystemId,
    },
    /// `connect_stdio` was invoked.
    ConnectStdio {
        /// Command passed by the caller.
        command: String,
        /// Arguments passed by the caller.
        args: Vec<String>,
        /// Connection identifier.
        server_id: SystemId,
    },
    /// `disconnect` was invoked.
    Disconnect(Option<SystemId>),
    /// `call_tool` was invoked.
    CallTool {
        /// Connection identifier.
        server_id: SystemId,
        /// Remote tool name.
        tool_name: String,
        /// Arguments passed by the caller.
        arguments: Value,
    },
}

/// In-memory MCP connector.
///
/// This adapter models connection bookkeeping without spawning processes or
/// opening sockets. Tool catalogs, connection failures, and tool outputs are
/// scripted up front; every call is journaled for later inspection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMcpConnector {
    state: Arc<RwLock<InMemoryConnectorState>>,
}

#[derive(Debug, Default)]
struct InMemoryConnectorState {
    live: Vec<SystemId>,
    failing: HashSet<SystemId>,
    stalling: HashSet<SystemId>,
    catalogs: HashMap<SystemId, Vec<ToolDefinition>>,
    outputs: HashMap<(SystemId, String), Result<String, String>>,
    journal: Vec<ConnectorCall>,
}

impl InMemoryMcpConnector {
    /// Creates an empty connector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates remote tool names with a system.
    ///
    /// Existing catalog entries are replaced.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when a tool name is blank or lock acquisition
    /// fails.
    pub fn set_tool_catalog<I, S>(&self, server_id: &SystemId, remote_names: I) -> McpConnectorResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tools = remote_names
            .into_iter()
            .map(|remote_name| {
                let name = remote_name.into();
                let description = format!("Remote tool {name}");
                ToolDefinition::remote(
                    server_id.clone(),
                    name,
                    Some(description),
                    json!({"type": "object"}),
                )
                .map_err(McpConnectorError::runtime)
            })
            .collect::<McpConnectorResult<Vec<_>>>()?;

        self.write()?.catalogs.insert(server_id.clone(), tools);
        Ok(())
    }

    /// Makes every connection attempt for `server_id` fail.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn fail_connections_for(&self, server_id: &SystemId) -> McpConnectorResult<()> {
        self.write()?.failing.insert(server_id.clone());
        Ok(())
    }

    /// Makes every connection attempt for `server_id` hang forever.
    ///
    /// The attempt is journaled before it stalls.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn stall_connections_for(&self, server_id: &SystemId) -> McpConnectorResult<()> {
        self.write()?.stalling.insert(server_id.clone());
        Ok(())
    }

    /// Scripts the output of `tool_name` on `server_id`.
    ///
    /// An `Err` value is reported as a failed tool result.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn set_tool_output(
        &self,
        server_id: &SystemId,
        tool_name: impl Into<String>,
        output: Result<String, String>,
    ) -> McpConnectorResult<()> {
        self.write()?
            .outputs
            .insert((server_id.clone(), tool_name.into()), output);
        Ok(())
    }

    /// Returns every call received so far.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn journal(&self) -> McpConnectorResult<Vec<ConnectorCall>> {
        Ok(self.read()?.journal.clone())
    }

    /// Returns the identifiers of live connections in connection order.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn live_connections(&self) -> McpConnectorResult<Vec<SystemId>> {
        Ok(self.read()?.live.clone())
    }

    fn read(&self) -> McpConnectorResult<RwLockReadGuard<'_, InMemoryConnectorState>> {
        self.state
            .read()
            .map_err(|err| McpConnectorError::runtime(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> McpConnectorResult<RwLockWriteGuard<'_, InMemoryConnectorState>> {
        self.state
            .write()
            .map_err(|err| McpConnectorError::runtime(std::io::Error::other(err.to_string())))
    }

    async fn open(&self, server_id: &SystemId, call: ConnectorCall) -> McpConnectorResult<()> {
        let stalled = {
            let mut state = self.write()?;
            state.journal.push(call);
            state.live.retain(|live| live != server_id);
            if state.failing.contains(server_id) {
                return Err(McpConnectorError::connection(
                    server_id,
                    "connection refused",
                ));
            }
            let stall = state.stalling.contains(server_id);
            if !stall {
                state.live.push(server_id.clone());
            }
            stall
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

#[async_trait]
impl McpConnector for InMemoryMcpConnector {
    async fn connect_sse(&self, url: &str, server_id: &SystemId) -> McpConnectorResult<()> {
        self.open(
            server_id,
            ConnectorCall::ConnectSse {
                url: url.to_owned(),
                server_id: server_id.clone(),
            },
        )
        .await
    }

    async fn connect_stdio(
        &self,
        command: &str,
        args: &[String],
        server_id: &SystemId,
    ) -> McpConnectorResult<()> {
        self.open(
            server_id,
            ConnectorCall::ConnectStdio {
                command: command.to_owned(),
                args: args.to_vec(),
                server_id: server_id.clone(),
            },
        )
        .await
    }

    async fn disconnect(&self, server_id: Option<&SystemId>) -> McpConnectorResult<()> {
        let mut state = self.write()?;
        state.journal.push(ConnectorCall::Disconnect(server_id.cloned()));
        match server_id {
            Some(id) => state.live.retain(|live| live != id),
            None => state.live.clear(),
        }
        Ok(())
    }

    async fn tools(&self) -> McpConnectorResult<Vec<ToolDefinition>> {
        let state = self.read()?;
        Ok(state
            .live
            .iter()
            .filter_map(|id| state.catalogs.get(id))
            .flatten()
            .cloned()
            .collect())
    }

    async fn call_tool(
        &self,
        server_id: &SystemId,
        remote_name: &str,
        arguments: Value,
    ) -> McpConnectorResult<String> {
        let mut state = self.write()?;
        state.journal.push(ConnectorCall::CallTool {
            server_id: server_id.clone(),
            tool_name: remote_name.to_owned(),
            arguments,
        });

        if !state.live.contains(server_id) {
            return Err(McpConnectorError::NotConnected(server_id.clone()));
        }

        match state
            .outputs
            .get(&(server_id.clone(), remote_name.to_owned()))
        {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(message)) => Err(McpConnectorError::ToolFailed {
                tool_name: remote_name.to_owned(),
                message: message.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}
