//! MCP connector backed by the `rmcp` SDK.
//!
//! [`RmcpConnector`] keeps one running client session per [`SystemId`].
//! Tools are discovered once when a session is established and cached with
//! the session; tool calls are routed to the owning peer.

use crate::tool_registry::{
    domain::{McpTransport, SystemId, ToolDefinition},
    ports::{McpConnector, McpConnectorError, McpConnectorResult},
};
use async_trait::async_trait;
use rmcp::ServiceExt;
use rmcp::model::{CallToolRequestParams, CallToolResult, Content, RawContent, Tool as McpTool};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::child_process::TokioChildProcess;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransport;
use serde_json::{Value, json};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A running client session and the tools it exposed at connect time.
struct Session {
    server_id: SystemId,
    service: RunningService<RoleClient, ()>,
    tools: Vec<ToolDefinition>,
}

/// Multi-client MCP connector over `rmcp` transports.
#[derive(Default)]
pub struct RmcpConnector {
    sessions: Mutex<Vec<Session>>,
}

impl RmcpConnector {
    /// Creates a connector with no live sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn spawn_stdio(&self, command: Command, server_id: &SystemId) -> McpConnectorResult<()> {
        self.disconnect(Some(server_id)).await?;

        let transport = TokioChildProcess::new(command)
            .map_err(|err| McpConnectorError::connection(server_id, err))?;
        let service: RunningService<RoleClient, ()> = ()
            .serve(transport)
            .await
            .map_err(|err| McpConnectorError::connection(server_id, err))?;

        self.register(server_id, service).await
    }

    async fn register(
        &self,
        server_id: &SystemId,
        service: RunningService<RoleClient, ()>,
    ) -> McpConnectorResult<()> {
        let listed = match service.list_all_tools().await {
            Ok(listed) => listed,
            Err(err) => {
                if let Err(cancel_err) = service.cancel().await {
                    warn!(%server_id, error = %cancel_err, "failed to cancel MCP session");
                }
                return Err(McpConnectorError::protocol(server_id, err));
            }
        };

        let tools = listed
            .iter()
            .map(|tool| convert_tool(server_id, tool))
            .collect::<McpConnectorResult<Vec<_>>>()?;
        debug!(%server_id, tool_count = tools.len(), "discovered MCP tools");

        self.sessions.lock().await.push(Session {
            server_id: server_id.clone(),
            service,
            tools,
        });
        Ok(())
    }
}

#[async_trait]
impl McpConnector for RmcpConnector {
    async fn connect_sse(&self, url: &str, server_id: &SystemId) -> McpConnectorResult<()> {
        self.disconnect(Some(server_id)).await?;

        let transport = StreamableHttpClientTransport::from_uri(url);
        let service: RunningService<RoleClient, ()> = ()
            .serve(transport)
            .await
            .map_err(|err| McpConnectorError::connection(server_id, err))?;

        self.register(server_id, service).await
    }

    async fn connect_stdio(
        &self,
        command: &str,
        args: &[String],
        server_id: &SystemId,
    ) -> McpConnectorResult<()> {
        let mut process = Command::new(command);
        process.args(args);
        self.spawn_stdio(process, server_id).await
    }

    async fn connect(
        &self,
        server_id: &SystemId,
        transport: &McpTransport,
    ) -> McpConnectorResult<()> {
        match transport {
            McpTransport::HttpSse(config) => self.connect_sse(config.base_url(), server_id).await,
            McpTransport::Stdio(config) => {
                let mut process = Command::new(config.command());
                process.args(config.args()).envs(config.env());
                if let Some(directory) = config.working_directory() {
                    process.current_dir(directory);
                }
                self.spawn_stdio(process, server_id).await
            }
        }
    }

    async fn disconnect(&self, server_id: Option<&SystemId>) -> McpConnectorResult<()> {
        let closing: Vec<Session> = {
            let mut sessions = self.sessions.lock().await;
            match server_id {
                Some(id) => {
                    let (closing, kept): (Vec<Session>, Vec<Session>) = sessions
                        .drain(..)
                        .partition(|session| &session.server_id == id);
                    *sessions = kept;
                    closing
                }
                None => sessions.drain(..).collect(),
            }
        };

        let mut first_error = None;
        for session in closing {
            let Session {
                server_id, service, ..
            } = session;
            if let Err(err) = service.cancel().await {
                warn!(%server_id, error = %err, "failed to cancel MCP session");
                first_error.get_or_insert(McpConnectorError::runtime(err));
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    async fn tools(&self) -> McpConnectorResult<Vec<ToolDefinition>> {
        Ok(self
            .sessions
            .lock()
            .await
            .iter()
            .flat_map(|session| session.tools.iter().cloned())
            .collect())
    }

    async fn call_tool(
        &self,
        server_id: &SystemId,
        remote_name: &str,
        arguments: Value,
    ) -> McpConnectorResult<String> {
        let peer = self
            .sessions
            .lock()
            .await
            .iter()
            .find(|session| &session.server_id == server_id)
            .map(|session| session.service.peer().clone())
            .ok_or_else(|| McpConnectorError::NotConnected(server_id.clone()))?;

        let params = CallToolRequestParams {
            meta: None,
            name: remote_name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result: CallToolResult = peer
            .call_tool(params)
            .await
            .map_err(|err| McpConnectorError::protocol(server_id, err))?;

        render_result(remote_name, result)
    }
}

/// Turns a tool result into an observation.
///
/// Structured content, when present, is returned as compact JSON in place of
/// the text blocks, which servers send as a rendering of the same value.
fn render_result(remote_name: &str, result: CallToolResult) -> McpConnectorResult<String> {
    if result.is_error == Some(true) {
        return Err(McpConnectorError::ToolFailed {
            tool_name: remote_name.to_owned(),
            message: extract_text(&result.content),
        });
    }
    Ok(result
        .structured_content
        .map_or_else(|| extract_text(&result.content), |structured| structured.to_string()))
}

/// Converts an `rmcp` tool into a remote [`ToolDefinition`].
fn convert_tool(server_id: &SystemId, tool: &McpTool) -> McpConnectorResult<ToolDefinition> {
    let input_schema =
        serde_json::to_value(&*tool.input_schema).unwrap_or_else(|_| json!({"type": "object"}));

    ToolDefinition::remote(
        server_id.clone(),
        tool.name.to_string(),
        tool.description.as_deref().map(str::to_owned),
        input_schema,
    )
    .map_err(|err| McpConnectorError::protocol(server_id, err))
}

/// Extracts text from MCP content blocks.
fn extract_text(content: &[Content]) -> String {
    content
        .iter()
        .filter_map(|item| match &item.raw {
            RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
