//! Business-intelligence agent: a tool-calling agent whose tool collection
//! follows the set of connected business systems.

use super::dispatch::ConnectorToolDispatcher;
use crate::agent::domain::{AgentState, ChatMessage};
use crate::agent::ports::ChatModel;
use crate::agent::services::{
    AgentCore, AgentError, AgentResult, ReActAgent, StrReplaceEditor, ToolCallAgent, builtin,
    run_steps,
};
use crate::agent::services::builtin::LocalTools;
use crate::business::domain::{BusinessDomainError, BusinessSystemRegistry, ConnectedSystems};
use crate::business::prompt::{NEXT_STEP_PROMPT, render_system_prompt};
use crate::tool_registry::domain::{
    McpTransport, SystemId, ToolCollection, ToolRegistryDomainError,
};
use crate::tool_registry::ports::{McpConnector, McpConnectorError};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Agent name reported in logs.
pub const AGENT_NAME: &str = "BusinessIntelligence";

const AGENT_DESCRIPTION: &str = "A specialized agent for business intelligence, lead generation, \
prospect research, and CRM operations";

/// Errors raised by the business-intelligence agent.
#[derive(Debug, Error)]
pub enum BusinessAgentError {
    /// Registry validation failed.
    #[error(transparent)]
    Domain(#[from] BusinessDomainError),
    /// A tool or transport definition failed validation.
    #[error(transparent)]
    ToolRegistry(#[from] ToolRegistryDomainError),
    /// The connector failed.
    #[error(transparent)]
    Connector(#[from] McpConnectorError),
    /// The system prompt failed to render.
    #[error("failed to render system prompt: {0}")]
    Prompt(#[from] minijinja::Error),
    /// The agent runtime failed.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Result type for business agent operations.
pub type BusinessAgentResult<T> = Result<T, BusinessAgentError>;

/// Tunables for [`BusinessIntelligenceAgent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessAgentOptions {
    /// Working directory named in the system prompt and the file editor's
    /// root.
    pub workspace_root: Utf8PathBuf,
    /// Step limit per run.
    pub max_steps: usize,
    /// Observation length cap in characters.
    pub max_observe: usize,
}

impl Default for BusinessAgentOptions {
    fn default() -> Self {
        Self {
            workspace_root: Utf8PathBuf::from("workspace"),
            max_steps: 15,
            max_observe: 8000,
        }
    }
}

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializationReport {
    /// Systems connected, in registry order.
    pub connected: Vec<SystemId>,
    /// Systems that failed, with the reason, in registry order.
    pub failed: Vec<(SystemId, String)>,
}

/// Tool-calling agent wired to the business systems in a registry.
///
/// Each registry entry is connected through `C`, and the tools it exposes
/// are merged into the agent's collection. Disconnecting rebuilds the
/// collection from the base tools plus whatever the connector still reports
/// as live.
pub struct BusinessIntelligenceAgent<C, M, K>
where
    C: McpConnector + 'static,
    M: ChatModel + 'static,
    K: Clock + Send + Sync,
{
    inner: ToolCallAgent<M, ConnectorToolDispatcher<C>>,
    connector: Arc<C>,
    clock: Arc<K>,
    registry: BusinessSystemRegistry,
    connected_systems: ConnectedSystems,
    initialized: bool,
}

impl<C, M, K> BusinessIntelligenceAgent<C, M, K>
where
    C: McpConnector + 'static,
    M: ChatModel + 'static,
    K: Clock + Send + Sync,
{
    /// Builds an agent with no connections.
    ///
    /// The base tools are a file editor confined to
    /// [`BusinessAgentOptions::workspace_root`] and `terminate`, which ends
    /// a run.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessAgentError`] when the system prompt fails to render
    /// or the base tools fail validation.
    pub fn new(
        connector: Arc<C>,
        model: Arc<M>,
        clock: Arc<K>,
        registry: BusinessSystemRegistry,
        options: BusinessAgentOptions,
    ) -> BusinessAgentResult<Self> {
        let core = AgentCore::new(AGENT_NAME)
            .with_description(AGENT_DESCRIPTION)
            .with_system_prompt(render_system_prompt(options.workspace_root.as_str())?)
            .with_next_step_prompt(NEXT_STEP_PROMPT)
            .with_max_steps(options.max_steps);
        let local_tools = LocalTools::new()
            .with_editor(StrReplaceEditor::new(options.workspace_root.clone()));
        let tools = ToolCollection::new(local_tools.definitions()?);
        let dispatcher = Arc::new(ConnectorToolDispatcher::new(Arc::clone(&connector)));
        let inner = ToolCallAgent::new(core, model, dispatcher, tools)
            .with_local_tools(local_tools)
            .with_special_tools([builtin::TERMINATE_TOOL_NAME.to_owned()])
            .with_max_observe(options.max_observe);

        Ok(Self {
            inner,
            connector,
            clock,
            registry,
            connected_systems: ConnectedSystems::default(),
            initialized: false,
        })
    }

    /// Builds an agent and connects every registered system.
    ///
    /// # Errors
    ///
    /// Returns the construction errors of [`BusinessIntelligenceAgent::new`].
    /// Connection failures are logged, never returned.
    pub async fn create(
        connector: Arc<C>,
        model: Arc<M>,
        clock: Arc<K>,
        registry: BusinessSystemRegistry,
        options: BusinessAgentOptions,
    ) -> BusinessAgentResult<Self> {
        let mut agent = Self::new(connector, model, clock, registry, options)?;
        agent.initialized = true;
        agent.initialize_business_systems().await;
        Ok(agent)
    }

    /// Attempts one connection per registered system, in registry order.
    ///
    /// Failures are logged and the pass moves on; nothing is retried.
    pub async fn initialize_business_systems(&mut self) -> InitializationReport {
        let mut report = InitializationReport::default();
        let entries: Vec<_> = self
            .registry
            .iter()
            .map(|(id, spec)| (id.clone(), spec.to_transport(id)))
            .collect();

        for (system_id, transport) in entries {
            let outcome = match transport {
                Ok(transport) => self.connect_business_system(&system_id, &transport).await,
                Err(err) => Err(err.into()),
            };
            match outcome {
                Ok(()) => report.connected.push(system_id),
                Err(err) => {
                    error!("Failed to connect to business system {system_id}: {err}");
                    report.failed.push((system_id, err.to_string()));
                }
            }
        }
        report
    }

    /// Connects `system_id` and merges the tools it exposes.
    ///
    /// Tools whose names are already taken are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessAgentError::Connector`] when the connection or the
    /// tool listing fails. The connector drops any earlier session for
    /// `system_id` before it connects, so after a failure the system is
    /// forgotten along with its tools.
    pub async fn connect_business_system(
        &mut self,
        system_id: &SystemId,
        transport: &McpTransport,
    ) -> BusinessAgentResult<()> {
        if let Err(err) = self.connector.connect(system_id, transport).await {
            if self.connected_systems.remove(system_id).is_some() {
                warn!(system = %system_id, "dropping business system after failed reconnect");
                if let Err(rebuild_err) = self.rebuild_tools().await {
                    error!(error = %rebuild_err, "failed to refresh tools after failed reconnect");
                }
            }
            return Err(err.into());
        }
        self.connected_systems
            .record(system_id.clone(), transport.descriptor(), &*self.clock);
        match transport {
            McpTransport::HttpSse(config) => {
                info!("Connected to {system_id} via SSE at {}", config.base_url());
            }
            McpTransport::Stdio(_) => {
                info!("Connected to {system_id} via stdio: {}", transport.display_line());
            }
        }

        let new_tools = self
            .connector
            .tools()
            .await?
            .into_iter()
            .filter(|tool| tool.server_id() == Some(system_id));
        for name in self.inner.available_tools_mut().add_tools(new_tools) {
            warn!(system = %system_id, tool = %name, "skipping duplicate tool");
        }
        Ok(())
    }

    /// Disconnects `system_id`, or every system when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessAgentError::Connector`] when teardown or the tool
    /// listing fails.
    pub async fn disconnect_business_system(
        &mut self,
        system_id: Option<&SystemId>,
    ) -> BusinessAgentResult<()> {
        self.connector.disconnect(system_id).await?;
        match system_id {
            Some(id) => {
                self.connected_systems.remove(id);
                info!(system = %id, "disconnected business system");
            }
            None => {
                self.connected_systems.clear();
                info!("disconnected all business systems");
            }
        }

        self.rebuild_tools().await
    }

    /// Replaces the collection with the base tools plus the connector's
    /// live tools.
    async fn rebuild_tools(&mut self) -> BusinessAgentResult<()> {
        let mut tools = self.inner.available_tools().clone();
        tools.retain_local();
        tools.add_tools(self.connector.tools().await?);
        self.inner.set_available_tools(tools);
        Ok(())
    }

    /// Disconnects everything once per initialized lifetime.
    ///
    /// A lifetime starts when a connection pass begins, so a pass that was
    /// abandoned part-way is still torn down.
    ///
    /// # Errors
    ///
    /// Returns the error of the disconnect pass. The agent counts as cleaned
    /// up even then, so later calls are no-ops.
    pub async fn cleanup(&mut self) -> BusinessAgentResult<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        self.disconnect_business_system(None).await
    }

    /// Returns the connected-systems map.
    #[must_use]
    pub const fn connected_systems(&self) -> &ConnectedSystems {
        &self.connected_systems
    }

    /// Returns the tools offered to the model.
    #[must_use]
    pub const fn available_tools(&self) -> &ToolCollection {
        self.inner.available_tools()
    }

    /// Returns the registry this agent connects from.
    #[must_use]
    pub const fn registry(&self) -> &BusinessSystemRegistry {
        &self.registry
    }

    /// Returns whether the registry has been connected and not yet cleaned
    /// up.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the execution state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.inner.core().state()
    }

    /// Returns the conversation memory.
    #[must_use]
    pub fn memory(&self) -> &[ChatMessage] {
        self.inner.core().memory()
    }
}

#[async_trait]
impl<C, M, K> ReActAgent for BusinessIntelligenceAgent<C, M, K>
where
    C: McpConnector + 'static,
    M: ChatModel + 'static,
    K: Clock + Send + Sync + 'static,
{
    fn core(&self) -> &AgentCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        self.inner.core_mut()
    }

    async fn think(&mut self) -> AgentResult<bool> {
        if !self.initialized {
            // Set first so an abandoned pass is still cleaned up.
            self.initialized = true;
            self.initialize_business_systems().await;
        }
        self.inner.think().await
    }

    async fn act(&mut self) -> AgentResult<String> {
        self.inner.act().await
    }

    async fn run(&mut self, request: Option<String>) -> AgentResult<String> {
        let outcome = run_steps(self, request).await;
        let cleanup = self.cleanup().await;
        match (outcome, cleanup) {
            (Ok(output), Ok(())) => Ok(output),
            (Ok(_), Err(err)) => Err(AgentError::runtime(err)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(cleanup_err)) => {
                error!(error = %cleanup_err, "cleanup after failed run also failed");
                Err(err)
            }
        }
    }
}
