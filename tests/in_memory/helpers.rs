//! Shared fixtures for in-memory agent tests.

use async_trait::async_trait;
use mockable::DefaultClock;
use prospector::agent::adapters::ScriptedChatModel;
use prospector::agent::domain::ToolCall;
use prospector::agent::ports::{AssistantTurn, ChatModel, ModelResult, ToolCompletionRequest};
use prospector::business::domain::BusinessSystemRegistry;
use prospector::business::services::{BusinessAgentOptions, BusinessIntelligenceAgent};
use prospector::tool_registry::adapters::{ConnectorCall, InMemoryMcpConnector};
use prospector::tool_registry::domain::SystemId;
use rstest::fixture;
use std::sync::Arc;

/// Agent under test with a scripted model.
pub type TestAgent<M = ScriptedChatModel> =
    BusinessIntelligenceAgent<InMemoryMcpConnector, M, DefaultClock>;

/// Remote tools advertised by each standard system.
pub const CATALOGS: [(&str, &[&str]); 5] = [
    ("n8n_workflows", &["trigger_workflow"]),
    ("hubspot_integration", &["create_contact", "search_contacts"]),
    ("zoominfo_connector", &["enrich_company"]),
    ("perplexity_search", &["research"]),
    ("supabase_db", &["query"]),
];

/// Chat model that never answers.
#[derive(Debug, Default)]
pub struct HangingChatModel;

#[async_trait]
impl ChatModel for HangingChatModel {
    async fn ask_tool(&self, _request: ToolCompletionRequest) -> ModelResult<AssistantTurn> {
        std::future::pending().await
    }
}

/// Parses a system identifier.
///
/// # Panics
///
/// Panics if `value` is not a valid identifier.
#[must_use]
pub fn system_id(value: &str) -> SystemId {
    SystemId::new(value).expect("valid system id")
}

/// Provides a connector that knows the standard systems' tool catalogs.
///
/// # Panics
///
/// Panics if catalog setup fails.
#[fixture]
pub fn connector() -> Arc<InMemoryMcpConnector> {
    let connector = InMemoryMcpConnector::new();
    for (id, tools) in CATALOGS {
        connector
            .set_tool_catalog(&system_id(id), tools.iter().copied())
            .expect("catalog setup should succeed");
    }
    Arc::new(connector)
}

/// Provides the standard registry.
///
/// # Panics
///
/// Panics if the built-in registry is invalid.
#[fixture]
pub fn registry() -> BusinessSystemRegistry {
    BusinessSystemRegistry::standard().expect("standard registry should be valid")
}

/// Builds an agent without connecting anything.
///
/// # Panics
///
/// Panics if construction fails.
pub fn build_agent<M>(
    connector: &Arc<InMemoryMcpConnector>,
    model: M,
    registry: BusinessSystemRegistry,
    options: BusinessAgentOptions,
) -> TestAgent<M>
where
    M: ChatModel + 'static,
{
    BusinessIntelligenceAgent::new(
        Arc::clone(connector),
        Arc::new(model),
        Arc::new(DefaultClock),
        registry,
        options,
    )
    .expect("agent construction should succeed")
}

/// Builds an agent and connects every registered system.
///
/// # Panics
///
/// Panics if construction fails.
pub async fn create_agent<M>(
    connector: &Arc<InMemoryMcpConnector>,
    model: M,
    registry: BusinessSystemRegistry,
) -> TestAgent<M>
where
    M: ChatModel + 'static,
{
    BusinessIntelligenceAgent::create(
        Arc::clone(connector),
        Arc::new(model),
        Arc::new(DefaultClock),
        registry,
        BusinessAgentOptions::default(),
    )
    .await
    .expect("agent creation should succeed")
}

/// Tool names offered before any business system connects.
pub const BASE_TOOLS: [&str; 2] = ["str_replace_editor", "terminate"];

/// Turn that ends the run successfully.
#[must_use]
pub fn terminate_turn() -> AssistantTurn {
    AssistantTurn::calls(vec![ToolCall::new(
        "call_terminate",
        "terminate",
        r#"{"status":"success"}"#,
    )])
}

/// Counts journaled connection attempts.
///
/// # Panics
///
/// Panics if the journal cannot be read.
#[must_use]
pub fn connect_attempts(connector: &InMemoryMcpConnector) -> usize {
    connector
        .journal()
        .expect("journal should be readable")
        .iter()
        .filter(|call| {
            matches!(
                call,
                ConnectorCall::ConnectSse { .. } | ConnectorCall::ConnectStdio { .. }
            )
        })
        .count()
}

/// Counts journaled disconnect-all calls.
///
/// # Panics
///
/// Panics if the journal cannot be read.
#[must_use]
pub fn disconnect_all_calls(connector: &InMemoryMcpConnector) -> usize {
    connector
        .journal()
        .expect("journal should be readable")
        .iter()
        .filter(|call| matches!(call, ConnectorCall::Disconnect(None)))
        .count()
}
