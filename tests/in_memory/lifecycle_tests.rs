//! Connection lifecycle tests for the business-intelligence agent.

use super::helpers::{
    BASE_TOOLS, CATALOGS, build_agent, connector, create_agent, disconnect_all_calls, registry, system_id,
};
use prospector::agent::adapters::ScriptedChatModel;
use prospector::business::domain::{BusinessSystemRegistry, ConnectionSpec};
use prospector::business::services::BusinessAgentOptions;
use prospector::tool_registry::adapters::{ConnectorCall, InMemoryMcpConnector};
use prospector::tool_registry::domain::McpTransport;
use rstest::rstest;
use std::sync::Arc;

fn single_entry_registry(id: &str, spec: ConnectionSpec) -> BusinessSystemRegistry {
    BusinessSystemRegistry::new([(system_id(id), spec)]).expect("registry should be valid")
}

#[rstest]
#[tokio::test]
async fn string_entry_connects_over_sse_only(connector: Arc<InMemoryMcpConnector>) {
    let registry = single_entry_registry(
        "n8n_workflows",
        ConnectionSpec::Url("http://localhost:5678/webhook/mcp".to_owned()),
    );
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::default(),
        registry,
        BusinessAgentOptions::default(),
    );

    let report = agent.initialize_business_systems().await;

    assert_eq!(report.connected, vec![system_id("n8n_workflows")]);
    assert_eq!(
        connector.journal().expect("journal"),
        vec![ConnectorCall::ConnectSse {
            url: "http://localhost:5678/webhook/mcp".to_owned(),
            server_id: system_id("n8n_workflows"),
        }]
    );
    assert_eq!(
        agent
            .connected_systems()
            .get(&system_id("n8n_workflows"))
            .map(|system| system.descriptor()),
        Some("http://localhost:5678/webhook/mcp")
    );
}

#[rstest]
#[case(vec!["npx", "@hubspot/mcp-server"], "npx", vec!["@hubspot/mcp-server"])]
#[case(vec!["node"], "node", vec![])]
#[tokio::test]
async fn list_entry_connects_over_stdio(
    connector: Arc<InMemoryMcpConnector>,
    #[case] parts: Vec<&str>,
    #[case] command: &str,
    #[case] args: Vec<&str>,
) {
    let registry = single_entry_registry("hubspot_integration", ConnectionSpec::command(parts));
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::default(),
        registry,
        BusinessAgentOptions::default(),
    );

    agent.initialize_business_systems().await;

    assert_eq!(
        connector.journal().expect("journal"),
        vec![ConnectorCall::ConnectStdio {
            command: command.to_owned(),
            args: args.into_iter().map(str::to_owned).collect(),
            server_id: system_id("hubspot_integration"),
        }]
    );
    assert_eq!(
        agent
            .connected_systems()
            .get(&system_id("hubspot_integration"))
            .map(|system| system.descriptor()),
        Some(command)
    );
}

#[rstest]
#[tokio::test]
async fn failed_connection_is_skipped_and_later_systems_still_tried(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let hubspot = system_id("hubspot_integration");
    connector
        .fail_connections_for(&hubspot)
        .expect("failure should be scripted");
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::default(),
        registry,
        BusinessAgentOptions::default(),
    );

    let report = agent.initialize_business_systems().await;

    assert!(!agent.connected_systems().contains(&hubspot));
    assert_eq!(agent.connected_systems().len(), 4);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed.first().map(|(id, _)| id), Some(&hubspot));
    let attempted: Vec<_> = connector
        .journal()
        .expect("journal")
        .into_iter()
        .filter_map(|call| match call {
            ConnectorCall::ConnectSse { server_id, .. }
            | ConnectorCall::ConnectStdio { server_id, .. } => Some(server_id),
            _ => None,
        })
        .collect();
    let expected: Vec<_> = CATALOGS.iter().map(|(id, _)| system_id(id)).collect();
    assert_eq!(attempted, expected);
    assert!(
        agent
            .available_tools()
            .remote_tools_for(&hubspot)
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn connecting_merges_qualified_tool_names(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;

    assert_eq!(
        agent.available_tools().names(),
        vec![
            "str_replace_editor",
            "terminate",
            "mcp_n8n_workflows_trigger_workflow",
            "mcp_hubspot_integration_create_contact",
            "mcp_hubspot_integration_search_contacts",
            "mcp_zoominfo_connector_enrich_company",
            "mcp_perplexity_search_research",
            "mcp_supabase_db_query",
        ]
    );
}

#[rstest]
#[tokio::test]
async fn disconnecting_one_system_keeps_the_others(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;
    let hubspot = system_id("hubspot_integration");

    agent
        .disconnect_business_system(Some(&hubspot))
        .await
        .expect("disconnect should succeed");

    assert!(agent.available_tools().remote_tools_for(&hubspot).is_empty());
    assert!(!agent.connected_systems().contains(&hubspot));
    for id in ["n8n_workflows", "zoominfo_connector", "perplexity_search", "supabase_db"] {
        assert!(
            !agent
                .available_tools()
                .remote_tools_for(&system_id(id))
                .is_empty(),
            "tools of {id} should remain"
        );
    }
    assert!(agent.available_tools().contains("terminate"));
}

#[rstest]
#[tokio::test]
async fn disconnecting_everything_leaves_base_tools(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;

    agent
        .disconnect_business_system(None)
        .await
        .expect("disconnect should succeed");

    assert_eq!(agent.available_tools().names(), BASE_TOOLS);
    assert!(agent.connected_systems().is_empty());
    assert!(connector.live_connections().expect("live").is_empty());
}

#[rstest]
#[tokio::test]
async fn cleanup_twice_disconnects_once(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;

    agent.cleanup().await.expect("first cleanup should succeed");
    agent.cleanup().await.expect("second cleanup should succeed");

    assert_eq!(disconnect_all_calls(&connector), 1);
    assert!(!agent.is_initialized());
}

#[rstest]
#[tokio::test]
async fn systems_can_be_added_after_startup(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;
    let apollo = system_id("apollo_io");
    connector
        .set_tool_catalog(&apollo, ["find_people"])
        .expect("catalog setup should succeed");
    let transport = McpTransport::stdio("npx", vec!["@apollo/mcp-server".to_owned()])
        .expect("valid transport");

    agent
        .connect_business_system(&apollo, &transport)
        .await
        .expect("connect should succeed");

    assert!(agent.connected_systems().contains(&apollo));
    assert!(agent.available_tools().contains("mcp_apollo_io_find_people"));
}

#[rstest]
#[tokio::test]
async fn reconnecting_a_system_skips_duplicate_tools(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;
    let before = agent.available_tools().len();
    let transport = McpTransport::http_sse("http://localhost:5678/webhook/mcp")
        .expect("valid transport");

    agent
        .connect_business_system(&system_id("n8n_workflows"), &transport)
        .await
        .expect("reconnect should succeed");

    assert_eq!(agent.available_tools().len(), before);
    assert_eq!(agent.connected_systems().len(), 5);
}

#[rstest]
#[tokio::test]
async fn failed_dynamic_connection_leaves_state_untouched(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::default(),
        registry,
        BusinessAgentOptions::default(),
    );
    let db = system_id("supabase_db");
    connector
        .fail_connections_for(&db)
        .expect("failure should be scripted");
    let transport = McpTransport::stdio("npx", vec!["@supabase/mcp-server".to_owned()])
        .expect("valid transport");

    let result = agent.connect_business_system(&db, &transport).await;

    assert!(result.is_err());
    assert!(agent.connected_systems().is_empty());
    assert_eq!(agent.available_tools().names(), BASE_TOOLS);
}

#[rstest]
#[tokio::test]
async fn failed_reconnect_drops_the_stale_system(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = create_agent(&connector, ScriptedChatModel::default(), registry).await;
    let db = system_id("supabase_db");
    connector
        .fail_connections_for(&db)
        .expect("failure should be scripted");
    let transport = McpTransport::stdio("npx", vec!["@supabase/mcp-server".to_owned()])
        .expect("valid transport");

    let result = agent.connect_business_system(&db, &transport).await;

    assert!(result.is_err());
    assert!(!agent.connected_systems().contains(&db));
    assert_eq!(agent.connected_systems().len(), 4);
    assert!(agent.available_tools().remote_tools_for(&db).is_empty());
    assert!(!agent.available_tools().contains("mcp_supabase_db_query"));
    assert!(agent.available_tools().contains("mcp_hubspot_integration_create_contact"));
    assert!(!connector.live_connections().expect("live").contains(&db));
}
