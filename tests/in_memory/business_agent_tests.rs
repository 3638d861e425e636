//! Run-level tests for the business-intelligence agent over in-memory
//! connections.

use super::helpers::{
    BASE_TOOLS, build_agent, connect_attempts, connector, disconnect_all_calls, registry, system_id,
    terminate_turn,
};
use camino::Utf8PathBuf;
use prospector::agent::adapters::ScriptedChatModel;
use prospector::agent::domain::{AgentState, Role, ToolCall};
use prospector::agent::ports::{AssistantTurn, ModelError};
use prospector::agent::services::{AgentError, ReActAgent};
use prospector::business::domain::BusinessSystemRegistry;
use prospector::business::services::BusinessAgentOptions;
use prospector::tool_registry::adapters::{ConnectorCall, InMemoryMcpConnector};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

fn create_contact_turn() -> AssistantTurn {
    AssistantTurn::calls(vec![ToolCall::new(
        "call_contact",
        "mcp_hubspot_integration_create_contact",
        r#"{"email":"ada@example.com"}"#,
    )])
}

#[rstest]
#[tokio::test]
async fn first_think_connects_lazily_and_run_cleans_up(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let model = ScriptedChatModel::new([terminate_turn()]);
    let mut agent = build_agent(&connector, model.clone(), registry, BusinessAgentOptions::default());
    assert_eq!(connect_attempts(&connector), 0);

    let output = agent
        .run(Some("find fintech leads".to_owned()))
        .await
        .expect("run should succeed");

    assert_eq!(
        output,
        "Step 1: Observed output of cmd `terminate` executed:\n\
         The interaction has been completed with status: success"
    );
    assert_eq!(connect_attempts(&connector), 5);
    assert_eq!(disconnect_all_calls(&connector), 1);
    assert!(!agent.is_initialized());
    assert!(agent.connected_systems().is_empty());
    assert_eq!(agent.available_tools().names(), BASE_TOOLS);
    assert_eq!(agent.state(), AgentState::Idle);
}

#[rstest]
#[tokio::test]
async fn first_request_offers_every_remote_tool(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let model = ScriptedChatModel::new([terminate_turn()]);
    let mut agent = build_agent(&connector, model.clone(), registry, BusinessAgentOptions::default());

    agent
        .run(Some("enrich acme.io".to_owned()))
        .await
        .expect("run should succeed");

    let requests = model.requests().expect("requests");
    let first = requests.first().expect("one request");
    let names: Vec<_> = first.tools.iter().map(|tool| tool.name()).collect();
    assert!(names.contains(&"mcp_hubspot_integration_create_contact"));
    assert!(names.contains(&"mcp_supabase_db_query"));
    assert!(names.contains(&"terminate"));
    assert!(names.contains(&"str_replace_editor"));
    assert_eq!(names.len(), 8);
    assert!(
        first
            .system_messages
            .first()
            .and_then(|message| message.content())
            .is_some_and(|prompt| prompt.contains("Working directory: workspace"))
    );
    assert_eq!(
        first.messages.first().and_then(|message| message.content()),
        Some("enrich acme.io")
    );
    assert_eq!(first.messages.last().map(|message| message.role()), Some(Role::User));
}

#[rstest]
#[tokio::test]
async fn remote_tool_calls_reach_their_system(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let hubspot = system_id("hubspot_integration");
    connector
        .set_tool_output(&hubspot, "create_contact", Ok("contact 42 created".to_owned()))
        .expect("output setup should succeed");
    let model = ScriptedChatModel::new([create_contact_turn(), terminate_turn()]);
    let mut agent = build_agent(&connector, model.clone(), registry, BusinessAgentOptions::default());

    let output = agent
        .run(Some("add ada to the CRM".to_owned()))
        .await
        .expect("run should succeed");

    assert!(output.starts_with(
        "Step 1: Observed output of cmd `mcp_hubspot_integration_create_contact` executed:\n\
         contact 42 created\n"
    ));
    assert!(output.contains("Step 2: Observed output of cmd `terminate` executed:"));
    let journal = connector.journal().expect("journal");
    assert!(journal.contains(&ConnectorCall::CallTool {
        server_id: hubspot,
        tool_name: "create_contact".to_owned(),
        arguments: json!({"email": "ada@example.com"}),
    }));

    let second = model.requests().expect("requests").into_iter().nth(1).expect("second request");
    let observation = second
        .messages
        .iter()
        .find(|message| message.role() == Role::Tool)
        .expect("tool observation in memory");
    assert_eq!(observation.tool_call_id(), Some("call_contact"));
    assert_eq!(observation.name(), Some("mcp_hubspot_integration_create_contact"));
}

#[rstest]
#[tokio::test]
async fn editor_calls_write_inside_the_workspace(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let dir = tempfile::tempdir().expect("temp dir");
    let workspace_root =
        Utf8PathBuf::from_path_buf(dir.path().join("workspace")).expect("utf-8 path");
    let draft = AssistantTurn::calls(vec![ToolCall::new(
        "call_draft",
        "str_replace_editor",
        r##"{"command":"create","path":"leads.md","file_text":"# Leads\n- acme.io\n"}"##,
    )]);
    let model = ScriptedChatModel::new([draft, terminate_turn()]);
    let options = BusinessAgentOptions {
        workspace_root: workspace_root.clone(),
        ..BusinessAgentOptions::default()
    };
    let mut agent = build_agent(&connector, model, registry, options);

    let output = agent
        .run(Some("draft a lead list".to_owned()))
        .await
        .expect("run should succeed");

    assert!(output.starts_with(
        "Step 1: Observed output of cmd `str_replace_editor` executed:\n\
         File created successfully at: leads.md\n"
    ));
    assert_eq!(
        std::fs::read_to_string(workspace_root.join("leads.md")).expect("written file"),
        "# Leads\n- acme.io\n"
    );
    let calls = connector.journal().expect("journal");
    assert!(!calls.iter().any(|call| matches!(call, ConnectorCall::CallTool { .. })));
}

#[rstest]
#[tokio::test]
async fn failing_remote_tool_is_reported_as_an_observation(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    connector
        .set_tool_output(
            &system_id("hubspot_integration"),
            "create_contact",
            Err("duplicate email".to_owned()),
        )
        .expect("output setup should succeed");
    let model = ScriptedChatModel::new([create_contact_turn(), terminate_turn()]);
    let mut agent = build_agent(&connector, model, registry, BusinessAgentOptions::default());

    let output = agent
        .run(Some("add ada to the CRM".to_owned()))
        .await
        .expect("run should succeed");

    assert!(output.starts_with(
        "Step 1: Error: MCP tool 'create_contact' failed: duplicate email\n"
    ));
}

#[rstest]
#[tokio::test]
async fn step_limit_is_reported(connector: Arc<InMemoryMcpConnector>, registry: BusinessSystemRegistry) {
    let model = ScriptedChatModel::new([
        AssistantTurn::text("Looking into it."),
        AssistantTurn::text("Still looking."),
    ]);
    let options = BusinessAgentOptions {
        max_steps: 2,
        ..BusinessAgentOptions::default()
    };
    let mut agent = build_agent(&connector, model, registry, options);

    let output = agent
        .run(Some("research competitors".to_owned()))
        .await
        .expect("run should succeed");

    assert_eq!(
        output,
        "Step 1: Looking into it.\nStep 2: Still looking.\nTerminated: Reached max steps (2)"
    );
    assert_eq!(agent.state(), AgentState::Idle);
    assert_eq!(disconnect_all_calls(&connector), 1);
}

#[rstest]
#[tokio::test]
async fn model_failure_still_cleans_up(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::default(),
        registry,
        BusinessAgentOptions::default(),
    );

    let err = agent
        .run(Some("find leads".to_owned()))
        .await
        .expect_err("run should fail");

    assert!(matches!(err, AgentError::Model(ModelError::Exhausted)));
    assert_eq!(disconnect_all_calls(&connector), 1);
    assert!(connector.live_connections().expect("live").is_empty());
    assert_eq!(agent.state(), AgentState::Idle);
}

#[rstest]
#[tokio::test]
async fn agent_can_run_again_after_cleanup(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let model = ScriptedChatModel::new([terminate_turn(), terminate_turn()]);
    let mut agent = build_agent(&connector, model, registry, BusinessAgentOptions::default());

    agent.run(Some("first".to_owned())).await.expect("first run");
    agent.run(Some("second".to_owned())).await.expect("second run");

    assert_eq!(connect_attempts(&connector), 10);
    assert_eq!(disconnect_all_calls(&connector), 2);
}
