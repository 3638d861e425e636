//! Prompt driver tests covering blank prompts, interrupts, timeouts and
//! failures.

use super::helpers::{
    BASE_TOOLS, HangingChatModel, build_agent, connect_attempts, connector, disconnect_all_calls,
    registry, system_id, terminate_turn,
};
use prospector::agent::adapters::ScriptedChatModel;
use prospector::agent::domain::AgentState;
use prospector::agent::ports::ModelError;
use prospector::agent::services::AgentError;
use prospector::business::domain::BusinessSystemRegistry;
use prospector::business::services::BusinessAgentOptions;
use prospector::driver::{DriverError, PromptOutcome, run_prompt_until};
use prospector::tool_registry::adapters::InMemoryMcpConnector;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
#[tokio::test]
async fn blank_prompts_never_reach_the_agent(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
    #[case] prompt: &str,
) {
    let model = ScriptedChatModel::new([terminate_turn()]);
    let mut agent = build_agent(&connector, model.clone(), registry, BusinessAgentOptions::default());

    let outcome = run_prompt_until(&mut agent, prompt, None, std::future::pending())
        .await
        .expect("blank prompt is not an error");

    assert_eq!(outcome, PromptOutcome::EmptyPrompt);
    assert_eq!(connect_attempts(&connector), 0);
    assert!(model.requests().expect("requests").is_empty());
}

#[rstest]
#[tokio::test]
async fn completed_run_returns_its_summary(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let model = ScriptedChatModel::new([terminate_turn()]);
    let mut agent = build_agent(&connector, model, registry, BusinessAgentOptions::default());

    let outcome = run_prompt_until(
        &mut agent,
        "find fintech leads",
        Some(Duration::from_secs(30)),
        std::future::pending(),
    )
    .await
    .expect("run should succeed");

    let PromptOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run");
    };
    assert!(summary.starts_with("Step 1: Observed output of cmd `terminate` executed:"));
    assert_eq!(disconnect_all_calls(&connector), 1);
}

#[rstest]
#[tokio::test]
async fn slow_runs_time_out_and_clean_up(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = build_agent(
        &connector,
        HangingChatModel,
        registry,
        BusinessAgentOptions::default(),
    );

    let outcome = run_prompt_until(
        &mut agent,
        "research every company on earth",
        Some(Duration::from_millis(50)),
        std::future::pending(),
    )
    .await
    .expect("timeout is not an error");

    assert_eq!(outcome, PromptOutcome::TimedOut);
    assert_eq!(connect_attempts(&connector), 5);
    assert_eq!(disconnect_all_calls(&connector), 1);
    assert!(connector.live_connections().expect("live").is_empty());
    assert_eq!(agent.state(), AgentState::Idle);
}

#[rstest]
#[case::timeout(false, PromptOutcome::TimedOut)]
#[case::interrupt(true, PromptOutcome::Interrupted)]
#[tokio::test]
async fn abandoned_lazy_connect_releases_opened_systems(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
    #[case] interrupted: bool,
    #[case] expected: PromptOutcome,
) {
    connector
        .stall_connections_for(&system_id("perplexity_search"))
        .expect("stall setup should succeed");
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::new([terminate_turn()]),
        registry,
        BusinessAgentOptions::default(),
    );
    let limit = (!interrupted).then_some(Duration::from_millis(50));
    let interrupt = async move {
        if interrupted {
            tokio::time::sleep(Duration::from_millis(50)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    let outcome = run_prompt_until(&mut agent, "find leads", limit, interrupt)
        .await
        .expect("abandoned run is not an error");

    assert_eq!(outcome, expected);
    assert_eq!(connect_attempts(&connector), 4);
    assert_eq!(disconnect_all_calls(&connector), 1);
    assert!(connector.live_connections().expect("live").is_empty());
    assert!(agent.connected_systems().is_empty());
    assert!(!agent.is_initialized());
    assert_eq!(agent.available_tools().names(), BASE_TOOLS);
}

#[rstest]
#[tokio::test]
async fn interrupt_stops_the_run(connector: Arc<InMemoryMcpConnector>, registry: BusinessSystemRegistry) {
    let mut agent = build_agent(
        &connector,
        HangingChatModel,
        registry,
        BusinessAgentOptions::default(),
    );

    let outcome = run_prompt_until(&mut agent, "find leads", None, std::future::ready(()))
        .await
        .expect("interrupt is not an error");

    assert_eq!(outcome, PromptOutcome::Interrupted);
    assert_eq!(agent.state(), AgentState::Idle);
}

#[rstest]
#[tokio::test]
async fn agent_failures_are_returned(
    connector: Arc<InMemoryMcpConnector>,
    registry: BusinessSystemRegistry,
) {
    let mut agent = build_agent(
        &connector,
        ScriptedChatModel::default(),
        registry,
        BusinessAgentOptions::default(),
    );

    let err = run_prompt_until(&mut agent, "find leads", None, std::future::pending())
        .await
        .expect_err("exhausted model should fail the run");

    assert!(matches!(
        err,
        DriverError::Agent(AgentError::Model(ModelError::Exhausted))
    ));
    assert_eq!(disconnect_all_calls(&connector), 1);
}
