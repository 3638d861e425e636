//! Think/act agent loop.

use crate::agent::domain::{AgentState, ChatMessage};
use crate::agent::ports::ModelError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Default number of steps before a run is cut off.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Maximum number of messages kept in memory; the oldest are dropped first.
pub const MAX_MEMORY_MESSAGES: usize = 100;

/// Result returned when thinking decides no action is needed.
pub const NO_ACTION_NEEDED: &str = "Thinking complete - no action needed";

/// Errors raised by the agent runtime.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// A run was requested while the agent was busy or not reset.
    #[error("cannot run agent from state: {0}")]
    NotIdle(AgentState),

    /// The chat model failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Tool choice is `required` and the model called no tool.
    #[error("tool calls required but none provided")]
    ToolCallRequired,

    /// A collaborator of the agent failed.
    #[error("agent runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentError {
    /// Wraps a collaborator failure.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Identity, prompts, memory, and step bookkeeping shared by all agents.
#[derive(Debug, Clone)]
pub struct AgentCore {
    name: String,
    description: Option<String>,
    system_prompt: Option<String>,
    next_step_prompt: Option<String>,
    memory: Vec<ChatMessage>,
    state: AgentState,
    max_steps: usize,
    current_step: usize,
}

impl AgentCore {
    /// Creates an idle agent core with empty memory.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            system_prompt: None,
            next_step_prompt: None,
            memory: Vec::new(),
            state: AgentState::Idle,
            max_steps: DEFAULT_MAX_STEPS,
            current_step: 0,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the prompt appended before every think.
    #[must_use]
    pub fn with_next_step_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.next_step_prompt = Some(prompt.into());
        self
    }

    /// Sets the step limit.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Returns the agent name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Returns the next-step prompt.
    #[must_use]
    pub fn next_step_prompt(&self) -> Option<&str> {
        self.next_step_prompt.as_deref()
    }

    /// Returns the conversation memory, oldest first.
    #[must_use]
    pub fn memory(&self) -> &[ChatMessage] {
        &self.memory
    }

    /// Appends a message, evicting the oldest once the cap is reached.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.memory.push(message);
        if self.memory.len() > MAX_MEMORY_MESSAGES {
            let excess = self.memory.len() - MAX_MEMORY_MESSAGES;
            self.memory.drain(..excess);
        }
    }

    /// Returns the execution state.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Sets the execution state.
    pub const fn set_state(&mut self, state: AgentState) {
        self.state = state;
    }

    /// Returns the step limit.
    #[must_use]
    pub const fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the number of steps taken in the current run.
    #[must_use]
    pub const fn current_step(&self) -> usize {
        self.current_step
    }

    const fn begin_step(&mut self) -> usize {
        self.current_step += 1;
        self.current_step
    }

    const fn step_limit_reached(&self) -> bool {
        self.current_step >= self.max_steps
    }

    /// Clears the step counter and returns the agent to idle.
    ///
    /// Needed when a run is abandoned before its loop could reset itself.
    pub const fn reset(&mut self) {
        self.current_step = 0;
        self.state = AgentState::Idle;
    }
}

/// An agent that alternates between deciding (think) and doing (act).
#[async_trait]
pub trait ReActAgent: Send {
    /// Returns the shared agent core.
    fn core(&self) -> &AgentCore;

    /// Returns the shared agent core mutably.
    fn core_mut(&mut self) -> &mut AgentCore;

    /// Decides the next action; returns whether [`ReActAgent::act`] should
    /// run.
    async fn think(&mut self) -> AgentResult<bool>;

    /// Executes the action chosen by the last think.
    async fn act(&mut self) -> AgentResult<String>;

    /// Runs one think/act cycle.
    async fn step(&mut self) -> AgentResult<String> {
        if !self.think().await? {
            return Ok(NO_ACTION_NEEDED.to_owned());
        }
        self.act().await
    }

    /// Runs the agent on `request` until it finishes or hits its step limit.
    async fn run(&mut self, request: Option<String>) -> AgentResult<String> {
        run_steps(self, request).await
    }
}

/// Drives `agent` through its step loop.
///
/// The agent must be idle. Each step result is reported as a
/// `Step {n}: {result}` line. Whatever the outcome, the agent is returned to
/// idle with its step counter cleared.
///
/// # Errors
///
/// Returns [`AgentError::NotIdle`] when the agent is not idle, or the first
/// error raised by a step.
pub async fn run_steps<A>(agent: &mut A, request: Option<String>) -> AgentResult<String>
where
    A: ReActAgent + ?Sized,
{
    let state = agent.core().state();
    if state != AgentState::Idle {
        return Err(AgentError::NotIdle(state));
    }

    if let Some(text) = request {
        agent.core_mut().push_message(ChatMessage::user(text));
    }

    agent.core_mut().set_state(AgentState::Running);
    let mut results = Vec::new();
    let outcome = loop {
        let core = agent.core();
        if core.step_limit_reached() || core.state() == AgentState::Finished {
            break Ok(());
        }

        let step = agent.core_mut().begin_step();
        info!(agent = agent.core().name(), step, max_steps = agent.core().max_steps(), "executing step");
        match agent.step().await {
            Ok(result) => results.push(format!("Step {step}: {result}")),
            Err(err) => {
                agent.core_mut().set_state(AgentState::Error);
                break Err(err);
            }
        }
    };

    let core = agent.core();
    if outcome.is_ok() && core.step_limit_reached() && core.state() != AgentState::Finished {
        let max_steps = core.max_steps();
        warn!(agent = core.name(), max_steps, "run reached step limit");
        results.push(format!("Terminated: Reached max steps ({max_steps})"));
    }
    agent.core_mut().reset();
    outcome?;

    if results.is_empty() {
        return Ok("No steps executed".to_owned());
    }
    Ok(results.join("\n"))
}
