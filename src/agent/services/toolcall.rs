//! Agent that acts by calling tools chosen by the chat model.

use super::builtin::{LocalTools, TERMINATE_TOOL_NAME};
use super::react::{AgentCore, AgentError, AgentResult, ReActAgent};
use crate::agent::domain::{AgentState, ChatMessage, ToolCall, ToolChoice};
use crate::agent::ports::{ChatModel, ToolCompletionRequest, ToolDispatcher};
use crate::tool_registry::domain::ToolCollection;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply used by act when there is nothing to execute or report.
pub const NO_CONTENT: &str = "No content or commands to execute";

/// Tool-calling agent over a chat model and a dispatcher for remote tools.
pub struct ToolCallAgent<M, D>
where
    M: ChatModel,
    D: ToolDispatcher,
{
    core: AgentCore,
    model: Arc<M>,
    dispatcher: Arc<D>,
    available_tools: ToolCollection,
    local_tools: LocalTools,
    special_tool_names: Vec<String>,
    tool_choice: ToolChoice,
    max_observe: Option<usize>,
    pending_calls: Vec<ToolCall>,
}

impl<M, D> ToolCallAgent<M, D>
where
    M: ChatModel,
    D: ToolDispatcher,
{
    /// Creates an agent offering `tools` to `model`.
    ///
    /// `terminate` is the only special tool until
    /// [`ToolCallAgent::with_special_tools`] says otherwise.
    #[must_use]
    pub fn new(core: AgentCore, model: Arc<M>, dispatcher: Arc<D>, tools: ToolCollection) -> Self {
        Self {
            core,
            model,
            dispatcher,
            available_tools: tools,
            local_tools: LocalTools::new(),
            special_tool_names: vec![TERMINATE_TOOL_NAME.to_owned()],
            tool_choice: ToolChoice::default(),
            max_observe: None,
            pending_calls: Vec::new(),
        }
    }

    /// Sets the tool-choice policy.
    #[must_use]
    pub const fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }

    /// Replaces the in-process implementations behind local tools.
    #[must_use]
    pub fn with_local_tools(mut self, local_tools: LocalTools) -> Self {
        self.local_tools = local_tools;
        self
    }

    /// Replaces the names of tools that finish the run.
    #[must_use]
    pub fn with_special_tools(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.special_tool_names = names.into_iter().collect();
        self
    }

    /// Caps every observation at `max_observe` characters.
    #[must_use]
    pub const fn with_max_observe(mut self, max_observe: usize) -> Self {
        self.max_observe = Some(max_observe);
        self
    }

    /// Returns the tools offered to the model.
    #[must_use]
    pub const fn available_tools(&self) -> &ToolCollection {
        &self.available_tools
    }

    /// Returns the tools offered to the model mutably.
    pub const fn available_tools_mut(&mut self) -> &mut ToolCollection {
        &mut self.available_tools
    }

    /// Replaces the tools offered to the model.
    pub fn set_available_tools(&mut self, tools: ToolCollection) {
        self.available_tools = tools;
    }

    /// Returns the tool calls waiting for the next act.
    #[must_use]
    pub fn pending_calls(&self) -> &[ToolCall] {
        &self.pending_calls
    }

    fn is_special_tool(&self, name: &str) -> bool {
        self.special_tool_names
            .iter()
            .any(|special| special.eq_ignore_ascii_case(name))
    }

    async fn execute_tool(&mut self, call: &ToolCall) -> String {
        let name = call.function.name.as_str();
        let Some(tool) = self.available_tools.get(name).cloned() else {
            return format!("Error: Unknown tool '{name}'");
        };

        let raw_arguments = call.function.arguments.trim();
        let parsed = if raw_arguments.is_empty() {
            Ok(Value::Object(serde_json::Map::new()))
        } else {
            serde_json::from_str::<Value>(raw_arguments)
        };
        let arguments = match parsed {
            Ok(value) => value,
            Err(err) => {
                warn!(tool = name, error = %err, "invalid tool arguments");
                return format!("Error: Failed to parse arguments for {name}: {err}");
            }
        };

        debug!(tool = name, local = tool.is_local(), "dispatching tool call");
        let output = if tool.is_local() {
            self.local_tools.execute(name, &arguments)
        } else {
            self.dispatcher
                .dispatch(&tool, arguments)
                .await
                .map_err(|err| err.to_string())
        };

        match output {
            Ok(text) => {
                if self.is_special_tool(name) {
                    info!(tool = name, "special tool has completed the task");
                    self.core.set_state(AgentState::Finished);
                }
                if text.is_empty() {
                    format!("Cmd `{name}` completed with no output")
                } else {
                    format!("Observed output of cmd `{name}` executed:\n{text}")
                }
            }
            Err(reason) => {
                warn!(tool = name, %reason, "tool call failed");
                format!("Error: {reason}")
            }
        }
    }

    fn truncate_observation(&self, observation: String) -> String {
        match self.max_observe {
            Some(limit) if observation.chars().count() > limit => {
                observation.chars().take(limit).collect()
            }
            _ => observation,
        }
    }
}

#[async_trait]
impl<M, D> ReActAgent for ToolCallAgent<M, D>
where
    M: ChatModel + 'static,
    D: ToolDispatcher + 'static,
{
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn think(&mut self) -> AgentResult<bool> {
        if let Some(prompt) = self.core.next_step_prompt().map(str::to_owned) {
            self.core.push_message(ChatMessage::user(prompt));
        }

        let request = ToolCompletionRequest {
            system_messages: self
                .core
                .system_prompt()
                .map(ChatMessage::system)
                .into_iter()
                .collect(),
            messages: self.core.memory().to_vec(),
            tools: self.available_tools.to_vec(),
            tool_choice: self.tool_choice,
        };
        let turn = self.model.ask_tool(request).await?;

        debug!(
            agent = self.core.name(),
            content = turn.content.as_deref().unwrap_or_default(),
            tool_calls = turn.tool_calls.len(),
            "model turn received"
        );

        let has_content = turn.content.is_some();
        if self.tool_choice == ToolChoice::None {
            if !turn.tool_calls.is_empty() {
                warn!(agent = self.core.name(), "model requested tools while tool choice is none");
            }
            self.pending_calls.clear();
            if let Some(content) = turn.content {
                self.core.push_message(ChatMessage::assistant(content));
            }
            return Ok(has_content);
        }

        self.pending_calls.clone_from(&turn.tool_calls);
        if turn.tool_calls.is_empty() {
            if let Some(content) = turn.content {
                self.core.push_message(ChatMessage::assistant(content));
            }
        } else {
            self.core.push_message(ChatMessage::assistant_with_tool_calls(
                turn.content,
                turn.tool_calls,
            ));
        }

        if self.pending_calls.is_empty() {
            return Ok(self.tool_choice == ToolChoice::Required || has_content);
        }
        Ok(true)
    }

    async fn act(&mut self) -> AgentResult<String> {
        if self.pending_calls.is_empty() {
            if self.tool_choice == ToolChoice::Required {
                return Err(AgentError::ToolCallRequired);
            }
            return Ok(self
                .core
                .memory()
                .last()
                .and_then(ChatMessage::content)
                .unwrap_or(NO_CONTENT)
                .to_owned());
        }

        let calls = std::mem::take(&mut self.pending_calls);
        let mut observations = Vec::with_capacity(calls.len());
        for call in &calls {
            let raw_observation = self.execute_tool(call).await;
            let observation = self.truncate_observation(raw_observation);
            debug!(tool = %call.function.name, "tool call completed");
            self.core.push_message(ChatMessage::tool(
                observation.clone(),
                call.function.name.clone(),
                call.id.clone(),
            ));
            observations.push(observation);
        }
        Ok(observations.join("\n\n"))
    }
}
