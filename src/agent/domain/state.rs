//! Execution state and tool-choice policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution state of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Ready to accept a run.
    #[default]
    Idle,
    /// Executing steps.
    Running,
    /// A special tool ended the run.
    Finished,
    /// A step failed.
    Error,
}

impl AgentState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Whether the model may, must, or must not call tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Tools are never called.
    None,
    /// The model decides.
    #[default]
    Auto,
    /// Every turn must call at least one tool.
    Required,
}

impl ToolChoice {
    /// Returns the chat-completions wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Auto => "auto",
            Self::Required => "required",
        }
    }
}
