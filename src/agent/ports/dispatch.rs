//! Dispatch port for tools that do not run in-process.

use crate::tool_registry::domain::ToolDefinition;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Result type for tool dispatch.
pub type ToolDispatchResult<T> = Result<T, ToolDispatchError>;

/// Executes non-local tools on behalf of the agent runtime.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Runs `tool` with parsed `arguments` and returns its textual output.
    async fn dispatch(&self, tool: &ToolDefinition, arguments: Value) -> ToolDispatchResult<String>;
}

/// Errors returned by tool dispatchers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolDispatchError {
    /// The dispatcher cannot run tools of this origin.
    #[error("tool '{0}' cannot be dispatched")]
    Unsupported(String),

    /// The tool ran and failed.
    #[error("{0}")]
    Failed(String),
}
