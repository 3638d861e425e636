//! Chat model port.

use crate::agent::domain::{ChatMessage, ToolCall, ToolChoice};
use crate::tool_registry::domain::ToolDefinition;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for chat model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// A single tool-enabled completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCompletionRequest {
    /// System messages sent ahead of the conversation.
    pub system_messages: Vec<ChatMessage>,
    /// Conversation memory.
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,
    /// Tool-choice policy.
    pub tool_choice: ToolChoice,
}

/// The model's reply to a [`ToolCompletionRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantTurn {
    /// Text content, if any.
    pub content: Option<String>,
    /// Requested tool calls, in order.
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    /// Creates a text-only turn.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a turn requesting tool calls.
    #[must_use]
    pub const fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

/// Language model able to answer with tool calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Asks the model for the next turn.
    async fn ask_tool(&self, request: ToolCompletionRequest) -> ModelResult<AssistantTurn>;
}

/// Errors returned by chat model adapters.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The request could not be delivered or the body could not be read.
    #[error("chat model transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The provider answered with a non-success status.
    #[error("chat model API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The provider answered without any choice.
    #[error("chat model returned no choices")]
    EmptyResponse,

    /// A scripted model ran out of turns.
    #[error("scripted chat model has no turns left")]
    Exhausted,
}

impl ModelError {
    /// Wraps a transport-level failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
