//! Port contracts for the agent runtime.

mod dispatch;
mod model;

pub use dispatch::{ToolDispatchError, ToolDispatchResult, ToolDispatcher};
pub use model::{AssistantTurn, ChatModel, ModelError, ModelResult, ToolCompletionRequest};

#[cfg(test)]
pub use dispatch::MockToolDispatcher;
#[cfg(test)]
pub use model::MockChatModel;
