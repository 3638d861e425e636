//! Domain model for the tool-calling agent runtime.

mod message;
mod state;

pub use message::{ChatMessage, FunctionCall, Role, ToolCall};
pub use state::{AgentState, ToolChoice};
