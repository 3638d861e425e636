//! Agent runtime services: the step loop, the tool-calling agent, and the
//! built-in base tools.

pub mod builtin;
mod editor;
mod react;
mod toolcall;

pub use react::{
    AgentCore, AgentError, AgentResult, DEFAULT_MAX_STEPS, MAX_MEMORY_MESSAGES, NO_ACTION_NEEDED,
    ReActAgent, run_steps,
};
pub use editor::StrReplaceEditor;
pub use toolcall::{NO_CONTENT, ToolCallAgent};
