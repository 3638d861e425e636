//! Adapter implementations for the chat model port.

mod openai;
mod scripted;

pub use openai::OpenAiChatModel;
pub use scripted::ScriptedChatModel;
