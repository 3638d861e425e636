//! Tool-calling agent runtime.
//!
//! The runtime alternates between asking a [`ports::ChatModel`] what to do
//! next and executing the tool calls it requests. Base tools run in-process;
//! every other tool is handed to a [`ports::ToolDispatcher`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
