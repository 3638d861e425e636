//! Prospector: a business-intelligence agent over MCP.
//!
//! The crate wires a tool-calling agent to external business systems (CRM,
//! contact enrichment, web research, workflow automation, a database)
//! reached through the Model Context Protocol. Each system's tools join the
//! agent's tool collection while the system is connected and leave it when
//! the system is disconnected.
//!
//! # Architecture
//!
//! Prospector follows hexagonal architecture principles:
//!
//! - **Domain**: Validated value types with no infrastructure dependencies
//! - **Ports**: Trait interfaces for the chat model, tool dispatch, and MCP
//! - **Adapters**: `rmcp`, OpenAI-compatible HTTP, and in-memory doubles
//!
//! # Modules
//!
//! - [`tool_registry`]: MCP transports, tool definitions, and connectors
//! - [`agent`]: The think/act tool-calling runtime
//! - [`business`]: The business system registry and lifecycle wrapper
//! - [`config`]: JSON settings
//! - [`driver`]: Prompt handling, interrupts, and time limits
//! - [`logging`]: Tracing subscriber setup

pub mod agent;
pub mod business;
pub mod config;
pub mod driver;
pub mod logging;
pub mod tool_registry;
