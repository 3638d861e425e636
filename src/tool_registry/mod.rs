//! MCP connections and the tool collection they feed.
//!
//! This module models external systems reachable over the Model Context
//! Protocol, the multi-client connector that keeps those connections alive,
//! and the ordered tool collection handed to the agent runtime. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
