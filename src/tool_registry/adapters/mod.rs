//! Adapter implementations for the MCP connector port.

pub mod memory;
pub mod rmcp;

pub use memory::{ConnectorCall, InMemoryMcpConnector};
pub use self::rmcp::RmcpConnector;
