//! Port contracts for MCP connections.

mod connector;

pub use connector::{McpConnector, McpConnectorError, McpConnectorResult};
