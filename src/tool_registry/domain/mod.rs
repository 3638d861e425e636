//! Domain model for MCP connections and the tools they expose.
//!
//! The tool registry domain models system identity, transport configuration,
//! tool metadata, and the ordered tool collection the agent reasons over.
//! Infrastructure concerns remain outside this boundary.

mod collection;
mod error;
mod ids;
mod tool;
mod transport;

pub use collection::ToolCollection;
pub use error::ToolRegistryDomainError;
pub use ids::SystemId;
pub use tool::{ToolDefinition, ToolOrigin};
pub use transport::{HttpSseTransportConfig, McpTransport, StdioTransportConfig};
