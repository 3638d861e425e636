//! Tool definition value object.

use super::{SystemId, ToolRegistryDomainError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum tool name length accepted by chat-completions function calling.
const MAX_TOOL_NAME_LENGTH: usize = 64;

/// Where a tool is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ToolOrigin {
    /// Base tool executed in-process by the agent runtime.
    Local,
    /// Tool exposed by an MCP connection.
    Remote {
        /// Connection that owns the tool.
        server_id: SystemId,
        /// Tool name as advertised by the MCP server.
        remote_name: String,
    },
}

/// Canonical metadata for a tool offered to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: Value,
    origin: ToolOrigin,
}

impl ToolDefinition {
    /// Creates a base tool executed by the agent runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyToolName`] when the name is
    /// empty after trimming.
    pub fn local(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolName);
        }

        Ok(Self {
            name: normalized_name,
            description: description.into().trim().to_owned(),
            input_schema,
            origin: ToolOrigin::Local,
        })
    }

    /// Creates a tool exposed by the MCP connection `server_id`.
    ///
    /// The exposed name is `mcp_{server_id}_{remote_name}` so that servers
    /// advertising the same tool name do not collide.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyToolName`] when the remote
    /// name is empty after trimming.
    pub fn remote(
        server_id: SystemId,
        remote_name: impl Into<String>,
        description: Option<String>,
        input_schema: Value,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized_remote = remote_name.into().trim().to_owned();
        if normalized_remote.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolName);
        }

        Ok(Self {
            name: qualified_remote_name(&server_id, &normalized_remote),
            description: description.unwrap_or_default().trim().to_owned(),
            input_schema,
            origin: ToolOrigin::Remote {
                server_id,
                remote_name: normalized_remote,
            },
        })
    }

    /// Returns the name exposed to the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Returns where the tool executes.
    #[must_use]
    pub const fn origin(&self) -> &ToolOrigin {
        &self.origin
    }

    /// Returns whether this is a base tool.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.origin, ToolOrigin::Local)
    }

    /// Returns the owning connection for remote tools.
    #[must_use]
    pub const fn server_id(&self) -> Option<&SystemId> {
        match &self.origin {
            ToolOrigin::Local => None,
            ToolOrigin::Remote { server_id, .. } => Some(server_id),
        }
    }
}

fn qualified_remote_name(server_id: &SystemId, remote_name: &str) -> String {
    format!("mcp_{server_id}_{remote_name}")
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || character == '_' || character == '-' {
                character
            } else {
                '_'
            }
        })
        .take(MAX_TOOL_NAME_LENGTH)
        .collect()
}
