//! Registry of external business systems and how to reach them.

use super::BusinessDomainError;
use crate::tool_registry::domain::{McpTransport, SystemId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a business system is reached.
///
/// Serialized untagged: a bare string is an SSE endpoint URL and a list is a
/// stdio command followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectionSpec {
    /// Endpoint URL reached over SSE.
    Url(String),
    /// Command line launched as a stdio subprocess.
    Command(Vec<String>),
}

impl ConnectionSpec {
    /// Creates a stdio entry from a command line.
    #[must_use]
    pub fn command<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Command(parts.into_iter().map(Into::into).collect())
    }

    /// Builds the transport this entry selects.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessDomainError::EmptyCommand`] for an empty command
    /// list, or a registry error when the URL or command is invalid.
    pub fn to_transport(&self, system_id: &SystemId) -> Result<McpTransport, BusinessDomainError> {
        match self {
            Self::Url(url) => Ok(McpTransport::http_sse(url.clone())?),
            Self::Command(parts) => {
                let (command, args) = parts
                    .split_first()
                    .ok_or_else(|| BusinessDomainError::EmptyCommand(system_id.clone()))?;
                Ok(McpTransport::stdio(command.clone(), args.to_vec())?)
            }
        }
    }
}

/// Ordered map of business systems keyed by unique identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct BusinessSystemRegistry {
    entries: Vec<(SystemId, ConnectionSpec)>,
}

impl BusinessSystemRegistry {
    /// Builds a registry from entries in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessDomainError::DuplicateSystem`] when two entries share
    /// an identifier, or a validation error for a malformed entry.
    pub fn new<I>(entries: I) -> Result<Self, BusinessDomainError>
    where
        I: IntoIterator<Item = (SystemId, ConnectionSpec)>,
    {
        let mut registry = Self {
            entries: Vec::new(),
        };
        for (system_id, spec) in entries {
            if registry.get(&system_id).is_some() {
                return Err(BusinessDomainError::DuplicateSystem(system_id));
            }
            spec.to_transport(&system_id)?;
            registry.entries.push((system_id, spec));
        }
        Ok(registry)
    }

    /// Returns the built-in set of business systems.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessDomainError`] if a built-in entry fails validation.
    pub fn standard() -> Result<Self, BusinessDomainError> {
        let entries = [
            (
                "n8n_workflows",
                ConnectionSpec::Url("http://localhost:5678/webhook/mcp".to_owned()),
            ),
            (
                "hubspot_integration",
                ConnectionSpec::command(["npx", "@hubspot/mcp-server"]),
            ),
            (
                "zoominfo_connector",
                ConnectionSpec::command(["node", "./mcp-servers/zoominfo-server.js"]),
            ),
            (
                "perplexity_search",
                ConnectionSpec::command(["node", "./mcp-servers/perplexity-server.js"]),
            ),
            (
                "supabase_db",
                ConnectionSpec::command(["npx", "@supabase/mcp-server"]),
            ),
        ];

        let validated = entries
            .into_iter()
            .map(|(id, spec)| Ok((SystemId::new(id)?, spec)))
            .collect::<Result<Vec<_>, BusinessDomainError>>()?;
        Self::new(validated)
    }

    /// Returns the entry for `system_id`.
    #[must_use]
    pub fn get(&self, system_id: &SystemId) -> Option<&ConnectionSpec> {
        self.entries
            .iter()
            .find(|(id, _)| id == system_id)
            .map(|(_, spec)| spec)
    }

    /// Iterates over entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&SystemId, &ConnectionSpec)> {
        self.entries.iter().map(|(id, spec)| (id, spec))
    }

    /// Returns the identifiers in registry order.
    #[must_use]
    pub fn ids(&self) -> Vec<&SystemId> {
        self.entries.iter().map(|(id, _)| id).collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Error produced when a JSON object is not a valid registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryParseError {
    /// An entry value was neither a string nor a list of strings.
    #[error("invalid connection for {system}: {source}")]
    Entry {
        /// Raw key of the offending entry.
        system: String,
        /// Parse failure.
        source: serde_json::Error,
    },

    /// Validation failed.
    #[error(transparent)]
    Domain(#[from] BusinessDomainError),
}

impl TryFrom<Map<String, Value>> for BusinessSystemRegistry {
    type Error = RegistryParseError;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let entries = object
            .into_iter()
            .map(|(key, value)| {
                let spec = serde_json::from_value::<ConnectionSpec>(value).map_err(|source| {
                    RegistryParseError::Entry {
                        system: key.clone(),
                        source,
                    }
                })?;
                let system_id = SystemId::new(key).map_err(BusinessDomainError::from)?;
                Ok((system_id, spec))
            })
            .collect::<Result<Vec<_>, RegistryParseError>>()?;
        Ok(Self::new(entries)?)
    }
}

impl From<BusinessSystemRegistry> for Map<String, Value> {
    fn from(registry: BusinessSystemRegistry) -> Self {
        registry
            .entries
            .into_iter()
            .map(|(id, spec)| {
                let value = match spec {
                    ConnectionSpec::Url(url) => Value::String(url),
                    ConnectionSpec::Command(parts) => {
                        Value::Array(parts.into_iter().map(Value::String).collect())
                    }
                };
                (id.into(), value)
            })
            .collect()
    }
}
