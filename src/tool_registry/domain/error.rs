//! Error types for tool registry domain validation.

use thiserror::Error;

/// Errors returned while constructing tool registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// The system identifier is empty after trimming.
    #[error("system identifier must not be empty")]
    EmptySystemId,

    /// The system identifier contains characters outside `[a-z0-9_]`.
    #[error(
        "system identifier '{0}' contains invalid characters (only lowercase alphanumeric and underscores allowed)"
    )]
    InvalidSystemId(String),

    /// The system identifier exceeds the 100-character limit.
    #[error("system identifier exceeds 100 character limit: {0}")]
    SystemIdTooLong(String),

    /// The STDIO command is empty.
    #[error("STDIO command must not be empty")]
    EmptyStdioCommand,

    /// The STDIO working directory is empty after trimming.
    #[error("STDIO working directory must not be empty when provided")]
    EmptyWorkingDirectory,

    /// The HTTP+SSE base URL is empty.
    #[error("HTTP+SSE base URL must not be empty")]
    EmptyHttpSseBaseUrl,

    /// The HTTP+SSE base URL does not have an `http://` or `https://` prefix.
    #[error("HTTP+SSE base URL '{0}' must start with 'http://' or 'https://'")]
    InvalidHttpSseBaseUrl(String),

    /// A tool definition name is empty after trimming.
    #[error("tool name must not be empty")]
    EmptyToolName,
}
