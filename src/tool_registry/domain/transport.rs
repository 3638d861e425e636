//! How an MCP connection is opened: a spawned subprocess or an HTTP
//! endpoint.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn trimmed(value: impl Into<String>) -> Option<String> {
    let text = value.into().trim().to_owned();
    (!text.is_empty()).then_some(text)
}

/// A business system launched as a child process speaking MCP on stdio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTransportConfig {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    working_directory: Option<String>,
}

impl StdioTransportConfig {
    /// Creates a launch configuration for `command` with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyStdioCommand`] for a blank
    /// command.
    pub fn new(command: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let program = trimmed(command).ok_or(ToolRegistryDomainError::EmptyStdioCommand)?;
        Ok(Self {
            command: program,
            args: Vec::new(),
            env: BTreeMap::new(),
            working_directory: None,
        })
    }

    /// Sets the arguments passed after the command.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Sets extra environment variables for the child process.
    #[must_use]
    pub fn with_env(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = vars.into_iter().collect();
        self
    }

    /// Runs the child process from `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyWorkingDirectory`] for a blank
    /// directory.
    pub fn with_working_directory(
        mut self,
        directory: impl Into<String>,
    ) -> Result<Self, ToolRegistryDomainError> {
        let dir = trimmed(directory).ok_or(ToolRegistryDomainError::EmptyWorkingDirectory)?;
        self.working_directory = Some(dir);
        Ok(self)
    }

    /// Program to launch.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments after the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Extra environment variables.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Directory the child runs from, if not the current one.
    #[must_use]
    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }
}

/// A business system reached at an HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSseTransportConfig {
    base_url: String,
}

impl HttpSseTransportConfig {
    /// Validates `base_url` as an `http` or `https` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyHttpSseBaseUrl`] for a blank
    /// URL and [`ToolRegistryDomainError::InvalidHttpSseBaseUrl`] for any
    /// other scheme.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let url = trimmed(base_url).ok_or(ToolRegistryDomainError::EmptyHttpSseBaseUrl)?;
        if ["http://", "https://"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            Ok(Self { base_url: url })
        } else {
            Err(ToolRegistryDomainError::InvalidHttpSseBaseUrl(url))
        }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Transport selected for one business system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "config")]
pub enum McpTransport {
    /// Child process on stdio.
    Stdio(StdioTransportConfig),
    /// HTTP endpoint.
    HttpSse(HttpSseTransportConfig),
}

impl McpTransport {
    /// Creates a `stdio` transport with arguments.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`StdioTransportConfig::new`].
    pub fn stdio(
        command: impl Into<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::Stdio(StdioTransportConfig::new(command)?.with_args(args)))
    }

    /// Creates an `http_sse` transport.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`HttpSseTransportConfig::new`].
    pub fn http_sse(base_url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::HttpSse(HttpSseTransportConfig::new(base_url)?))
    }

    /// Returns the descriptor recorded for a live connection: the URL for
    /// HTTP+SSE, the bare command for STDIO.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        match self {
            Self::Stdio(config) => config.command(),
            Self::HttpSse(config) => config.base_url(),
        }
    }

    /// Returns a human-readable rendering for log lines.
    #[must_use]
    pub fn display_line(&self) -> String {
        match self {
            Self::Stdio(config) if config.args().is_empty() => config.command().to_owned(),
            Self::Stdio(config) => format!("{} {}", config.command(), config.args().join(" ")),
            Self::HttpSse(config) => config.base_url().to_owned(),
        }
    }
}
