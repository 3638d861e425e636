//! Agent settings loaded from a JSON file.
//!
//! Every field has a default, so an empty object (or no file at all) yields
//! a working configuration. When `systems` is absent the built-in registry
//! is used.
//!
//! ```json
//! {
//!   "workspace_root": "/srv/prospector",
//!   "max_steps": 20,
//!   "llm": { "model": "gpt-4o-mini", "api_key_env": "OPENAI_API_KEY" },
//!   "systems": {
//!     "n8n_workflows": "http://localhost:5678/webhook/mcp",
//!     "supabase_db": ["npx", "@supabase/mcp-server"]
//!   }
//! }
//! ```

use crate::agent::adapters::OpenAiChatModel;
use crate::business::domain::{BusinessDomainError, BusinessSystemRegistry};
use crate::business::services::BusinessAgentOptions;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Read {
        /// File path.
        path: Utf8PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`AgentSettings`].
    #[error("failed to parse settings from {path}: {source}")]
    Parse {
        /// File path.
        path: Utf8PathBuf,
        /// Parse failure.
        source: serde_json::Error,
    },

    /// The environment variable holding the API key is unset.
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    /// The built-in registry failed validation.
    #[error(transparent)]
    Registry(#[from] BusinessDomainError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level agent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSettings {
    /// Directory substituted into the system prompt.
    pub workspace_root: Utf8PathBuf,
    /// Step limit per run.
    pub max_steps: usize,
    /// Observation length cap in characters.
    pub max_observe: usize,
    /// Chat model settings.
    pub llm: LlmSettings,
    /// Business systems to connect; the built-in registry when absent.
    pub systems: Option<BusinessSystemRegistry>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        let options = BusinessAgentOptions::default();
        Self {
            workspace_root: options.workspace_root,
            max_steps: options.max_steps,
            max_observe: options.max_observe,
            llm: LlmSettings::default(),
            systems: None,
        }
    }
}

impl AgentSettings {
    /// Loads settings from `path`, or returns defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] when the file
    /// cannot be read or decoded.
    pub fn load(path: Option<&Utf8Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Returns the configured registry, falling back to the built-in one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Registry`] if the built-in registry fails
    /// validation.
    pub fn registry(&self) -> ConfigResult<BusinessSystemRegistry> {
        match &self.systems {
            Some(registry) => Ok(registry.clone()),
            None => Ok(BusinessSystemRegistry::standard()?),
        }
    }

    /// Returns the agent tunables.
    #[must_use]
    pub fn agent_options(&self) -> BusinessAgentOptions {
        BusinessAgentOptions {
            workspace_root: self.workspace_root.clone(),
            max_steps: self.max_steps,
            max_observe: self.max_observe,
        }
    }
}

/// Settings for the OpenAI-compatible chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSettings {
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Completion token cap.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-4o".to_owned(),
            api_key_env: "OPENAI_API_KEY".to_owned(),
            max_tokens: Some(4096),
            temperature: Some(0.0),
        }
    }
}

impl LlmSettings {
    /// Reads the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when the variable is unset or
    /// blank.
    pub fn api_key(&self) -> ConfigResult<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }

    /// Builds the chat model adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when no API key is available.
    pub fn build_model(&self) -> ConfigResult<OpenAiChatModel> {
        let mut model = OpenAiChatModel::new(&self.base_url, self.api_key()?, &self.model);
        if let Some(max_tokens) = self.max_tokens {
            model = model.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            model = model.with_temperature(temperature);
        }
        Ok(model)
    }
}
