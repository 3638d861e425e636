//! Error types for business system domain validation.

use crate::tool_registry::domain::{SystemId, ToolRegistryDomainError};
use thiserror::Error;

/// Errors returned while validating the business system registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusinessDomainError {
    /// A command-list entry had no elements.
    #[error("stdio connection for {0} must name a command")]
    EmptyCommand(SystemId),

    /// Two entries normalized to the same identifier.
    #[error("business system {0} is registered more than once")]
    DuplicateSystem(SystemId),

    /// An identifier or transport failed validation.
    #[error(transparent)]
    Registry(#[from] ToolRegistryDomainError),
}
