//! Domain model for business system connections.

mod connected;
mod error;
mod registry;

pub use connected::{ConnectedSystem, ConnectedSystems};
pub use error::BusinessDomainError;
pub use registry::{BusinessSystemRegistry, ConnectionSpec, RegistryParseError};
