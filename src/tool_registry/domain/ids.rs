//! Validated identifier for external business systems.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a system identifier.
const MAX_SYSTEM_ID_LENGTH: usize = 100;

/// Validated identifier of an external system reachable over MCP.
///
/// The same identifier names the registry entry, the connected-systems map
/// key, and the connector session owning each remote tool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemId(String);

impl SystemId {
    /// Creates a validated system identifier.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let normalized = value.into().trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(ToolRegistryDomainError::EmptySystemId);
        }

        let is_valid = normalized.chars().all(|character| {
            character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
        });
        if !is_valid {
            return Err(ToolRegistryDomainError::InvalidSystemId(normalized));
        }

        if normalized.len() > MAX_SYSTEM_ID_LENGTH {
            return Err(ToolRegistryDomainError::SystemIdTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SystemId {
    type Error = ToolRegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SystemId> for String {
    fn from(value: SystemId) -> Self {
        value.0
    }
}

impl AsRef<str> for SystemId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hubspot_integration", "hubspot_integration")]
    #[case("  Supabase_DB ", "supabase_db")]
    #[case("n8n_workflows", "n8n_workflows")]
    fn accepts_and_normalizes_identifiers(#[case] input: &str, #[case] expected: &str) {
        let id = SystemId::new(input).expect("identifier should be valid");
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case("", ToolRegistryDomainError::EmptySystemId)]
    #[case("   ", ToolRegistryDomainError::EmptySystemId)]
    #[case(
        "zoom-info",
        ToolRegistryDomainError::InvalidSystemId("zoom-info".to_owned())
    )]
    fn rejects_invalid_identifiers(#[case] input: &str, #[case] expected: ToolRegistryDomainError) {
        assert_eq!(SystemId::new(input), Err(expected));
    }

    #[test]
    fn rejects_overlong_identifier() {
        let input = "a".repeat(101);
        assert!(matches!(
            SystemId::new(input),
            Err(ToolRegistryDomainError::SystemIdTooLong(_))
        ));
    }

    #[test]
    fn deserializes_through_validation() {
        let parsed: Result<SystemId, _> = serde_json::from_str("\"bad id\"");
        assert!(parsed.is_err());
    }
}
