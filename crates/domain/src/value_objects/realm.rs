//! Realm ("server code") partition key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MAX_SERVER_CODE_LENGTH: usize = 32;

/// Identifies one independent game world inside a shared deployment.
///
/// Every user, room and item query is scoped by a server code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerCode(String);

impl ServerCode {
    pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Server code cannot be empty"));
        }
        if trimmed.len() > MAX_SERVER_CODE_LENGTH {
            return Err(DomainError::validation(format!(
                "Server code cannot exceed {} characters",
                MAX_SERVER_CODE_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::validation(
                "Server code may only contain letters, digits, '-' and '_'",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ServerCode {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ServerCode> for String {
    fn from(code: ServerCode) -> String {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_simple_codes() {
        assert_eq!(ServerCode::new("  north-1 ").unwrap().as_str(), "north-1");
    }

    #[test]
    fn rejects_spaces_and_empties() {
        assert!(ServerCode::new("").is_err());
        assert!(ServerCode::new("two words").is_err());
    }
}
