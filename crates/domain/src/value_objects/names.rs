//! Validated text newtypes and free-text helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MIN_HANDLE_LENGTH: usize = 3;
const MAX_HANDLE_LENGTH: usize = 24;
const MAX_VERB_LENGTH: usize = 20;

/// Words a custom verb may not take because the dispatcher claims them first.
pub const RESERVED_WORDS: &[&str] = &[
    "go",
    "help",
    "look",
    "fight",
    "retreat",
    "regenerate",
    "inventory",
    "inv",
    "i",
    "n",
    "s",
    "ne",
    "se",
    "nw",
    "sw",
    "north",
    "south",
    "northeast",
    "southeast",
    "northwest",
    "southwest",
];

/// A player's login handle: 3-24 characters of `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn new(handle: impl Into<String>) -> Result<Self, DomainError> {
        let handle = handle.into();
        let trimmed = handle.trim();
        let len = trimmed.chars().count();
        if !(MIN_HANDLE_LENGTH..=MAX_HANDLE_LENGTH).contains(&len) {
            return Err(DomainError::validation(format!(
                "Handle must be {MIN_HANDLE_LENGTH}-{MAX_HANDLE_LENGTH} characters"
            )));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::validation(
                "Handle may only contain letters, digits and '_'",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Handle {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> String {
        handle.0
    }
}

/// An interaction verb: one lowercase word of letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Verb(String);

impl Verb {
    /// Any single word. Used for built-in defaults and stored rows.
    pub fn new(verb: impl Into<String>) -> Result<Self, DomainError> {
        let verb = verb.into();
        let word = verb.trim().to_ascii_lowercase();
        if word.is_empty() || word.len() > MAX_VERB_LENGTH {
            return Err(DomainError::validation(format!(
                "A verb must be 1-{MAX_VERB_LENGTH} letters"
            )));
        }
        if !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(
                "A verb must be a single word of letters",
            ));
        }
        Ok(Self(word))
    }

    /// An author-supplied verb; reserved command words are refused.
    pub fn custom(verb: impl Into<String>) -> Result<Self, DomainError> {
        let verb = Self::new(verb)?;
        if RESERVED_WORDS.contains(&verb.as_str()) {
            return Err(DomainError::validation(format!(
                "'{}' is already a command; pick another verb",
                verb.0
            )));
        }
        Ok(verb)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Verb {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Verb> for String {
    fn from(verb: Verb) -> String {
        verb.0
    }
}

/// Trim free text and enforce non-empty plus a length ceiling.
pub fn clean_text(input: &str, field: &str, max_len: usize) -> Result<String, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_rules() {
        assert!(Handle::new("ab").is_err());
        assert!(Handle::new("wander_er").is_ok());
        assert!(Handle::new("bad name").is_err());
    }

    #[test]
    fn verbs_are_lowercased_single_words() {
        assert_eq!(Verb::new("Pull").unwrap().as_str(), "pull");
        assert!(Verb::new("pull hard").is_err());
    }

    #[test]
    fn custom_verbs_cannot_shadow_commands() {
        assert!(Verb::custom("fight").is_err());
        assert!(Verb::custom("ne").is_err());
        assert!(Verb::custom("open").is_ok());
    }

    #[test]
    fn clean_text_trims_and_bounds() {
        assert_eq!(clean_text("  Hall  ", "Title", 10).unwrap(), "Hall");
        assert!(clean_text("   ", "Title", 10).is_err());
        assert!(clean_text("abcdefghijk", "Title", 10).is_err());
    }
}
