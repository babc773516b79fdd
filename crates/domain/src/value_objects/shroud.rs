//! Shroud level: how obscured a room's interaction verbs are.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Integer 0..=5. Zero lists verbs plainly, five hides them completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub struct ShroudLevel(u8);

impl ShroudLevel {
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Result<Self, DomainError> {
        if level > Self::MAX {
            return Err(DomainError::out_of_range("Shroud level", 0, Self::MAX as i64));
        }
        Ok(Self(level))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Mask every character at position `i` where `i % 5 < level`.
    ///
    /// Deterministic so that every player in the room sees the same riddle.
    pub fn obscure(self, text: &str) -> String {
        let level = self.0 as usize;
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                if c.is_whitespace() || i % 5 >= level {
                    c
                } else {
                    '?'
                }
            })
            .collect()
    }
}

impl TryFrom<u8> for ShroudLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShroudLevel> for u8 {
    fn from(level: ShroudLevel) -> u8 {
        level.0
    }
}
