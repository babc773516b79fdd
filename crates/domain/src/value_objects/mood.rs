//! Room mood chosen while authoring a room.
//!
//! Mood only steers the art service's tapestry prompt. It lives in the
//! wizard's transient record and is never a persisted room field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Serene,
    Eerie,
    Grim,
    Whimsical,
    Majestic,
    #[default]
    Mysterious,
}

impl Mood {
    /// Menu order shown to authors (1-indexed).
    pub const MENU: [Mood; 6] = [
        Mood::Serene,
        Mood::Eerie,
        Mood::Grim,
        Mood::Whimsical,
        Mood::Majestic,
        Mood::Mysterious,
    ];

    pub fn from_menu(choice: u8) -> Result<Mood, DomainError> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::MENU.get(index as usize))
            .copied()
            .ok_or_else(|| DomainError::out_of_range("Mood choice", 1, Self::MENU.len() as i64))
    }

    /// Accept either a menu number or a mood name.
    pub fn parse(input: &str) -> Result<Mood, DomainError> {
        let input = input.trim();
        if let Ok(choice) = input.parse::<u8>() {
            return Self::from_menu(choice);
        }
        Self::MENU
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(input))
            .ok_or_else(|| DomainError::validation(format!("Unknown mood '{input}'")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Serene => "serene",
            Mood::Eerie => "eerie",
            Mood::Grim => "grim",
            Mood::Whimsical => "whimsical",
            Mood::Majestic => "majestic",
            Mood::Mysterious => "mysterious",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mood::Serene => "Serene",
            Mood::Eerie => "Eerie",
            Mood::Grim => "Grim",
            Mood::Whimsical => "Whimsical",
            Mood::Majestic => "Majestic",
            Mood::Mysterious => "Mysterious",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
