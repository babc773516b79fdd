//! The per-user mode: the single source of truth for command routing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Closed set of modes a user can be in.
///
/// One variant per creation-wizard step, plus idle, the post-wizard
/// generation window and combat. Persisted as its SCREAMING_SNAKE tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserMode {
    #[default]
    Idle,
    CreatingRoomTitle,
    CreatingRoomDescription,
    CreatingRoomMood,
    CreatingRoomShroud,
    CreatingObjectConfirm,
    CreatingObjectName,
    CreatingObjectDescription,
    CreatingObjectType,
    CreatingObjectValue,
    CreatingObjectEnemyStats,
    CreatingObjectPickupKind,
    CreatingObjectGate,
    CreatingObjectVerb,
    CreatingObjectMessage,
    GeneratingAnimations,
    Combat,
}

impl UserMode {
    pub const ALL: [UserMode; 17] = [
        UserMode::Idle,
        UserMode::CreatingRoomTitle,
        UserMode::CreatingRoomDescription,
        UserMode::CreatingRoomMood,
        UserMode::CreatingRoomShroud,
        UserMode::CreatingObjectConfirm,
        UserMode::CreatingObjectName,
        UserMode::CreatingObjectDescription,
        UserMode::CreatingObjectType,
        UserMode::CreatingObjectValue,
        UserMode::CreatingObjectEnemyStats,
        UserMode::CreatingObjectPickupKind,
        UserMode::CreatingObjectGate,
        UserMode::CreatingObjectVerb,
        UserMode::CreatingObjectMessage,
        UserMode::GeneratingAnimations,
        UserMode::Combat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserMode::Idle => "IDLE",
            UserMode::CreatingRoomTitle => "CREATING_ROOM_TITLE",
            UserMode::CreatingRoomDescription => "CREATING_ROOM_DESCRIPTION",
            UserMode::CreatingRoomMood => "CREATING_ROOM_MOOD",
            UserMode::CreatingRoomShroud => "CREATING_ROOM_SHROUD",
            UserMode::CreatingObjectConfirm => "CREATING_OBJECT_CONFIRM",
            UserMode::CreatingObjectName => "CREATING_OBJECT_NAME",
            UserMode::CreatingObjectDescription => "CREATING_OBJECT_DESCRIPTION",
            UserMode::CreatingObjectType => "CREATING_OBJECT_TYPE",
            UserMode::CreatingObjectValue => "CREATING_OBJECT_VALUE",
            UserMode::CreatingObjectEnemyStats => "CREATING_OBJECT_ENEMY_STATS",
            UserMode::CreatingObjectPickupKind => "CREATING_OBJECT_PICKUP_KIND",
            UserMode::CreatingObjectGate => "CREATING_OBJECT_GATE",
            UserMode::CreatingObjectVerb => "CREATING_OBJECT_VERB",
            UserMode::CreatingObjectMessage => "CREATING_OBJECT_MESSAGE",
            UserMode::GeneratingAnimations => "GENERATING_ANIMATIONS",
            UserMode::Combat => "COMBAT",
        }
    }

    /// True for every mode the creation wizard owns, including the
    /// generation window. Such users route every command to the wizard.
    pub fn is_wizard(&self) -> bool {
        match self {
            UserMode::Idle | UserMode::Combat => false,
            UserMode::CreatingRoomTitle
            | UserMode::CreatingRoomDescription
            | UserMode::CreatingRoomMood
            | UserMode::CreatingRoomShroud
            | UserMode::CreatingObjectConfirm
            | UserMode::CreatingObjectName
            | UserMode::CreatingObjectDescription
            | UserMode::CreatingObjectType
            | UserMode::CreatingObjectValue
            | UserMode::CreatingObjectEnemyStats
            | UserMode::CreatingObjectPickupKind
            | UserMode::CreatingObjectGate
            | UserMode::CreatingObjectVerb
            | UserMode::CreatingObjectMessage
            | UserMode::GeneratingAnimations => true,
        }
    }

    /// Steps that only need the room half of the scratch record.
    pub fn is_room_step(&self) -> bool {
        matches!(
            self,
            UserMode::CreatingRoomTitle
                | UserMode::CreatingRoomDescription
                | UserMode::CreatingRoomMood
                | UserMode::CreatingRoomShroud
        )
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("unknown user mode '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_round_trips_through_its_tag() {
        for mode in UserMode::ALL {
            assert_eq!(mode.as_str().parse::<UserMode>().unwrap(), mode);
        }
    }

    #[test]
    fn only_idle_and_combat_escape_the_wizard() {
        let outside: Vec<_> = UserMode::ALL.into_iter().filter(|m| !m.is_wizard()).collect();
        assert_eq!(outside, vec![UserMode::Idle, UserMode::Combat]);
    }

    #[test]
    fn serde_uses_the_persisted_tag() {
        let json = serde_json::to_string(&UserMode::GeneratingAnimations).unwrap();
        assert_eq!(json, "\"GENERATING_ANIMATIONS\"");
    }
}
