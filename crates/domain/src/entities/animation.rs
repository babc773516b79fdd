//! Pre-rendered ASCII animations produced by the art service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{AnimationId, ItemId, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimationType {
    /// Ambient loop played when a player enters the room.
    Tapestry,
    /// Played when an item's verb succeeds.
    Interaction,
}

impl AnimationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationType::Tapestry => "TAPESTRY",
            AnimationType::Interaction => "INTERACTION",
        }
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TAPESTRY" => Ok(AnimationType::Tapestry),
            "INTERACTION" => Ok(AnimationType::Interaction),
            other => Err(DomainError::parse(format!("unknown animation type '{other}'"))),
        }
    }
}

/// Cosmetic only. Nothing in the game waits on an animation existing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub id: AnimationId,
    pub room_id: Option<RoomId>,
    pub item_id: Option<ItemId>,
    pub kind: AnimationType,
    pub frames: Vec<String>,
    pub fps: u32,
    pub created_at: DateTime<Utc>,
}

impl Animation {
    pub fn for_room(
        room_id: RoomId,
        kind: AnimationType,
        frames: Vec<String>,
        fps: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AnimationId::new(),
            room_id: Some(room_id),
            item_id: None,
            kind,
            frames,
            fps,
            created_at: now,
        }
    }

    pub fn for_item(
        room_id: Option<RoomId>,
        item_id: ItemId,
        kind: AnimationType,
        frames: Vec<String>,
        fps: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AnimationId::new(),
            room_id,
            item_id: Some(item_id),
            kind,
            frames,
            fps,
            created_at: now,
        }
    }
}
