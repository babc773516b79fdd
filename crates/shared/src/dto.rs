//! Payload types carried inside realtime events.

use hexrealm_domain::{StrikeSource, UserMode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Presentation class of a `game:log` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogKind {
    Info,
    Error,
    Chat,
    RoomTitle,
    RoomDesc,
    RoomItems,
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LogLine {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            label: None,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LogKind::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LogKind::Error, text)
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(LogKind::Prompt, text)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub id: Uuid,
    pub handle: String,
    pub server_code: String,
    pub strength: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub gold: i64,
    pub q: i32,
    pub r: i32,
    pub mode: UserMode,
}

/// The room the player stands in. `id` is absent for unexplored void.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub q: i32,
    pub r: i32,
    pub title: String,
    pub description: String,
    pub shroud_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// A map cell inside the view radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRoomData {
    pub id: Uuid,
    pub q: i32,
    pub r: i32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Enemy stats, present only for enemies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub player: PlayerData,
    pub room: RoomData,
    pub visible_rooms: Vec<VisibleRoomData>,
    /// Visible room items in listing order; ordinals index into this.
    pub room_items: Vec<ItemData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players_in_room: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<ItemData>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationData {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: String,
    pub frames: Vec<String>,
    pub fps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatTickData {
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub enemy_hp: i32,
    pub enemy_max_hp: i32,
    pub player_roll: i32,
    pub enemy_roll: i32,
    pub damage: i32,
    pub source: StrikeSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootData {
    pub gold: i64,
}
