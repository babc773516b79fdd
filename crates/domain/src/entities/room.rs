//! Rooms on the hex grid, and the synthesized void between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{HexCoord, ServerCode, ShroudLevel};
use crate::{RoomId, UserId};

/// A persisted room. At most one exists per `(server_code, q, r)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub server_code: ServerCode,
    pub position: HexCoord,
    pub title: String,
    pub description: String,
    pub shroud: ShroudLevel,
    pub creator_id: Option<UserId>,
    /// Single-glyph map symbol, filled in later by the art service.
    pub symbol: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        server_code: ServerCode,
        position: HexCoord,
        title: impl Into<String>,
        description: impl Into<String>,
        shroud: ShroudLevel,
        creator_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RoomId::new(),
            server_code,
            position,
            title: title.into(),
            description: description.into(),
            shroud,
            creator_id,
            symbol: None,
            created_at: now,
        }
    }
}

/// What stands at a coordinate: an authored room or unexplored void.
///
/// The void is never stored; its text is derived from the coordinate alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Room(Room),
    Void(HexCoord),
}

impl Place {
    pub fn at(position: HexCoord, room: Option<Room>) -> Self {
        match room {
            Some(room) => Place::Room(room),
            None => Place::Void(position),
        }
    }

    pub fn position(&self) -> HexCoord {
        match self {
            Place::Room(room) => room.position,
            Place::Void(position) => *position,
        }
    }

    pub fn room(&self) -> Option<&Room> {
        match self {
            Place::Room(room) => Some(room),
            Place::Void(_) => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Place::Room(room) => room.title.clone(),
            Place::Void(_) => "The Void".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Place::Room(room) => room.description.clone(),
            Place::Void(position) => format!(
                "Formless grey mist drifts at {position}. Nothing here has been imagined yet."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_text_depends_only_on_the_coordinate() {
        let a = Place::at(HexCoord::new(4, -2), None);
        let b = Place::at(HexCoord::new(4, -2), None);
        assert_eq!(a.title(), b.title());
        assert_eq!(a.description(), b.description());
        assert!(a.room().is_none());
    }
}
