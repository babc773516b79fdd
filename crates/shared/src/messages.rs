//! Realtime messages exchanged over the WebSocket.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dto::{AnimationData, CombatTickData, LogLine, LootData, StateSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("Unknown event '{0}'")]
    UnknownEvent(String),
}

// =============================================================================
// Client Messages (Player → Engine)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// The single command entry point.
    CmdInput { raw: String },
    /// Leave the current battle without typing a command.
    CombatRetreat,
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct CmdInputData {
    raw: String,
}

impl ClientMessage {
    pub const CMD_INPUT: &'static str = "cmd:input";
    pub const COMBAT_RETREAT: &'static str = "combat:retreat";

    /// Parse one inbound text frame. `data` may be omitted for events
    /// that carry no payload.
    pub fn parse(text: &str) -> Result<ClientMessage, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        match envelope.event.as_str() {
            Self::CMD_INPUT => {
                let data: CmdInputData = serde_json::from_value(envelope.data)
                    .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
                Ok(ClientMessage::CmdInput { raw: data.raw })
            }
            Self::COMBAT_RETREAT => Ok(ClientMessage::CombatRetreat),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    /// Encode as a frame. Used by clients and tests.
    pub fn to_json(&self) -> String {
        let value = match self {
            ClientMessage::CmdInput { raw } => serde_json::json!({
                "event": Self::CMD_INPUT,
                "data": { "raw": raw },
            }),
            ClientMessage::CombatRetreat => serde_json::json!({
                "event": Self::COMBAT_RETREAT,
                "data": {},
            }),
        };
        value.to_string()
    }
}

// =============================================================================
// Server Messages (Engine → Player)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatResult {
    Win,
    Loss,
    Retreat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "game:log")]
    GameLog(LogLine),

    /// Canonical full snapshot sent after every state-changing action.
    #[serde(rename = "state:update")]
    StateUpdate(Box<StateSnapshot>),

    #[serde(rename = "animation:play")]
    AnimationPlay(AnimationData),

    #[serde(rename = "combat:update")]
    CombatUpdate(CombatTickData),

    #[serde(rename = "combat:end")]
    CombatEnd {
        result: CombatResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loot: Option<LootData>,
    },
}

impl ServerMessage {
    pub fn info(text: impl Into<String>) -> Self {
        ServerMessage::GameLog(LogLine::info(text))
    }

    pub fn error(text: impl Into<String>) -> Self {
        ServerMessage::GameLog(LogLine::error(text))
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        ServerMessage::GameLog(LogLine::prompt(text))
    }

    /// Event name, for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::GameLog(_) => "game:log",
            ServerMessage::StateUpdate(_) => "state:update",
            ServerMessage::AnimationPlay(_) => "animation:play",
            ServerMessage::CombatUpdate(_) => "combat:update",
            ServerMessage::CombatEnd { .. } => "combat:end",
        }
    }
}
