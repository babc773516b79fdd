//! hexrealm Protocol - Types shared between the engine and its clients
//!
//! - Realtime events (`ClientMessage`, `ServerMessage`) in the
//!   `{"event": ..., "data": ...}` envelope
//! - Snapshot DTOs carried by `state:update`
//! - HTTP auth request/response bodies
//!
//! DTOs use raw `uuid::Uuid` rather than domain ids.

pub mod auth;
pub mod dto;
pub mod messages;

pub use auth::{AuthRequest, AuthResponse};
pub use dto::{
    AnimationData, CombatTickData, ItemData, LogKind, LogLine, LootData, PlayerData, RoomData,
    StateSnapshot, VisibleRoomData,
};
pub use messages::{ClientMessage, CombatResult, ProtocolError, ServerMessage};
