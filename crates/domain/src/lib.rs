//! Core types for the hexrealm world: ids, value objects, entities and the
//! pure rules that operate on them. No I/O lives here.

pub mod combat;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use combat::{resolve_exchange, BattleOutcome, Combatant, Exchange, StrikeSource};
pub use entities::{
    Animation, AnimationType, CombatStats, EffectKind, Item, ItemPlacement, ObjectKind, Place,
    Room, User, UserMode, STARTING_HP, STARTING_STRENGTH,
};
pub use error::DomainError;
pub use ids::{AnimationId, BattleId, ConnectionId, ItemId, RoomId, UserId};
pub use value_objects::{
    clean_text, move_axial, Direction, HexBounds, HexCoord, Handle, Mood, ServerCode,
    ShroudLevel, Verb, RESERVED_WORDS,
};
