//! Domain entities

mod animation;
mod item;
mod mode;
mod room;
mod user;

pub use animation::{Animation, AnimationType};
pub use item::{CombatStats, EffectKind, Item, ItemPlacement, ObjectKind};
pub use mode::UserMode;
pub use room::{Place, Room};
pub use user::{User, STARTING_HP, STARTING_STRENGTH};
