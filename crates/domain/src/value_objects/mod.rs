//! Value objects - Immutable objects defined by their attributes

mod hex;
mod mood;
mod names;
mod realm;
mod shroud;

pub use hex::{move_axial, Direction, HexBounds, HexCoord};
pub use mood::Mood;
pub use names::{clean_text, Handle, Verb, RESERVED_WORDS};
pub use realm::ServerCode;
pub use shroud::ShroudLevel;
