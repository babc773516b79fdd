//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `WizardStore` - in-progress room/object authoring records
//! - `BattleRegistry` - running battles and their timers
//! - `GenerationJobs` - animation batches in flight

pub mod battles;
pub mod generation;
pub mod wizard;

pub use battles::{ActiveBattle, BattleRegistry};
pub use generation::GenerationJobs;
pub use wizard::{ObjectDraft, RoomDraft, WizardScratch, WizardStore};
