//! Use cases - one per player-facing capability.
//!
//! Each use case holds its ports as `Arc<dyn Port>` and returns a `Reply`:
//! the events owed to the acting connection. Unsolicited events (combat
//! ticks, finished art jobs) go through the `EventSink` port instead.

pub mod assets;
pub mod auth;
pub mod combat;
pub mod dispatcher;
pub mod interaction;
pub mod movement;
pub mod reply;
pub mod session;
pub mod wizard;
pub mod world_view;

pub use assets::{AssetGenerator, GenerationReport, RegenerateError, RegenerateRoomArt};
pub use auth::{AuthError, Authenticate};
pub use combat::{CombatEngine, CombatError};
pub use dispatcher::{CommandDispatcher, CommandError};
pub use interaction::{Interact, InteractionError};
pub use movement::{parse_movement, MoveError, MoveInput, MoveUser};
pub use reply::Reply;
pub use session::SessionLifecycle;
pub use wizard::{CreationWizard, WizardError};
pub use world_view::{Located, TargetError, WorldView};
