//! Command dispatcher.
//!
//! Routes one raw command to exactly one handler based on the user's
//! persisted mode. Wizard and generation modes own every command; otherwise
//! precedence is literal commands, movement, combat, `open`, then the generic
//! `<verb> <object>` interaction.

use std::sync::Arc;

use hexrealm_domain::{ConnectionId, User, UserId, UserMode};

use super::assets::RegenerateError;
use super::combat::CombatError;
use super::interaction::InteractionError;
use super::movement::{parse_movement, MoveError, MoveInput};
use super::world_view::TargetError;
use super::{
    CombatEngine, CreationWizard, Interact, MoveUser, RegenerateRoomArt, Reply, WizardError,
    WorldView,
};
use crate::infrastructure::ports::{RepoError, UserRepo};

/// Verbs the generic interaction path never claims.
const NON_INTERACTION_VERBS: &[&str] = &["go", "help", "fight", "open"];

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("I don't understand '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),
    #[error("{0}")]
    Usage(&'static str),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error(transparent)]
    Regenerate(#[from] RegenerateError),
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl CommandError {
    /// Store failures are logged, not shown.
    fn is_internal(&self) -> bool {
        matches!(
            self,
            CommandError::Repo(_)
                | CommandError::Target(TargetError::Repo(_))
                | CommandError::Move(MoveError::Repo(_))
                | CommandError::Wizard(WizardError::Repo(_))
                | CommandError::Combat(CombatError::Repo(_))
                | CommandError::Combat(CombatError::Target(TargetError::Repo(_)))
                | CommandError::Interaction(InteractionError::Repo(_))
                | CommandError::Interaction(InteractionError::Target(TargetError::Repo(_)))
                | CommandError::Regenerate(RegenerateError::Repo(_))
        )
    }
}

pub struct CommandDispatcher {
    users: Arc<dyn UserRepo>,
    view: WorldView,
    movement: MoveUser,
    wizard: Arc<CreationWizard>,
    combat: CombatEngine,
    interact: Interact,
    regenerate: RegenerateRoomArt,
}

impl CommandDispatcher {
    pub fn new(
        users: Arc<dyn UserRepo>,
        view: WorldView,
        movement: MoveUser,
        wizard: Arc<CreationWizard>,
        combat: CombatEngine,
        interact: Interact,
        regenerate: RegenerateRoomArt,
    ) -> Self {
        Self {
            users,
            view,
            movement,
            wizard,
            combat,
            interact,
            regenerate,
        }
    }

    /// Handle one `cmd:input`. Never fails; errors become `game:log` lines.
    pub async fn dispatch(&self, user_id: UserId, connection_id: ConnectionId, raw: &str) -> Reply {
        let user = match self.users.get(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Reply::with_error("Your character could not be found."),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to load user for command");
                return Reply::with_error(GENERIC_FAILURE);
            }
        };
        tracing::debug!(%user_id, mode = %user.mode, command = raw, "Dispatching command");

        let result = self.route(&user, connection_id, raw).await;
        self.settle(&user, result)
    }

    /// Handle `combat:retreat`.
    pub async fn retreat(&self, user_id: UserId) -> Reply {
        let user = match self.users.get(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Reply::with_error("Your character could not be found."),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to load user for retreat");
                return Reply::with_error(GENERIC_FAILURE);
            }
        };
        let result = self.combat.retreat(&user).await.map_err(CommandError::from);
        self.settle(&user, result)
    }

    fn settle(&self, user: &User, result: Result<Reply, CommandError>) -> Reply {
        match result {
            Ok(reply) => reply,
            Err(e) if e.is_internal() => {
                tracing::warn!(user_id = %user.id, error = %e, "Command failed");
                Reply::with_error(GENERIC_FAILURE)
            }
            Err(e) => Reply::with_error(e.to_string()),
        }
    }

    async fn route(
        &self,
        user: &User,
        connection_id: ConnectionId,
        raw: &str,
    ) -> Result<Reply, CommandError> {
        match user.mode {
            UserMode::Idle | UserMode::Combat => self.route_world(user, connection_id, raw).await,
            UserMode::CreatingRoomTitle
            | UserMode::CreatingRoomDescription
            | UserMode::CreatingRoomMood
            | UserMode::CreatingRoomShroud
            | UserMode::CreatingObjectConfirm
            | UserMode::CreatingObjectName
            | UserMode::CreatingObjectDescription
            | UserMode::CreatingObjectType
            | UserMode::CreatingObjectValue
            | UserMode::CreatingObjectEnemyStats
            | UserMode::CreatingObjectPickupKind
            | UserMode::CreatingObjectGate
            | UserMode::CreatingObjectVerb
            | UserMode::CreatingObjectMessage
            | UserMode::GeneratingAnimations => Ok(self.wizard.handle(user, raw).await?),
        }
    }

    async fn route_world(
        &self,
        user: &User,
        connection_id: ConnectionId,
        raw: &str,
    ) -> Result<Reply, CommandError> {
        let raw = raw.trim();
        let (word, rest) = match raw.split_once(char::is_whitespace) {
            Some((word, rest)) => (word.to_ascii_lowercase(), rest.trim()),
            None => (raw.to_ascii_lowercase(), ""),
        };
        if word.is_empty() {
            return Ok(Reply::new());
        }
        let argument = Some(rest).filter(|rest| !rest.is_empty());

        match word.as_str() {
            "help" => return Ok(self.view.help(user).await?),
            "look" => return Ok(self.view.look(user, argument).await?),
            "regenerate" => return Ok(self.regenerate.execute(user, argument).await?),
            "inventory" | "inv" | "i" => return Ok(self.view.inventory(user).await?),
            _ => {}
        }

        match parse_movement(raw) {
            MoveInput::Step(direction) => return Ok(self.movement.execute(user, direction).await?),
            MoveInput::UnknownDirection(word) => {
                return Err(MoveError::UnknownDirection(word).into())
            }
            MoveInput::NotMovement => {}
        }

        match word.as_str() {
            "fight" => Ok(self.combat.fight(user, connection_id, rest).await?),
            "retreat" => Ok(self.combat.retreat(user).await?),
            "open" => match argument {
                Some(target) => Ok(self.interact.execute(user, "open", target).await?),
                None => Err(CommandError::Usage("Open what?")),
            },
            verb if !NON_INTERACTION_VERBS.contains(&verb) && argument.is_some() => {
                Ok(self.interact.execute(user, verb, rest).await?)
            }
            _ => Err(CommandError::Unknown(raw.to_string())),
        }
    }
}

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
