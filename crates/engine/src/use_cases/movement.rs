//! Movement across the hex grid.
//!
//! Walking into a coordinate with no room always starts the creation wizard;
//! unexplored space is never granted a default room.

use std::sync::Arc;

use hexrealm_domain::{move_axial, Direction, User, UserMode};

use super::wizard::TITLE_PROMPT;
use super::{Reply, WorldView};
use crate::infrastructure::ports::{RepoError, RoomRepo, UserRepo};
use crate::stores::{WizardScratch, WizardStore};

/// What a raw command means to the movement resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveInput {
    /// Not a movement command; other handlers may claim it.
    NotMovement,
    Step(Direction),
    /// `go` followed by something that isn't a direction.
    UnknownDirection(String),
}

/// Accepts `n`, `north`, `go n`, `go north` (any case).
pub fn parse_movement(input: &str) -> MoveInput {
    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return MoveInput::NotMovement;
    };
    let rest: Vec<&str> = words.collect();

    if first.eq_ignore_ascii_case("go") {
        return match rest.as_slice() {
            [word] => Direction::parse(word)
                .map(MoveInput::Step)
                .unwrap_or_else(|| MoveInput::UnknownDirection((*word).to_string())),
            _ => MoveInput::UnknownDirection(rest.join(" ")),
        };
    }

    match (Direction::parse(first), rest.is_empty()) {
        (Some(direction), true) => MoveInput::Step(direction),
        _ => MoveInput::NotMovement,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("Unknown direction '{0}'. Try n, s, ne, se, nw or sw.")]
    UnknownDirection(String),
    #[error("You are in combat! Use 'retreat' to escape.")]
    InCombat,
    #[error("You can't move right now.")]
    Busy,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Move user use case.
pub struct MoveUser {
    users: Arc<dyn UserRepo>,
    rooms: Arc<dyn RoomRepo>,
    wizard: Arc<WizardStore>,
    view: WorldView,
}

impl MoveUser {
    pub fn new(
        users: Arc<dyn UserRepo>,
        rooms: Arc<dyn RoomRepo>,
        wizard: Arc<WizardStore>,
        view: WorldView,
    ) -> Self {
        Self {
            users,
            rooms,
            wizard,
            view,
        }
    }

    pub async fn execute(&self, user: &User, direction: Direction) -> Result<Reply, MoveError> {
        match user.mode {
            UserMode::Idle => {}
            UserMode::Combat => return Err(MoveError::InCombat),
            _ => return Err(MoveError::Busy),
        }

        let destination = move_axial(user.position, direction);
        self.users.set_position(user.id, destination).await?;

        let mut moved = user.clone();
        moved.position = destination;

        if self
            .rooms
            .get_at(&user.server_code, destination)
            .await?
            .is_some()
        {
            tracing::debug!(user_id = %user.id, %destination, "Entered room");
            let mut reply = Reply::new();
            reply.info(format!("You head {direction}."));
            reply.extend(self.view.arrival(&moved).await?);
            return Ok(reply);
        }

        tracing::debug!(user_id = %user.id, %destination, "Stepped into the void, starting wizard");
        self.wizard
            .put(
                user.id,
                WizardScratch::new(user.server_code.clone(), destination),
            )
            .await;
        self.users
            .set_mode(user.id, UserMode::CreatingRoomTitle)
            .await?;
        moved.mode = UserMode::CreatingRoomTitle;

        let mut reply = Reply::new();
        reply.info(format!(
            "You head {direction} into unexplored void. Nothing exists here until you imagine it."
        ));
        reply.push(self.view.state_update(&moved).await?);
        reply.prompt(TITLE_PROMPT);
        Ok(reply)
    }
}
