//! Connect and disconnect handling for a player's realtime session.

use std::sync::Arc;

use hexrealm_domain::{ConnectionId, User, UserId, UserMode};

use super::{CombatEngine, CreationWizard, Reply, WizardError, WorldView};
use crate::infrastructure::ports::RepoError;
use crate::stores::WizardStore;

pub struct SessionLifecycle {
    view: WorldView,
    wizard: Arc<CreationWizard>,
    combat: CombatEngine,
    scratch: Arc<WizardStore>,
}

impl SessionLifecycle {
    pub fn new(
        view: WorldView,
        wizard: Arc<CreationWizard>,
        combat: CombatEngine,
        scratch: Arc<WizardStore>,
    ) -> Self {
        Self {
            view,
            wizard,
            combat,
            scratch,
        }
    }

    /// Greeting, room, full snapshot, and whatever the player was doing.
    pub async fn connect(&self, user: &User) -> Result<Reply, RepoError> {
        let mut reply = Reply::new();
        reply.info(format!(
            "Welcome, {}. You stand in the realm of {}.",
            user.handle, user.server_code
        ));
        reply.extend(self.view.arrival(user).await?);

        if user.mode == UserMode::Combat {
            reply.info("An enemy still stands before you. 'fight' it again or 'retreat'.");
        }
        match self.wizard.resume(user).await {
            Ok(resumed) => {
                reply.extend(resumed);
            }
            Err(WizardError::Repo(e)) => return Err(e),
            Err(WizardError::NotAuthoring) => {}
        }
        Ok(reply)
    }

    /// Stop battles driven by the closed connection. Scratch records are
    /// dropped once the player has no connection left.
    pub async fn disconnect(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        remaining_connections: usize,
    ) {
        let stopped = self.combat.cancel_for_connection(connection_id);
        let discarded = if remaining_connections == 0 {
            self.scratch.discard(user_id).await
        } else {
            false
        };
        tracing::info!(
            %user_id,
            %connection_id,
            battles_stopped = stopped.len(),
            scratch_discarded = discarded,
            "Session closed"
        );
    }
}
