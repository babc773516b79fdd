//! Registry of running battles.
//!
//! The single source of truth for "is this user fighting right now". At most
//! one entry exists per user; the entry owns the cancellation token of the
//! battle's tick task.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hexrealm_domain::{BattleId, ConnectionId, ItemId, UserId};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ActiveBattle {
    pub battle_id: BattleId,
    pub enemy_id: ItemId,
    pub connection_id: ConnectionId,
    pub cancel: CancellationToken,
    /// Held while a tick or a retreat mutates the battle.
    pub turn: Arc<Mutex<()>>,
}

impl ActiveBattle {
    pub fn new(enemy_id: ItemId, connection_id: ConnectionId) -> Self {
        Self {
            battle_id: BattleId::new(),
            enemy_id,
            connection_id,
            cancel: CancellationToken::new(),
            turn: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Default)]
pub struct BattleRegistry {
    battles: DashMap<UserId, ActiveBattle>,
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: UserId) -> Option<ActiveBattle> {
        self.battles.get(&user_id).map(|entry| entry.value().clone())
    }

    pub fn is_fighting(&self, user_id: UserId) -> bool {
        self.battles.contains_key(&user_id)
    }

    /// Register a battle unless the user already has one, which is returned.
    pub fn register(&self, user_id: UserId, battle: ActiveBattle) -> Result<(), ActiveBattle> {
        match self.battles.entry(user_id) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(battle);
                Ok(())
            }
        }
    }

    /// Remove the battle if it is still `battle_id` and stop its timer.
    ///
    /// Exactly one caller wins; everyone else gets `None`.
    pub fn finish(&self, user_id: UserId, battle_id: BattleId) -> Option<ActiveBattle> {
        let (_, battle) = self
            .battles
            .remove_if(&user_id, |_, battle| battle.battle_id == battle_id)?;
        battle.cancel.cancel();
        Some(battle)
    }

    /// Stop every battle driven by `connection_id`. Persisted state is untouched.
    pub fn cancel_for_connection(&self, connection_id: ConnectionId) -> Vec<UserId> {
        let owners: Vec<(UserId, BattleId)> = self
            .battles
            .iter()
            .filter(|entry| entry.value().connection_id == connection_id)
            .map(|entry| (*entry.key(), entry.value().battle_id))
            .collect();

        owners
            .into_iter()
            .filter_map(|(user_id, battle_id)| {
                self.finish(user_id, battle_id).map(|_| user_id)
            })
            .collect()
    }
}
