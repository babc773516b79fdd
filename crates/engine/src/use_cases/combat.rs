//! Timer-driven auto-battle between one player and one enemy object.
//!
//! Each battle is a spawned task ticking on an interval until its
//! cancellation token fires. The `BattleRegistry` entry is the only proof a
//! battle is running; every transition that ends a battle claims the entry
//! through `BattleRegistry::finish`, so exactly one path applies an outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

use hexrealm_domain::{
    resolve_exchange, BattleId, BattleOutcome, Combatant, ConnectionId, Item, StrikeSource,
    User, UserId, UserMode,
};
use hexrealm_shared::{CombatResult, CombatTickData, LootData, ServerMessage};

use super::world_view::TargetError;
use super::{Reply, WorldView};
use crate::infrastructure::ports::{EventSink, ItemRepo, RandomPort, RepoError, UserRepo};
use crate::stores::{ActiveBattle, BattleRegistry};

#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("The {0} is not something you can fight.")]
    NotAnEnemy(String),
    #[error("You are already fighting the {0}.")]
    AlreadyFighting(String),
    #[error("You are not in combat.")]
    NotInCombat,
    #[error("You can't fight right now.")]
    Busy,
    #[error("Fight what?")]
    MissingTarget,
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Whether the timer should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickFlow {
    Continue,
    Stop,
}

/// Combat engine use case. Cheap to clone; timers hold a clone.
#[derive(Clone)]
pub struct CombatEngine {
    users: Arc<dyn UserRepo>,
    items: Arc<dyn ItemRepo>,
    battles: Arc<BattleRegistry>,
    events: Arc<dyn EventSink>,
    random: Arc<dyn RandomPort>,
    view: WorldView,
    tick: Duration,
}

impl CombatEngine {
    pub fn new(
        users: Arc<dyn UserRepo>,
        items: Arc<dyn ItemRepo>,
        battles: Arc<BattleRegistry>,
        events: Arc<dyn EventSink>,
        random: Arc<dyn RandomPort>,
        view: WorldView,
        tick: Duration,
    ) -> Self {
        Self {
            users,
            items,
            battles,
            events,
            random,
            view,
            tick,
        }
    }

    /// `fight <target|ordinal>`.
    ///
    /// Allowed from `IDLE`, or from `COMBAT` when no battle is registered
    /// (a battle interrupted by a disconnect resumes this way). Repeating it
    /// against the current enemy only reports the fight.
    pub async fn fight(
        &self,
        user: &User,
        connection_id: ConnectionId,
        target: &str,
    ) -> Result<Reply, CombatError> {
        if target.trim().is_empty() {
            return Err(CombatError::MissingTarget);
        }
        if !matches!(user.mode, UserMode::Idle | UserMode::Combat) {
            return Err(CombatError::Busy);
        }

        let located = self.view.find_target(user, target).await?;
        let enemy = located.item;
        if located.held || !enemy.is_enemy() {
            return Err(CombatError::NotAnEnemy(enemy.name));
        }

        if let Some(current) = self.battles.get(user.id) {
            if current.enemy_id == enemy.id {
                let mut reply = Reply::new();
                reply.info(format!(
                    "You are already fighting the {} (HP {}/{}).",
                    enemy.name, enemy.combat.hp, enemy.combat.max_hp
                ));
                return Ok(reply);
            }
            return Err(CombatError::AlreadyFighting(self.enemy_name(&current).await));
        }

        let battle = ActiveBattle::new(enemy.id, connection_id);
        if let Err(current) = self.battles.register(user.id, battle.clone()) {
            return Err(CombatError::AlreadyFighting(self.enemy_name(&current).await));
        }
        if let Err(e) = self.users.set_mode(user.id, UserMode::Combat).await {
            self.battles.finish(user.id, battle.battle_id);
            return Err(e.into());
        }
        tracing::info!(
            user_id = %user.id,
            enemy_id = %enemy.id,
            battle_id = %battle.battle_id,
            "Battle started"
        );
        self.spawn_timer(user.id, battle);

        let mut fighting = user.clone();
        fighting.mode = UserMode::Combat;
        let mut reply = Reply::new();
        reply.info(format!(
            "You engage the {} (HP {}/{})!",
            enemy.name, enemy.combat.hp, enemy.combat.max_hp
        ));
        reply.push(self.view.state_update(&fighting).await?);
        Ok(reply)
    }

    /// Leave combat with no damage and no loot.
    pub async fn retreat(&self, user: &User) -> Result<Reply, CombatError> {
        let Some(battle) = self.battles.get(user.id) else {
            if user.mode != UserMode::Combat {
                return Err(CombatError::NotInCombat);
            }
            // Persisted COMBAT with no timer: the fight died with a connection.
            return self.leave(user, "You slip away.").await;
        };

        let _turn = battle.turn.lock().await;
        if self.battles.finish(user.id, battle.battle_id).is_none() {
            return Err(CombatError::NotInCombat);
        }
        tracing::info!(user_id = %user.id, battle_id = %battle.battle_id, "Retreated");
        let name = self.enemy_name(&battle).await;
        self.leave(user, &format!("You flee from the {name}.")).await
    }

    /// Stop every battle ticking for a closed connection. Enemy HP and the
    /// persisted mode stay as they are.
    pub fn cancel_for_connection(&self, connection_id: ConnectionId) -> Vec<UserId> {
        let stopped = self.battles.cancel_for_connection(connection_id);
        for user_id in &stopped {
            tracing::info!(%user_id, %connection_id, "Battle paused by disconnect");
        }
        stopped
    }

    async fn leave(&self, user: &User, text: &str) -> Result<Reply, CombatError> {
        self.users.set_mode(user.id, UserMode::Idle).await?;
        let mut idle = user.clone();
        idle.mode = UserMode::Idle;

        let mut reply = Reply::new();
        reply.push(ServerMessage::CombatEnd {
            result: CombatResult::Retreat,
            loot: None,
        });
        reply.info(text);
        reply.push(self.view.state_update(&idle).await?);
        Ok(reply)
    }

    async fn enemy_name(&self, battle: &ActiveBattle) -> String {
        match self.items.get(battle.enemy_id).await {
            Ok(Some(item)) => item.name,
            _ => "enemy".to_string(),
        }
    }

    fn spawn_timer(&self, user_id: UserId, battle: ActiveBattle) {
        let engine = self.clone();
        tokio::spawn(async move {
            let mut interval = battle_interval(engine.tick);
            // The first tick completes immediately; the first exchange waits a full interval.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = battle.cancel.cancelled() => break,
                    _ = interval.tick() => {
                        match engine.run_tick(user_id, &battle).await {
                            Ok(TickFlow::Continue) => {}
                            Ok(TickFlow::Stop) => break,
                            Err(e) => {
                                tracing::warn!(%user_id, battle_id = %battle.battle_id, error = %e, "Combat tick failed, ending battle");
                                engine.abandon(user_id, battle.battle_id, battle.connection_id).await;
                                break;
                            }
                        }
                    }
                }
            }
            tracing::debug!(%user_id, battle_id = %battle.battle_id, "Battle timer stopped");
        });
    }

    /// One exchange. Holds the battle's turn lock for its whole duration.
    async fn run_tick(&self, user_id: UserId, battle: &ActiveBattle) -> Result<TickFlow, RepoError> {
        let _turn = battle.turn.lock().await;
        if self.battles.get(user_id).map(|b| b.battle_id) != Some(battle.battle_id) {
            return Ok(TickFlow::Stop);
        }

        let user = self.users.get(user_id).await?;
        let enemy = self.items.get(battle.enemy_id).await?;
        let (user, enemy) = match (user, enemy) {
            (Some(user), Some(enemy))
                if user.mode == UserMode::Combat && enemy.room_id().is_some() && enemy.is_enemy() =>
            {
                (user, enemy)
            }
            _ => {
                tracing::warn!(%user_id, enemy_id = %battle.enemy_id, "Combatant vanished, ending battle");
                self.abandon(user_id, battle.battle_id, battle.connection_id)
                    .await;
                return Ok(TickFlow::Stop);
            }
        };

        let player_die = self.random.gen_range(1, 6);
        let enemy_die = self.random.gen_range(1, 6);
        let exchange = resolve_exchange(
            Combatant {
                hp: user.hp,
                bonus: user.strength,
            },
            Combatant {
                hp: enemy.combat.hp,
                bonus: enemy.combat.attack,
            },
            player_die,
            enemy_die,
        );

        match exchange.source {
            StrikeSource::Player => self.items.set_combat_hp(enemy.id, exchange.enemy_hp).await?,
            StrikeSource::Enemy => self.users.set_hp(user.id, exchange.player_hp).await?,
            StrikeSource::Tie => {}
        }

        self.events
            .send_to_connection(
                battle.connection_id,
                ServerMessage::CombatUpdate(CombatTickData {
                    player_hp: exchange.player_hp,
                    player_max_hp: user.max_hp,
                    enemy_hp: exchange.enemy_hp,
                    enemy_max_hp: enemy.combat.max_hp,
                    player_roll: exchange.player_roll,
                    enemy_roll: exchange.enemy_roll,
                    damage: exchange.damage,
                    source: exchange.source,
                }),
            )
            .await;

        match exchange.outcome() {
            None => Ok(TickFlow::Continue),
            Some(BattleOutcome::Victory) => {
                self.victory(&user, &enemy, battle).await?;
                Ok(TickFlow::Stop)
            }
            Some(BattleOutcome::Defeat) => {
                self.defeat(&user, &enemy, battle).await?;
                Ok(TickFlow::Stop)
            }
        }
    }

    async fn victory(&self, user: &User, enemy: &Item, battle: &ActiveBattle) -> Result<(), RepoError> {
        if self.battles.finish(user.id, battle.battle_id).is_none() {
            return Ok(());
        }
        let gold = i64::from(enemy.combat.xp_value);
        if !self.items.delete(enemy.id).await? {
            // Another battle removed the enemy first and already paid for it.
            self.users.set_mode(user.id, UserMode::Idle).await?;
            tracing::info!(user_id = %user.id, enemy_id = %enemy.id, "Enemy already slain elsewhere");
            self.send(
                battle,
                ServerMessage::CombatEnd {
                    result: CombatResult::Retreat,
                    loot: None,
                },
            )
            .await;
            self.send(
                battle,
                ServerMessage::info(format!("Someone else slew the {} first.", enemy.name)),
            )
            .await;
            return self.send_refresh(user.id, battle).await;
        }
        self.users.add_gold(user.id, gold).await?;
        self.users.set_mode(user.id, UserMode::Idle).await?;
        tracing::info!(user_id = %user.id, enemy_id = %enemy.id, gold, "Battle won");

        self.send(
            battle,
            ServerMessage::CombatEnd {
                result: CombatResult::Win,
                loot: Some(LootData { gold }),
            },
        )
        .await;
        self.send(
            battle,
            ServerMessage::info(format!(
                "You defeated the {}! You gain {gold} gold.",
                enemy.name
            )),
        )
        .await;
        self.send_refresh(user.id, battle).await?;
        Ok(())
    }

    /// Death: full HP, back to the origin, mode `IDLE`. Gold is kept.
    async fn defeat(&self, user: &User, enemy: &Item, battle: &ActiveBattle) -> Result<(), RepoError> {
        if self.battles.finish(user.id, battle.battle_id).is_none() {
            return Ok(());
        }
        self.send(
            battle,
            ServerMessage::CombatEnd {
                result: CombatResult::Loss,
                loot: None,
            },
        )
        .await;
        self.users.respawn(user.id).await?;
        tracing::info!(user_id = %user.id, enemy_id = %enemy.id, "Battle lost, respawned");

        self.send(
            battle,
            ServerMessage::info(format!(
                "The {} strikes you down. You wake at the origin, your gold intact.",
                enemy.name
            )),
        )
        .await;
        self.send_refresh(user.id, battle).await?;
        Ok(())
    }

    /// Integrity abort: stop the battle and release the user if they still exist.
    async fn abandon(&self, user_id: UserId, battle_id: BattleId, connection_id: ConnectionId) {
        if self.battles.finish(user_id, battle_id).is_none() {
            return;
        }
        match self.users.get(user_id).await {
            Ok(Some(user)) if user.mode == UserMode::Combat => {
                if let Err(e) = self.users.set_mode(user_id, UserMode::Idle).await {
                    tracing::warn!(%user_id, error = %e, "Failed to release user from abandoned battle");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(%user_id, error = %e, "Failed to load user for abandoned battle"),
        }
        self.events
            .send_to_connection(
                connection_id,
                ServerMessage::CombatEnd {
                    result: CombatResult::Retreat,
                    loot: None,
                },
            )
            .await;
        self.events
            .send_to_connection(connection_id, ServerMessage::info("The battle fizzles out."))
            .await;
        if let Ok(Some(update)) = self.view.refresh(user_id).await {
            self.events.send_to_connection(connection_id, update).await;
        }
    }

    async fn send(&self, battle: &ActiveBattle, message: ServerMessage) {
        self.events
            .send_to_connection(battle.connection_id, message)
            .await;
    }

    async fn send_refresh(&self, user_id: UserId, battle: &ActiveBattle) -> Result<(), RepoError> {
        if let Some(update) = self.view.refresh(user_id).await? {
            self.send(battle, update).await;
        }
        Ok(())
    }
}

/// A slow store delays the next exchange instead of bursting the missed ones.
fn battle_interval(tick: Duration) -> Interval {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
