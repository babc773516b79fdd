//! Pure auto-battle arithmetic.
//!
//! Dice come in from the caller so a tick is fully determined by its
//! inputs.

use serde::{Deserialize, Serialize};

/// Which side landed the blow in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrikeSource {
    Player,
    Enemy,
    Tie,
}

/// Result of one combat tick before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub player_roll: i32,
    pub enemy_roll: i32,
    pub damage: i32,
    pub source: StrikeSource,
    pub player_hp: i32,
    pub enemy_hp: i32,
}

impl Exchange {
    /// The outcome check, enemy first.
    pub fn outcome(&self) -> Option<BattleOutcome> {
        if self.enemy_hp <= 0 {
            Some(BattleOutcome::Victory)
        } else if self.player_hp <= 0 {
            Some(BattleOutcome::Defeat)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// Inputs for one side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combatant {
    pub hp: i32,
    /// Strength for the player, attack for the enemy.
    pub bonus: i32,
}

/// Roll `d6 + bonus` for each side and apply the difference.
///
/// The winner deals `ceil(delta / 2)`, plus one when the player wins.
/// Equal rolls change nothing. HP never drops below zero.
pub fn resolve_exchange(
    player: Combatant,
    enemy: Combatant,
    player_die: i32,
    enemy_die: i32,
) -> Exchange {
    let player_roll = player_die + player.bonus;
    let enemy_roll = enemy_die + enemy.bonus;
    let delta = (player_roll - enemy_roll).abs();
    let half = (delta + 1) / 2;

    let (source, damage, player_hp, enemy_hp) = if player_roll > enemy_roll {
        let damage = half + 1;
        (
            StrikeSource::Player,
            damage,
            player.hp,
            (enemy.hp - damage).max(0),
        )
    } else if enemy_roll > player_roll {
        (
            StrikeSource::Enemy,
            half,
            (player.hp - half).max(0),
            enemy.hp,
        )
    } else {
        (StrikeSource::Tie, 0, player.hp, enemy.hp)
    };

    Exchange {
        player_roll,
        enemy_roll,
        damage,
        source,
        player_hp,
        enemy_hp,
    }
}
