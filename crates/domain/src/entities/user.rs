//! Player accounts and their in-world state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mode::UserMode;
use crate::value_objects::{Handle, HexCoord, ServerCode};
use crate::UserId;

pub const STARTING_STRENGTH: i32 = 1;
pub const STARTING_HP: i32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub handle: Handle,
    pub server_code: ServerCode,
    pub strength: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub gold: i64,
    pub position: HexCoord,
    pub mode: UserMode,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(handle: Handle, server_code: ServerCode, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            handle,
            server_code,
            strength: STARTING_STRENGTH,
            hp: STARTING_HP,
            max_hp: STARTING_HP,
            gold: 0,
            position: HexCoord::ORIGIN,
            mode: UserMode::Idle,
            created_at: now,
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// HP after healing `amount`, clamped to max.
    pub fn healed_hp(&self, amount: i32) -> i32 {
        self.hp.saturating_add(amount.max(0)).min(self.max_hp)
    }

    /// HP after taking `amount` damage, floored at zero.
    pub fn damaged_hp(&self, amount: i32) -> i32 {
        self.hp.saturating_sub(amount.max(0)).max(0)
    }
}
