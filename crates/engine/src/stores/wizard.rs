//! Transient creation-wizard records.
//!
//! One scratch record per authoring user. Records expire after the configured
//! TTL and never survive a disconnect or a restart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use hexrealm_domain::{
    CombatStats, EffectKind, HexCoord, ItemId, Mood, ObjectKind, RoomId, ServerCode,
    ShroudLevel, UserId, Verb,
};
use tokio::sync::RwLock;

/// Partial room fields, filled one wizard step at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Steers the tapestry prompt only; never persisted.
    pub mood: Option<Mood>,
    pub shroud: Option<ShroudLevel>,
}

/// Partial object fields for the object currently being authored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ObjectKind>,
    pub effect: Option<EffectKind>,
    pub effect_value: i32,
    pub combat: Option<CombatStats>,
    pub infinite: bool,
    pub required_item: Option<String>,
    pub verb: Option<Verb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardScratch {
    pub server_code: ServerCode,
    pub position: HexCoord,
    pub room: RoomDraft,
    /// Set once the room is committed; the object loop requires it.
    pub room_id: Option<RoomId>,
    pub object: ObjectDraft,
    pub created_items: Vec<ItemId>,
}

impl WizardScratch {
    pub fn new(server_code: ServerCode, position: HexCoord) -> Self {
        Self {
            server_code,
            position,
            room: RoomDraft::default(),
            room_id: None,
            object: ObjectDraft::default(),
            created_items: Vec::new(),
        }
    }
}

struct ScratchEntry {
    scratch: WizardScratch,
    touched_at: Instant,
}

/// Scratch records keyed by user, with time-to-live expiry.
///
/// Expired records are invisible to readers but stay in memory until
/// `cleanup_expired()` runs.
pub struct WizardStore {
    entries: RwLock<HashMap<UserId, ScratchEntry>>,
    ttl: Duration,
}

impl WizardStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Store a record, replacing any existing one and resetting its TTL.
    pub async fn put(&self, user_id: UserId, scratch: WizardScratch) {
        let entry = ScratchEntry {
            scratch,
            touched_at: Instant::now(),
        };
        self.entries.write().await.insert(user_id, entry);
    }

    /// Store a record with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn put_at(&self, user_id: UserId, scratch: WizardScratch, touched_at: Instant) {
        let entry = ScratchEntry {
            scratch,
            touched_at,
        };
        self.entries.write().await.insert(user_id, entry);
    }

    pub async fn get(&self, user_id: UserId) -> Option<WizardScratch> {
        let guard = self.entries.read().await;
        guard.get(&user_id).and_then(|entry| {
            if entry.touched_at.elapsed() < self.ttl {
                Some(entry.scratch.clone())
            } else {
                None
            }
        })
    }

    pub async fn discard(&self, user_id: UserId) -> bool {
        self.entries.write().await.remove(&user_id).is_some()
    }

    /// Remove all expired records and return how many went.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| entry.touched_at.elapsed() < self.ttl);
        before_count - guard.len()
    }
}
