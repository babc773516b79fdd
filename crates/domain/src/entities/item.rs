//! Items: room fixtures, inventory objects and enemies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{ServerCode, Verb};
use crate::{ItemId, RoomId, UserId};

/// Where an item is. Placed in a room XOR held by a user, never both
/// and never neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemPlacement {
    InRoom(RoomId),
    HeldBy(UserId),
}

impl ItemPlacement {
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            ItemPlacement::InRoom(id) => Some(*id),
            ItemPlacement::HeldBy(_) => None,
        }
    }

    pub fn owner_id(&self) -> Option<UserId> {
        match self {
            ItemPlacement::HeldBy(id) => Some(*id),
            ItemPlacement::InRoom(_) => None,
        }
    }

    /// Rebuild from the two nullable store columns.
    pub fn from_columns(
        room_id: Option<RoomId>,
        owner_id: Option<UserId>,
    ) -> Result<Self, DomainError> {
        match (room_id, owner_id) {
            (Some(room), None) => Ok(ItemPlacement::InRoom(room)),
            (None, Some(owner)) => Ok(ItemPlacement::HeldBy(owner)),
            (Some(_), Some(_)) => Err(DomainError::parse("item is both placed and owned")),
            (None, None) => Err(DomainError::parse("item is neither placed nor owned")),
        }
    }
}

/// The single effect an interaction applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    Gold,
    Heal,
    Damage,
    #[default]
    None,
    Item,
}

impl EffectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Gold => "GOLD",
            EffectKind::Heal => "HEAL",
            EffectKind::Damage => "DAMAGE",
            EffectKind::None => "NONE",
            EffectKind::Item => "ITEM",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOLD" => Ok(EffectKind::Gold),
            "HEAL" => Ok(EffectKind::Heal),
            "DAMAGE" => Ok(EffectKind::Damage),
            "NONE" => Ok(EffectKind::None),
            "ITEM" => Ok(EffectKind::Item),
            other => Err(DomainError::parse(format!("unknown effect kind '{other}'"))),
        }
    }
}

/// Enemy stats. All zero for anything that is not an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CombatStats {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub xp_value: i32,
}

impl CombatStats {
    pub fn enemy(hp: i32, attack: i32, xp_value: i32) -> Self {
        Self {
            hp,
            max_hp: hp,
            attack,
            xp_value,
        }
    }
}

/// The object categories offered by the authoring wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Flavor,
    Treasure,
    BuffTrap,
    Pickup,
    Enemy,
    Gate,
}

impl ObjectKind {
    pub const MENU: [ObjectKind; 6] = [
        ObjectKind::Flavor,
        ObjectKind::Treasure,
        ObjectKind::BuffTrap,
        ObjectKind::Pickup,
        ObjectKind::Enemy,
        ObjectKind::Gate,
    ];

    pub fn from_menu(choice: u8) -> Result<ObjectKind, DomainError> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::MENU.get(index as usize))
            .copied()
            .ok_or_else(|| DomainError::out_of_range("Object type", 1, Self::MENU.len() as i64))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ObjectKind::Flavor => "Flavor",
            ObjectKind::Treasure => "Treasure",
            ObjectKind::BuffTrap => "Buff/Trap",
            ObjectKind::Pickup => "Pickup",
            ObjectKind::Enemy => "Enemy",
            ObjectKind::Gate => "Gate",
        }
    }

    pub fn default_verb(&self) -> &'static str {
        match self {
            ObjectKind::Flavor => "examine",
            ObjectKind::Treasure => "open",
            ObjectKind::BuffTrap => "touch",
            ObjectKind::Pickup => "take",
            ObjectKind::Enemy => "fight",
            ObjectKind::Gate => "open",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub server_code: ServerCode,
    pub placement: ItemPlacement,
    pub name: String,
    pub description: String,
    pub success_message: String,
    pub verb: Verb,
    pub effect: EffectKind,
    pub effect_value: i32,
    pub hidden: bool,
    /// Name of the item a player must hold before this one responds.
    pub required_item: Option<String>,
    pub combat: CombatStats,
    /// Template pickups are cloned per acquiring user instead of moved.
    pub infinite: bool,
    /// Set on clones of an infinite template.
    pub template_id: Option<ItemId>,
    pub creator_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn room_id(&self) -> Option<RoomId> {
        self.placement.room_id()
    }

    pub fn owner_id(&self) -> Option<UserId> {
        self.placement.owner_id()
    }

    /// Enemies are items with positive combat HP.
    pub fn is_enemy(&self) -> bool {
        self.combat.hp > 0
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// A private copy of an infinite template for `owner`.
    pub fn clone_for(&self, owner: UserId, now: DateTime<Utc>) -> Item {
        Item {
            id: ItemId::new(),
            placement: ItemPlacement::HeldBy(owner),
            infinite: false,
            template_id: Some(self.id),
            created_at: now,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup(infinite: bool) -> Item {
        Item {
            id: ItemId::new(),
            server_code: ServerCode::new("alpha").unwrap(),
            placement: ItemPlacement::InRoom(RoomId::new()),
            name: "Brass Key".to_string(),
            description: "Small and warm.".to_string(),
            success_message: "You pocket the key.".to_string(),
            verb: Verb::new("take").unwrap(),
            effect: EffectKind::Item,
            effect_value: 0,
            hidden: false,
            required_item: None,
            combat: CombatStats::default(),
            infinite,
            template_id: None,
            creator_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn placement_columns_must_be_exclusive() {
        let room = RoomId::new();
        let user = UserId::new();
        assert!(ItemPlacement::from_columns(Some(room), None).is_ok());
        assert!(ItemPlacement::from_columns(None, Some(user)).is_ok());
        assert!(ItemPlacement::from_columns(Some(room), Some(user)).is_err());
        assert!(ItemPlacement::from_columns(None, None).is_err());
    }

    #[test]
    fn clones_point_back_at_their_template() {
        let template = pickup(true);
        let owner = UserId::new();
        let copy = template.clone_for(owner, Utc::now());
        assert_ne!(copy.id, template.id);
        assert_eq!(copy.owner_id(), Some(owner));
        assert_eq!(copy.room_id(), None);
        assert_eq!(copy.template_id, Some(template.id));
        assert!(!copy.infinite);
    }

    #[test]
    fn name_matching_ignores_case() {
        assert!(pickup(false).matches_name("brass key "));
        let mut relic = pickup(false);
        relic.name = "Émeraude Œil".to_string();
        assert!(relic.matches_name("émeraude œil"));
        assert!(!relic.matches_name("emeraude oeil"));
    }

    #[test]
    fn object_menu_and_default_verbs() {
        assert_eq!(ObjectKind::from_menu(5).unwrap(), ObjectKind::Enemy);
        assert!(ObjectKind::from_menu(7).is_err());
        assert_eq!(ObjectKind::Pickup.default_verb(), "take");
    }
}
