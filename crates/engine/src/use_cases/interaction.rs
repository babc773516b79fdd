//! The generic `<verb> <object>` path: gates, effects and pickups.

use std::sync::Arc;

use hexrealm_domain::{AnimationType, EffectKind, Item, User, UserMode};
use hexrealm_shared::ServerMessage;

use super::world_view::{animation_data, TargetError};
use super::{Reply, WorldView};
use crate::infrastructure::ports::{AnimationRepo, ClockPort, ItemRepo, RepoError, UserRepo};

#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("You can't {verb} the {name}.")]
    WrongVerb { verb: String, name: String },
    #[error("You need a specific item to do that.")]
    MissingRequirement,
    #[error("The {0} is hostile! Try 'fight {0}'.")]
    Hostile(String),
    #[error("You already have the {0}.")]
    AlreadyHave(String),
    #[error("You don't see it here.")]
    Gone,
    #[error("You are in combat! Use 'retreat' to escape.")]
    InCombat,
    #[error("You can't do that right now.")]
    Busy,
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Interact with an object use case.
pub struct Interact {
    users: Arc<dyn UserRepo>,
    items: Arc<dyn ItemRepo>,
    animations: Arc<dyn AnimationRepo>,
    clock: Arc<dyn ClockPort>,
    view: WorldView,
}

impl Interact {
    pub fn new(
        users: Arc<dyn UserRepo>,
        items: Arc<dyn ItemRepo>,
        animations: Arc<dyn AnimationRepo>,
        clock: Arc<dyn ClockPort>,
        view: WorldView,
    ) -> Self {
        Self {
            users,
            items,
            animations,
            clock,
            view,
        }
    }

    pub async fn execute(
        &self,
        user: &User,
        verb: &str,
        target: &str,
    ) -> Result<Reply, InteractionError> {
        match user.mode {
            UserMode::Idle => {}
            UserMode::Combat => return Err(InteractionError::InCombat),
            _ => return Err(InteractionError::Busy),
        }

        let located = self.view.find_target(user, target).await?;
        let item = located.item;
        let verb = verb.trim().to_ascii_lowercase();
        if item.verb.as_str() != verb {
            return Err(InteractionError::WrongVerb {
                verb,
                name: item.name,
            });
        }
        if item.is_enemy() && !located.held {
            return Err(InteractionError::Hostile(item.name));
        }
        if let Some(required) = &item.required_item {
            let held = self.items.list_owned(user.id).await?;
            if !held.iter().any(|owned| owned.matches_name(required)) {
                return Err(InteractionError::MissingRequirement);
            }
        }

        let mut reply = Reply::new();
        let outcome = self.apply_effect(user, &item, located.held).await?;
        reply.info(outcome);
        tracing::debug!(
            user_id = %user.id,
            item_id = %item.id,
            effect = ?item.effect,
            "Interaction applied"
        );

        let animated = item.template_id.unwrap_or(item.id);
        if let Some(animation) = self
            .animations
            .find_for_item(animated, AnimationType::Interaction)
            .await?
        {
            reply.push(ServerMessage::AnimationPlay(animation_data(&animation)));
        }
        reply.push_opt(self.view.refresh(user.id).await?);
        Ok(reply)
    }

    /// Apply the item's single effect and describe it.
    async fn apply_effect(
        &self,
        user: &User,
        item: &Item,
        held: bool,
    ) -> Result<String, InteractionError> {
        let message = item.success_message.as_str();
        let value = item.effect_value;
        match item.effect {
            EffectKind::None => Ok(message.to_string()),
            EffectKind::Gold => {
                self.users.add_gold(user.id, i64::from(value)).await?;
                Ok(format!("{message} (+{value} gold)"))
            }
            EffectKind::Heal => {
                let hp = user.healed_hp(value);
                self.users.set_hp(user.id, hp).await?;
                Ok(format!("{message} (HP {hp}/{})", user.max_hp))
            }
            EffectKind::Damage => {
                let hp = user.damaged_hp(value);
                if hp > 0 {
                    self.users.set_hp(user.id, hp).await?;
                    return Ok(format!("{message} (-{value} HP, {hp}/{})", user.max_hp));
                }
                self.users.respawn(user.id).await?;
                tracing::info!(user_id = %user.id, item_id = %item.id, "Killed by trap, respawned");
                Ok(format!(
                    "{message} You collapse... and wake at the origin, your gold intact."
                ))
            }
            EffectKind::Item => {
                if held {
                    return Err(InteractionError::AlreadyHave(item.name.clone()));
                }
                self.pick_up(user, item).await?;
                Ok(format!("{message} (You take the {}.)", item.name))
            }
        }
    }

    async fn pick_up(&self, user: &User, item: &Item) -> Result<(), InteractionError> {
        if item.infinite {
            let owned = self.items.list_owned(user.id).await?;
            if owned
                .iter()
                .any(|held| held.id == item.id || held.template_id == Some(item.id))
            {
                return Err(InteractionError::AlreadyHave(item.name.clone()));
            }
            self.items
                .create(&item.clone_for(user.id, self.clock.now()))
                .await?;
            return Ok(());
        }

        if self.items.take(item.id, user.id).await? {
            Ok(())
        } else {
            Err(InteractionError::Gone)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockAnimationRepo, MockItemRepo, MockRoomRepo, MockUserRepo};
    use chrono::Utc;
    use hexrealm_domain::{
        CombatStats, Handle, HexCoord, ItemId, ItemPlacement, Room, ServerCode, ShroudLevel,
        Verb,
    };

    fn player() -> User {
        User::new(
            Handle::new("hero").unwrap(),
            ServerCode::new("alpha").unwrap(),
            Utc::now(),
        )
    }

    fn room(author: &User) -> Room {
        Room::new(
            author.server_code.clone(),
            HexCoord::ORIGIN,
            "Vault",
            "Dusty shelves.",
            ShroudLevel::default(),
            Some(author.id),
            Utc::now(),
        )
    }

    fn item(room: &Room, name: &str, verb: &str, effect: EffectKind, value: i32) -> Item {
        Item {
            id: ItemId::new(),
            server_code: room.server_code.clone(),
            placement: ItemPlacement::InRoom(room.id),
            name: name.to_string(),
            description: format!("A {name}."),
            success_message: "Done.".to_string(),
            verb: Verb::new(verb).unwrap(),
            effect,
            effect_value: value,
            hidden: false,
            required_item: None,
            combat: CombatStats::default(),
            infinite: false,
            template_id: None,
            creator_id: None,
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        users: MockUserRepo,
        items: MockItemRepo,
        rooms: MockRoomRepo,
    }

    impl Fixture {
        fn new(room: Room, in_room: Vec<Item>, owned: Vec<Item>) -> Self {
            let mut rooms = MockRoomRepo::new();
            let here = room.clone();
            rooms
                .expect_get_at()
                .returning(move |_, _| Ok(Some(here.clone())));
            rooms.expect_list_in_bounds().returning(|_, _| Ok(vec![]));

            let mut items = MockItemRepo::new();
            items
                .expect_list_in_room()
                .returning(move |_| Ok(in_room.clone()));
            items
                .expect_list_owned()
                .returning(move |_| Ok(owned.clone()));

            let mut users = MockUserRepo::new();
            users.expect_get().returning(|_| Ok(None));
            users.expect_list_at().returning(|_, _| Ok(vec![]));
            Self { users, items, rooms }
        }

        fn build(self) -> Interact {
            let users: Arc<dyn UserRepo> = Arc::new(self.users);
            let items: Arc<dyn ItemRepo> = Arc::new(self.items);
            let mut animations = MockAnimationRepo::new();
            animations
                .expect_find_for_item()
                .returning(|_, _| Ok(None));
            animations.expect_find_for_room().returning(|_, _| Ok(None));
            let animations: Arc<dyn AnimationRepo> = Arc::new(animations);
            let view = WorldView::new(
                users.clone(),
                Arc::new(self.rooms),
                items.clone(),
                animations.clone(),
                5,
            );
            Interact::new(users, items, animations, Arc::new(FixedClock(Utc::now())), view)
        }
    }

    #[tokio::test]
    async fn verb_must_match_exactly() {
        let user = player();
        let vault = room(&user);
        let chest = item(&vault, "Chest", "open", EffectKind::Gold, 5);
        let interact = Fixture::new(vault, vec![chest], vec![]).build();

        let err = interact.execute(&user, "kick", "chest").await.unwrap_err();
        assert_eq!(err.to_string(), "You can't kick the Chest.");
    }

    #[tokio::test]
    async fn gold_is_credited() {
        let user = player();
        let vault = room(&user);
        let chest = item(&vault, "Chest", "open", EffectKind::Gold, 5);
        let mut fixture = Fixture::new(vault, vec![chest], vec![]);
        fixture
            .users
            .expect_add_gold()
            .withf(|_, amount| *amount == 5)
            .times(1)
            .returning(|_, _| Ok(()));

        let reply = fixture.build().execute(&user, "open", "1").await.unwrap();
        assert!(matches!(
            reply.messages().first(),
            Some(ServerMessage::GameLog(line)) if line.text == "Done. (+5 gold)"
        ));
    }

    #[tokio::test]
    async fn gate_needs_the_named_item_in_inventory() {
        let user = player();
        let vault = room(&user);
        let mut door = item(&vault, "Door", "open", EffectKind::None, 0);
        door.required_item = Some("brass key".to_string());
        let interact = Fixture::new(vault, vec![door], vec![]).build();

        let err = interact.execute(&user, "open", "door").await.unwrap_err();
        assert!(matches!(err, InteractionError::MissingRequirement));
    }

    #[tokio::test]
    async fn gate_opens_with_key_held() {
        let user = player();
        let vault = room(&user);
        let mut door = item(&vault, "Door", "open", EffectKind::None, 0);
        door.required_item = Some("brass key".to_string());
        let mut key = item(&vault, "Brass Key", "take", EffectKind::Item, 0);
        key.placement = ItemPlacement::HeldBy(user.id);
        let interact = Fixture::new(vault, vec![door], vec![key]).build();

        assert!(interact.execute(&user, "open", "door").await.is_ok());
    }

    #[tokio::test]
    async fn lethal_trap_respawns() {
        let mut user = player();
        user.hp = 3;
        let vault = room(&user);
        let spikes = item(&vault, "Spikes", "touch", EffectKind::Damage, 10);
        let mut fixture = Fixture::new(vault, vec![spikes], vec![]);
        fixture.users.expect_set_hp().never();
        fixture.users.expect_respawn().times(1).returning(|_| Ok(()));

        assert!(fixture.build().execute(&user, "touch", "spikes").await.is_ok());
    }

    #[tokio::test]
    async fn lost_pickup_race_reports_gone() {
        let user = player();
        let vault = room(&user);
        let gem = item(&vault, "Gem", "take", EffectKind::Item, 0);
        let mut fixture = Fixture::new(vault, vec![gem], vec![]);
        fixture.items.expect_take().returning(|_, _| Ok(false));

        let err = fixture.build().execute(&user, "take", "gem").await.unwrap_err();
        assert_eq!(err.to_string(), "You don't see it here.");
    }

    #[tokio::test]
    async fn infinite_template_is_cloned_once_per_user() {
        let user = player();
        let vault = room(&user);
        let mut torch = item(&vault, "Torch", "take", EffectKind::Item, 0);
        torch.infinite = true;
        let clone = torch.clone_for(user.id, Utc::now());

        let mut fixture = Fixture::new(vault.clone(), vec![torch.clone()], vec![]);
        let template_id = torch.id;
        fixture
            .items
            .expect_create()
            .withf(move |created| created.template_id == Some(template_id))
            .times(1)
            .returning(|_| Ok(()));
        fixture.items.expect_take().never();
        assert!(fixture.build().execute(&user, "take", "1").await.is_ok());

        let again = Fixture::new(vault, vec![torch], vec![clone]).build();
        // The template is still listed; the held clone blocks a second copy.
        let err = again.execute(&user, "take", "1").await.unwrap_err();
        assert!(matches!(err, InteractionError::AlreadyHave(_)));
    }

    #[tokio::test]
    async fn enemies_refuse_peaceful_verbs() {
        let user = player();
        let vault = room(&user);
        let mut rat = item(&vault, "Rat", "pet", EffectKind::None, 0);
        rat.combat = CombatStats::enemy(5, 1, 2);
        let interact = Fixture::new(vault, vec![rat], vec![]).build();

        let err = interact.execute(&user, "pet", "rat").await.unwrap_err();
        assert!(matches!(err, InteractionError::Hostile(_)));
    }
}
