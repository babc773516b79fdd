//! Room and object creation wizard.
//!
//! A strictly linear state machine over the `CREATING_*` modes. Each step
//! validates one answer, records it in the user's scratch record, advances the
//! persisted mode and prompts for the next answer. Invalid answers re-prompt
//! without touching the mode or the scratch record.
//!
//! Every step after the title needs the previous step's output in scratch. A
//! missing record (restart, disconnect, expiry) aborts the session back to
//! `IDLE` instead of guessing.

use std::sync::{Arc, OnceLock};

use hexrealm_domain::{
    clean_text, CombatStats, DomainError, EffectKind, Item, ItemId, ItemPlacement, Mood,
    ObjectKind, Room, ShroudLevel, User, UserMode, Verb,
};
use hexrealm_shared::ServerMessage;

use super::{AssetGenerator, Reply, WorldView};
use crate::infrastructure::ports::{ClockPort, EventSink, ItemRepo, RepoError, RoomRepo, UserRepo};
use crate::stores::{GenerationJobs, ObjectDraft, WizardScratch, WizardStore};

pub const TITLE_PROMPT: &str = "Name this place (title, up to 80 characters):";

const MAX_TITLE: usize = 80;
const MAX_ROOM_DESCRIPTION: usize = 1000;
const MAX_OBJECT_NAME: usize = 60;
const MAX_OBJECT_DESCRIPTION: usize = 500;
const MAX_MESSAGE: usize = 200;

static ENEMY_STATS: OnceLock<regex_lite::Regex> = OnceLock::new();

fn enemy_stats_pattern() -> &'static regex_lite::Regex {
    ENEMY_STATS.get_or_init(|| {
        regex_lite::Regex::new(r"^\s*(\d{1,4})[\s,/]+(\d{1,4})[\s,/]+(\d{1,5})\s*$")
            .expect("ENEMY_STATS pattern is invalid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("You are not creating anything right now.")]
    NotAuthoring,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Creation wizard use case.
pub struct CreationWizard {
    users: Arc<dyn UserRepo>,
    rooms: Arc<dyn RoomRepo>,
    items: Arc<dyn ItemRepo>,
    store: Arc<WizardStore>,
    jobs: Arc<GenerationJobs>,
    assets: AssetGenerator,
    events: Arc<dyn EventSink>,
    view: WorldView,
    clock: Arc<dyn ClockPort>,
}

impl CreationWizard {
    pub fn new(
        users: Arc<dyn UserRepo>,
        rooms: Arc<dyn RoomRepo>,
        items: Arc<dyn ItemRepo>,
        store: Arc<WizardStore>,
        jobs: Arc<GenerationJobs>,
        assets: AssetGenerator,
        events: Arc<dyn EventSink>,
        view: WorldView,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            users,
            rooms,
            items,
            store,
            jobs,
            assets,
            events,
            view,
            clock,
        }
    }

    /// Feed one line of input to the step the user is on.
    pub async fn handle(&self, user: &User, input: &str) -> Result<Reply, WizardError> {
        let input = input.trim();
        match user.mode {
            UserMode::Idle | UserMode::Combat => return Err(WizardError::NotAuthoring),
            UserMode::GeneratingAnimations => return self.while_generating(user).await,
            _ => {}
        }

        let scratch = match self.store.get(user.id).await {
            Some(scratch) => scratch,
            None if user.mode == UserMode::CreatingRoomTitle => {
                WizardScratch::new(user.server_code.clone(), user.position)
            }
            None => return self.expire(user).await,
        };

        match user.mode {
            UserMode::Idle | UserMode::Combat => Err(WizardError::NotAuthoring),
            UserMode::GeneratingAnimations => self.while_generating(user).await,
            UserMode::CreatingRoomTitle => self.room_title(user, scratch, input).await,
            UserMode::CreatingRoomDescription => {
                self.room_description(user, scratch, input).await
            }
            UserMode::CreatingRoomMood => self.room_mood(user, scratch, input).await,
            UserMode::CreatingRoomShroud => self.room_shroud(user, scratch, input).await,
            UserMode::CreatingObjectConfirm => self.object_confirm(user, scratch, input).await,
            UserMode::CreatingObjectName => self.object_name(user, scratch, input).await,
            UserMode::CreatingObjectDescription => {
                self.object_description(user, scratch, input).await
            }
            UserMode::CreatingObjectType => self.object_type(user, scratch, input).await,
            UserMode::CreatingObjectValue => self.object_value(user, scratch, input).await,
            UserMode::CreatingObjectEnemyStats => self.enemy_stats(user, scratch, input).await,
            UserMode::CreatingObjectPickupKind => self.pickup_kind(user, scratch, input).await,
            UserMode::CreatingObjectGate => self.gate(user, scratch, input).await,
            UserMode::CreatingObjectVerb => self.object_verb(user, scratch, input).await,
            UserMode::CreatingObjectMessage => self.object_message(user, scratch, input).await,
        }
    }

    /// Tell a (re)connecting author where they are, or expire a lost session.
    pub async fn resume(&self, user: &User) -> Result<Reply, WizardError> {
        match user.mode {
            UserMode::Idle | UserMode::Combat => Ok(Reply::new()),
            UserMode::GeneratingAnimations => self.while_generating(user).await,
            UserMode::CreatingRoomTitle => {
                let scratch = match self.store.get(user.id).await {
                    Some(scratch) if scratch.position == user.position => scratch,
                    _ => WizardScratch::new(user.server_code.clone(), user.position),
                };
                self.store.put(user.id, scratch).await;
                let mut reply = Reply::new();
                reply.prompt(TITLE_PROMPT);
                Ok(reply)
            }
            mode => match self.store.get(user.id).await {
                Some(scratch) => {
                    let mut reply = Reply::new();
                    reply.prompt(prompt_for(mode, &scratch));
                    Ok(reply)
                }
                None => self.expire(user).await,
            },
        }
    }

    // -------------------------------------------------------------------------
    // Room steps
    // -------------------------------------------------------------------------

    async fn room_title(
        &self,
        user: &User,
        scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        let mut scratch = if scratch.position == user.position {
            scratch
        } else {
            WizardScratch::new(user.server_code.clone(), user.position)
        };
        match clean_text(input, "Title", MAX_TITLE) {
            Ok(title) => scratch.room.title = Some(title),
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingRoomDescription, None)
            .await
    }

    async fn room_description(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.room.title.is_none() {
            return self.expire(user).await;
        }
        match clean_text(input, "Description", MAX_ROOM_DESCRIPTION) {
            Ok(description) => scratch.room.description = Some(description),
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingRoomMood, None)
            .await
    }

    async fn room_mood(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.room.description.is_none() {
            return self.expire(user).await;
        }
        let choice = parse_in_range(input, "Mood choice", 1, Mood::MENU.len() as i64)
            .and_then(|n| Mood::from_menu(n as u8));
        match choice {
            Ok(mood) => scratch.room.mood = Some(mood),
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingRoomShroud, None)
            .await
    }

    /// Last room step: commits the room.
    async fn room_shroud(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        let (Some(title), Some(description), Some(_)) = (
            scratch.room.title.clone(),
            scratch.room.description.clone(),
            scratch.room.mood,
        ) else {
            return self.expire(user).await;
        };
        let shroud = match parse_in_range(input, "Shroud level", 0, i64::from(ShroudLevel::MAX))
            .and_then(|n| ShroudLevel::new(n as u8))
        {
            Ok(shroud) => shroud,
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        };

        let room = Room::new(
            scratch.server_code.clone(),
            scratch.position,
            title,
            description,
            shroud,
            Some(user.id),
            self.clock.now(),
        );
        match self.rooms.create(&room).await {
            Ok(()) => {}
            Err(e) if e.is_constraint() => return self.lost_race(user).await,
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %user.id, room_id = %room.id, position = %room.position, "Room created");

        scratch.room.shroud = Some(shroud);
        scratch.room_id = Some(room.id);
        let note = format!("{} now exists at {}.", room.title, room.position);
        self.advance(user, scratch, UserMode::CreatingObjectConfirm, Some(note))
            .await
    }

    // -------------------------------------------------------------------------
    // Object loop
    // -------------------------------------------------------------------------

    async fn object_confirm(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.room_id.is_none() {
            return self.expire(user).await;
        }
        match input.to_ascii_lowercase().as_str() {
            "y" | "yes" => {
                scratch.object = ObjectDraft::default();
                self.advance(user, scratch, UserMode::CreatingObjectName, None)
                    .await
            }
            "n" | "no" => self.finish(user, scratch).await,
            _ => Ok(self.invalid(
                user.mode,
                &scratch,
                DomainError::validation("Please answer y or n."),
            )),
        }
    }

    async fn object_name(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.room_id.is_none() {
            return self.expire(user).await;
        }
        match clean_text(input, "Name", MAX_OBJECT_NAME) {
            Ok(name) => scratch.object.name = Some(name),
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingObjectDescription, None)
            .await
    }

    async fn object_description(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.object.name.is_none() {
            return self.expire(user).await;
        }
        match clean_text(input, "Description", MAX_OBJECT_DESCRIPTION) {
            Ok(description) => scratch.object.description = Some(description),
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingObjectType, None)
            .await
    }

    async fn object_type(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.object.description.is_none() {
            return self.expire(user).await;
        }
        let kind = match parse_in_range(input, "Object type", 1, ObjectKind::MENU.len() as i64)
            .and_then(|n| ObjectKind::from_menu(n as u8))
        {
            Ok(kind) => kind,
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        };

        scratch.object.kind = Some(kind);
        scratch.object.effect = Some(match kind {
            ObjectKind::Pickup => EffectKind::Item,
            ObjectKind::Treasure => EffectKind::Gold,
            ObjectKind::Flavor | ObjectKind::BuffTrap | ObjectKind::Enemy | ObjectKind::Gate => {
                EffectKind::None
            }
        });
        let next = match kind {
            ObjectKind::Flavor => UserMode::CreatingObjectVerb,
            ObjectKind::Treasure | ObjectKind::BuffTrap => UserMode::CreatingObjectValue,
            ObjectKind::Pickup => UserMode::CreatingObjectPickupKind,
            ObjectKind::Enemy => UserMode::CreatingObjectEnemyStats,
            ObjectKind::Gate => UserMode::CreatingObjectGate,
        };
        self.advance(user, scratch, next, None).await
    }

    async fn object_value(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        let parsed = match scratch.object.kind {
            Some(ObjectKind::Treasure) => {
                parse_in_range(input, "Gold amount", 1, 9999).map(|v| (EffectKind::Gold, v))
            }
            Some(ObjectKind::BuffTrap) => {
                parse_in_range(input, "Effect value", -999, 999).and_then(|v| match v {
                    0 => Err(DomainError::validation(
                        "Effect value cannot be 0 (positive heals, negative damages).",
                    )),
                    v if v > 0 => Ok((EffectKind::Heal, v)),
                    v => Ok((EffectKind::Damage, -v)),
                })
            }
            _ => return self.expire(user).await,
        };
        match parsed {
            Ok((effect, value)) => {
                scratch.object.effect = Some(effect);
                scratch.object.effect_value = value as i32;
            }
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingObjectVerb, None)
            .await
    }

    async fn enemy_stats(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.object.kind != Some(ObjectKind::Enemy) {
            return self.expire(user).await;
        }
        match parse_enemy_stats(input) {
            Ok(stats) => {
                scratch.object.combat = Some(stats);
                scratch.object.effect = Some(EffectKind::None);
            }
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingObjectVerb, None)
            .await
    }

    async fn pickup_kind(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        if scratch.object.kind != Some(ObjectKind::Pickup) {
            return self.expire(user).await;
        }
        match parse_in_range(input, "Pickup kind", 1, 2) {
            Ok(choice) => {
                scratch.object.infinite = choice == 2;
                scratch.object.effect = Some(EffectKind::Item);
            }
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingObjectVerb, None)
            .await
    }

    /// The requirement is stored by name. An unknown name still creates the
    /// gate; the prerequisite may be authored later.
    async fn gate(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        let (Some(ObjectKind::Gate), Some(room_id)) = (scratch.object.kind, scratch.room_id) else {
            return self.expire(user).await;
        };
        let required = match clean_text(input, "Required item", MAX_OBJECT_NAME) {
            Ok(required) => required,
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        };

        let exists = self
            .items
            .list_in_room(room_id)
            .await?
            .iter()
            .any(|item| item.matches_name(&required));
        let note = (!exists).then(|| {
            format!(
                "Warning: no item named '{required}' exists here yet. The gate will still be created."
            )
        });

        scratch.object.required_item = Some(required);
        scratch.object.effect = Some(EffectKind::None);
        self.advance(user, scratch, UserMode::CreatingObjectVerb, note)
            .await
    }

    async fn object_verb(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        let Some(kind) = scratch.object.kind else {
            return self.expire(user).await;
        };
        let verb = match input.to_ascii_lowercase().as_str() {
            "" | "y" | "yes" | "default" => Verb::new(kind.default_verb()),
            custom => Verb::custom(custom),
        };
        match verb {
            Ok(verb) => scratch.object.verb = Some(verb),
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        }
        self.advance(user, scratch, UserMode::CreatingObjectMessage, None)
            .await
    }

    /// Last object step: commits the item and loops back to the confirm prompt.
    async fn object_message(
        &self,
        user: &User,
        mut scratch: WizardScratch,
        input: &str,
    ) -> Result<Reply, WizardError> {
        let draft = scratch.object.clone();
        let (Some(room_id), Some(name), Some(description), Some(verb)) = (
            scratch.room_id,
            draft.name,
            draft.description,
            draft.verb,
        ) else {
            return self.expire(user).await;
        };
        let success_message = match clean_text(input, "Message", MAX_MESSAGE) {
            Ok(message) => message,
            Err(e) => return Ok(self.invalid(user.mode, &scratch, e)),
        };

        let item = Item {
            id: ItemId::new(),
            server_code: scratch.server_code.clone(),
            placement: ItemPlacement::InRoom(room_id),
            name,
            description,
            success_message,
            verb,
            effect: draft.effect.unwrap_or_default(),
            effect_value: draft.effect_value,
            hidden: false,
            required_item: draft.required_item,
            combat: draft.combat.unwrap_or_default(),
            infinite: draft.infinite,
            template_id: None,
            creator_id: Some(user.id),
            created_at: self.clock.now(),
        };
        self.items.create(&item).await?;
        tracing::info!(user_id = %user.id, item_id = %item.id, %room_id, "Object created");

        scratch.created_items.push(item.id);
        scratch.object = ObjectDraft::default();
        let note = format!("{} has been added to the room.", item.name);
        self.advance(user, scratch, UserMode::CreatingObjectConfirm, Some(note))
            .await
    }

    // -------------------------------------------------------------------------
    // Completion and recovery
    // -------------------------------------------------------------------------

    /// "No more objects": hand the room to the art service and release the
    /// author once it is done, whatever the outcome.
    async fn finish(&self, user: &User, scratch: WizardScratch) -> Result<Reply, WizardError> {
        let Some(room_id) = scratch.room_id else {
            return self.expire(user).await;
        };
        self.store.discard(user.id).await;

        let Some(room) = self.rooms.get(room_id).await? else {
            tracing::warn!(user_id = %user.id, %room_id, "Authored room vanished before generation");
            return self.reset(user, "Your room no longer exists.").await;
        };

        let mut items = Vec::with_capacity(scratch.created_items.len());
        for id in &scratch.created_items {
            if let Some(item) = self.items.get(*id).await? {
                items.push(item);
            }
        }

        if !self.jobs.start(Some(user.id), room.id) {
            return self
                .reset(user, "Your area is complete. Its art is already being drawn.")
                .await;
        }
        self.users
            .set_mode(user.id, UserMode::GeneratingAnimations)
            .await?;

        let mood = scratch.room.mood.unwrap_or_default();
        let assets = self.assets.clone();
        let users = self.users.clone();
        let jobs = self.jobs.clone();
        let events = self.events.clone();
        let view = self.view.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            let report = assets.generate_room(&room, mood, &items).await;

            if let Err(e) = users.set_mode(user_id, UserMode::Idle).await {
                tracing::warn!(%user_id, error = %e, "Failed to release author after generation");
            }
            jobs.finish(Some(user_id), room.id);

            let text = match report {
                Some(report) if report.is_complete() => "Your world is complete.",
                Some(_) => "Your world is complete, though some of its art could not be drawn.",
                None => "Your world is complete without animation; the art took too long.",
            };
            events.send_to_user(user_id, ServerMessage::info(text)).await;
            match view.refresh(user_id).await {
                Ok(Some(update)) => events.send_to_user(user_id, update).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(%user_id, error = %e, "Snapshot after generation failed"),
            }
            match view.tapestry(room.id).await {
                Ok(Some(tapestry)) => events.send_to_user(user_id, tapestry).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(%user_id, error = %e, "Tapestry lookup failed"),
            }
        });

        let mut generating = user.clone();
        generating.mode = UserMode::GeneratingAnimations;
        let mut reply = Reply::new();
        reply.info("Generating art for your new area. This can take a moment...");
        reply.push(self.view.state_update(&generating).await?);
        Ok(reply)
    }

    async fn while_generating(&self, user: &User) -> Result<Reply, WizardError> {
        if self.jobs.is_author_waiting(user.id) {
            let mut reply = Reply::new();
            reply.info("Still generating art for your new area. Please wait.");
            return Ok(reply);
        }
        tracing::warn!(user_id = %user.id, "Generating without a job in flight, resetting");
        self.reset(
            user,
            "Your session expired while art was being generated. Your area is saved.",
        )
        .await
    }

    /// Continuity failure: drop scratch, back to `IDLE`.
    async fn expire(&self, user: &User) -> Result<Reply, WizardError> {
        tracing::warn!(user_id = %user.id, mode = %user.mode, "Wizard scratch missing, expiring session");
        self.store.discard(user.id).await;
        self.reset(
            user,
            "Your creation session expired. Anything not yet saved was discarded.",
        )
        .await
    }

    /// Someone else committed a room at this coordinate first.
    async fn lost_race(&self, user: &User) -> Result<Reply, WizardError> {
        tracing::info!(user_id = %user.id, position = %user.position, "Room already claimed, aborting wizard");
        self.store.discard(user.id).await;
        self.users.set_mode(user.id, UserMode::Idle).await?;

        let mut idle = user.clone();
        idle.mode = UserMode::Idle;
        let mut reply = Reply::with_error("Someone finished a room here before you. Your draft was discarded.");
        reply.extend(self.view.arrival(&idle).await?);
        Ok(reply)
    }

    async fn reset(&self, user: &User, message: &str) -> Result<Reply, WizardError> {
        self.users.set_mode(user.id, UserMode::Idle).await?;
        let mut idle = user.clone();
        idle.mode = UserMode::Idle;
        let mut reply = Reply::with_error(message);
        reply.push(self.view.state_update(&idle).await?);
        Ok(reply)
    }

    async fn advance(
        &self,
        user: &User,
        scratch: WizardScratch,
        next: UserMode,
        note: Option<String>,
    ) -> Result<Reply, WizardError> {
        let prompt = prompt_for(next, &scratch);
        self.store.put(user.id, scratch).await;
        self.users.set_mode(user.id, next).await?;
        tracing::debug!(user_id = %user.id, from = %user.mode, to = %next, "Wizard advanced");

        let mut advanced = user.clone();
        advanced.mode = next;
        let mut reply = Reply::new();
        if let Some(note) = note {
            reply.info(note);
        }
        reply.push(self.view.state_update(&advanced).await?);
        reply.prompt(prompt);
        Ok(reply)
    }

    fn invalid(&self, mode: UserMode, scratch: &WizardScratch, error: DomainError) -> Reply {
        let mut reply = Reply::with_error(error.to_string());
        reply.prompt(prompt_for(mode, scratch));
        reply
    }
}

fn parse_in_range(input: &str, field: &'static str, min: i64, max: i64) -> Result<i64, DomainError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("{field} must be a number from {min} to {max}.")))?;
    if !(min..=max).contains(&value) {
        return Err(DomainError::out_of_range(field, min, max));
    }
    Ok(value)
}

/// `HP ATK XP`, separated by spaces, commas or slashes.
fn parse_enemy_stats(input: &str) -> Result<CombatStats, DomainError> {
    let format_hint =
        || DomainError::validation("Enter three numbers: HP ATK XP (for example '12 3 25').");
    let captures = enemy_stats_pattern()
        .captures(input)
        .ok_or_else(format_hint)?;
    let number = |index: usize| -> Result<i64, DomainError> {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(format_hint)
    };
    let (hp, attack, xp) = (number(1)?, number(2)?, number(3)?);
    if !(1..=999).contains(&hp) {
        return Err(DomainError::out_of_range("Enemy HP", 1, 999));
    }
    if !(0..=99).contains(&attack) {
        return Err(DomainError::out_of_range("Enemy attack", 0, 99));
    }
    if !(0..=9999).contains(&xp) {
        return Err(DomainError::out_of_range("Enemy XP", 0, 9999));
    }
    Ok(CombatStats::enemy(hp as i32, attack as i32, xp as i32))
}

fn numbered_menu<T>(options: &[T], label: impl Fn(&T) -> &'static str) -> String {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}) {}", i + 1, label(option)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// The question asked on entering `mode`.
pub fn prompt_for(mode: UserMode, scratch: &WizardScratch) -> String {
    match mode {
        UserMode::CreatingRoomTitle => TITLE_PROMPT.to_string(),
        UserMode::CreatingRoomDescription => {
            format!("Describe this place (up to {MAX_ROOM_DESCRIPTION} characters):")
        }
        UserMode::CreatingRoomMood => format!(
            "Choose a mood: {}",
            numbered_menu(&Mood::MENU, |mood| mood.display_name())
        ),
        UserMode::CreatingRoomShroud => {
            "Shroud level 0-5 (0 shows verbs plainly, 5 hides them completely):".to_string()
        }
        UserMode::CreatingObjectConfirm => "Add an object to this room? (y/n)".to_string(),
        UserMode::CreatingObjectName => {
            format!("Object name (up to {MAX_OBJECT_NAME} characters):")
        }
        UserMode::CreatingObjectDescription => {
            format!("Describe the object (up to {MAX_OBJECT_DESCRIPTION} characters):")
        }
        UserMode::CreatingObjectType => format!(
            "Object type: {}",
            numbered_menu(&ObjectKind::MENU, |kind| kind.display_name())
        ),
        UserMode::CreatingObjectValue => match scratch.object.kind {
            Some(ObjectKind::BuffTrap) => {
                "Effect value from -999 to 999 (positive heals, negative damages, not 0):"
                    .to_string()
            }
            _ => "How much gold does it hold? (1-9999)".to_string(),
        },
        UserMode::CreatingObjectEnemyStats => {
            "Enemy stats as 'HP ATK XP' (HP 1-999, ATK 0-99, XP 0-9999):".to_string()
        }
        UserMode::CreatingObjectPickupKind => {
            "1) Unique (one player takes it)  2) Infinite (everyone gets their own)".to_string()
        }
        UserMode::CreatingObjectGate => {
            "Name of the item a player must carry to use this:".to_string()
        }
        UserMode::CreatingObjectVerb => {
            let default = scratch
                .object
                .kind
                .map(|kind| kind.default_verb())
                .unwrap_or("examine");
            format!("Verb to use it? Press enter or 'y' for '{default}', or type your own:")
        }
        UserMode::CreatingObjectMessage => {
            format!("Message shown when it is used (up to {MAX_MESSAGE} characters):")
        }
        UserMode::GeneratingAnimations => "Generating art for your new area...".to_string(),
        UserMode::Idle | UserMode::Combat => "What next?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexrealm_domain::{HexCoord, ServerCode};

    #[test]
    fn numeric_inputs_respect_their_ranges() {
        assert_eq!(parse_in_range(" 3 ", "Shroud level", 0, 5).unwrap(), 3);
        assert_eq!(
            parse_in_range("6", "Shroud level", 0, 5).unwrap_err(),
            DomainError::out_of_range("Shroud level", 0, 5)
        );
        assert!(parse_in_range("three", "Shroud level", 0, 5).is_err());
    }

    #[test]
    fn enemy_triple_parses_and_bounds_each_stat() {
        let stats = parse_enemy_stats("12 3 25").unwrap();
        assert_eq!((stats.hp, stats.max_hp, stats.attack, stats.xp_value), (12, 12, 3, 25));
        assert!(parse_enemy_stats("12,3,25").is_ok());
        assert!(parse_enemy_stats("0 3 25").is_err());
        assert!(parse_enemy_stats("12 100 25").is_err());
        assert!(parse_enemy_stats("12 3").is_err());
        assert!(parse_enemy_stats("lots of hp").is_err());
    }

    #[test]
    fn mood_menu_is_numbered_from_one() {
        let scratch = WizardScratch::new(ServerCode::new("alpha").unwrap(), HexCoord::ORIGIN);
        let prompt = prompt_for(UserMode::CreatingRoomMood, &scratch);
        assert!(prompt.contains("1) Serene"));
        assert!(prompt.contains("6) Mysterious"));
    }

    #[test]
    fn verb_prompt_offers_the_type_default() {
        let mut scratch = WizardScratch::new(ServerCode::new("alpha").unwrap(), HexCoord::ORIGIN);
        scratch.object.kind = Some(ObjectKind::BuffTrap);
        assert!(prompt_for(UserMode::CreatingObjectVerb, &scratch).contains("'touch'"));
    }
}
