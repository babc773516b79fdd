//! Animation generation through the external art service.
//!
//! Every call is independent: a failed symbol, tapestry or interaction is
//! logged and skipped, never propagated. Animations are cosmetic.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use hexrealm_domain::{Animation, AnimationType, Item, Mood, Room, User};
use hexrealm_shared::ServerMessage;

use super::{Reply, WorldView};
use crate::infrastructure::ports::{
    AnimationRepo, ArtGenPort, ClockPort, EventSink, ItemRepo, RepoError, RoomRepo,
};
use crate::stores::GenerationJobs;

/// What one batch managed to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub symbol: bool,
    pub tapestry: bool,
    pub interactions: usize,
    pub failures: usize,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        self.failures == 0
    }
}

#[derive(Clone)]
pub struct AssetGenerator {
    art: Arc<dyn ArtGenPort>,
    rooms: Arc<dyn RoomRepo>,
    animations: Arc<dyn AnimationRepo>,
    clock: Arc<dyn ClockPort>,
    timeout: Duration,
}

impl AssetGenerator {
    pub fn new(
        art: Arc<dyn ArtGenPort>,
        rooms: Arc<dyn RoomRepo>,
        animations: Arc<dyn AnimationRepo>,
        clock: Arc<dyn ClockPort>,
        timeout: Duration,
    ) -> Self {
        Self {
            art,
            rooms,
            animations,
            clock,
            timeout,
        }
    }

    /// Symbol, tapestry and one interaction per item, all concurrently.
    ///
    /// `None` when the whole batch outlived the generation timeout; whatever
    /// finished before that is kept.
    pub async fn generate_room(
        &self,
        room: &Room,
        mood: Mood,
        items: &[Item],
    ) -> Option<GenerationReport> {
        let batch = async {
            let (symbol, tapestry, interactions) = tokio::join!(
                self.symbol(room),
                self.tapestry(room, mood),
                join_all(items.iter().map(|item| self.interaction(item))),
            );
            let made = interactions.iter().filter(|ok| **ok).count();
            GenerationReport {
                symbol,
                tapestry,
                interactions: made,
                failures: usize::from(!symbol)
                    + usize::from(!tapestry)
                    + (interactions.len() - made),
            }
        };

        match tokio::time::timeout(self.timeout, batch).await {
            Ok(report) => {
                tracing::info!(room_id = %room.id, ?report, "Animation batch finished");
                Some(report)
            }
            Err(_) => {
                tracing::warn!(room_id = %room.id, timeout = ?self.timeout, "Animation batch timed out");
                None
            }
        }
    }

    /// Drop every animation of the room and its items.
    pub async fn clear_room(&self, room: &Room) -> Result<u64, RepoError> {
        self.animations.delete_for_room(room.id).await
    }

    async fn symbol(&self, room: &Room) -> bool {
        let symbol = match self.art.room_symbol(&room.title, &room.description).await {
            Ok(symbol) => symbol,
            Err(e) => {
                tracing::warn!(room_id = %room.id, error = %e, "Room symbol generation failed");
                return false;
            }
        };
        match self.rooms.set_symbol(room.id, &symbol).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(room_id = %room.id, error = %e, "Failed to store room symbol");
                false
            }
        }
    }

    async fn tapestry(&self, room: &Room, mood: Mood) -> bool {
        let generated = match self
            .art
            .room_tapestry(&room.title, &room.description, mood)
            .await
        {
            Ok(generated) => generated,
            Err(e) => {
                tracing::warn!(room_id = %room.id, error = %e, "Tapestry generation failed");
                return false;
            }
        };
        let animation = Animation::for_room(
            room.id,
            AnimationType::Tapestry,
            generated.frames,
            generated.fps,
            self.clock.now(),
        );
        self.store(animation).await
    }

    async fn interaction(&self, item: &Item) -> bool {
        let generated = match self
            .art
            .item_interaction(&item.name, &item.description, item.verb.as_str())
            .await
        {
            Ok(generated) => generated,
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Interaction generation failed");
                return false;
            }
        };
        let animation = Animation::for_item(
            item.room_id(),
            item.id,
            AnimationType::Interaction,
            generated.frames,
            generated.fps,
            self.clock.now(),
        );
        self.store(animation).await
    }

    async fn store(&self, animation: Animation) -> bool {
        match self.animations.save(&animation).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(animation_id = %animation.id, error = %e, "Failed to store animation");
                false
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegenerateError {
    #[error("There is nothing here to regenerate.")]
    NoRoom,
    #[error("Art for this room is already being generated.")]
    AlreadyRunning,
    #[error("{0}")]
    Mood(#[from] hexrealm_domain::DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Regenerate use case: redraw the current room's art in the background.
///
/// The player's mode is left alone; results arrive whenever they are ready.
pub struct RegenerateRoomArt {
    rooms: Arc<dyn RoomRepo>,
    items: Arc<dyn ItemRepo>,
    generator: AssetGenerator,
    jobs: Arc<GenerationJobs>,
    events: Arc<dyn EventSink>,
    view: WorldView,
}

impl RegenerateRoomArt {
    pub fn new(
        rooms: Arc<dyn RoomRepo>,
        items: Arc<dyn ItemRepo>,
        generator: AssetGenerator,
        jobs: Arc<GenerationJobs>,
        events: Arc<dyn EventSink>,
        view: WorldView,
    ) -> Self {
        Self {
            rooms,
            items,
            generator,
            jobs,
            events,
            view,
        }
    }

    pub async fn execute(&self, user: &User, mood: Option<&str>) -> Result<Reply, RegenerateError> {
        let mood = match mood.map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Mood::parse(raw)?,
            None => Mood::default(),
        };
        let room = self
            .rooms
            .get_at(&user.server_code, user.position)
            .await?
            .ok_or(RegenerateError::NoRoom)?;

        if !self.jobs.start(None, room.id) {
            return Err(RegenerateError::AlreadyRunning);
        }

        let items = match self.items.list_in_room(room.id).await {
            Ok(items) => items,
            Err(e) => {
                self.jobs.finish(None, room.id);
                return Err(e.into());
            }
        };
        let cleared = match self.generator.clear_room(&room).await {
            Ok(cleared) => cleared,
            Err(e) => {
                self.jobs.finish(None, room.id);
                return Err(e.into());
            }
        };
        tracing::info!(user_id = %user.id, room_id = %room.id, cleared, %mood, "Regenerating room art");

        let generator = self.generator.clone();
        let jobs = self.jobs.clone();
        let events = self.events.clone();
        let view = self.view.clone();
        let user_id = user.id;
        let title = room.title.clone();
        let mut reply = Reply::new();
        reply.info(format!(
            "Regenerating art for {title} with a {} mood...",
            mood.as_str()
        ));
        tokio::spawn(async move {
            let report = generator.generate_room(&room, mood, &items).await;
            jobs.finish(None, room.id);

            let text = match report {
                Some(report) if report.is_complete() => format!("New art for {title} is ready."),
                Some(_) => format!("New art for {title} is ready, though some of it failed."),
                None => format!("Art generation for {title} timed out."),
            };
            events.send_to_user(user_id, ServerMessage::info(text)).await;
            match view.refresh(user_id).await {
                Ok(Some(update)) => events.send_to_user(user_id, update).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(%user_id, error = %e, "Snapshot after regeneration failed"),
            }
            match view.tapestry(room.id).await {
                Ok(Some(tapestry)) => events.send_to_user(user_id, tapestry).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(%user_id, error = %e, "Tapestry lookup failed"),
            }
        });

        Ok(reply)
    }
}
