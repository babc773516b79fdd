//! Read-side of the world: snapshots, room descriptions and target lookup.
//!
//! Everything here is a pure read over the repositories, so every handler can
//! call it after its own writes to build the canonical `state:update`.

use std::sync::Arc;

use hexrealm_domain::{AnimationType, Item, Place, RoomId, User, UserId};
use hexrealm_shared::{
    AnimationData, ItemData, LogKind, LogLine, PlayerData, RoomData, ServerMessage,
    StateSnapshot, VisibleRoomData,
};

use super::Reply;
use crate::infrastructure::ports::{AnimationRepo, ItemRepo, RepoError, RoomRepo, UserRepo};

/// Why a `<target|ordinal>` argument did not resolve.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("There is no object at position {0}.")]
    NoObjectAt(usize),
    #[error("You don't see '{0}' here.")]
    NotFound(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A resolved target and where it was found.
#[derive(Debug, Clone)]
pub struct Located {
    pub item: Item,
    pub held: bool,
}

#[derive(Clone)]
pub struct WorldView {
    users: Arc<dyn UserRepo>,
    rooms: Arc<dyn RoomRepo>,
    items: Arc<dyn ItemRepo>,
    animations: Arc<dyn AnimationRepo>,
    view_radius: u32,
}

impl WorldView {
    pub fn new(
        users: Arc<dyn UserRepo>,
        rooms: Arc<dyn RoomRepo>,
        items: Arc<dyn ItemRepo>,
        animations: Arc<dyn AnimationRepo>,
        view_radius: u32,
    ) -> Self {
        Self {
            users,
            rooms,
            items,
            animations,
            view_radius,
        }
    }

    pub async fn place(&self, user: &User) -> Result<Place, RepoError> {
        let room = self.rooms.get_at(&user.server_code, user.position).await?;
        Ok(Place::at(user.position, room))
    }

    /// Items a player can see in the room, in listing order.
    pub async fn visible_items(&self, room_id: RoomId) -> Result<Vec<Item>, RepoError> {
        Ok(self
            .items
            .list_in_room(room_id)
            .await?
            .into_iter()
            .filter(|item| !item.hidden)
            .collect())
    }

    pub async fn snapshot(&self, user: &User) -> Result<StateSnapshot, RepoError> {
        let place = self.place(user).await?;
        let room_items = match place.room() {
            Some(room) => self.visible_items(room.id).await?,
            None => Vec::new(),
        };
        let visible_rooms = self
            .rooms
            .list_in_bounds(&user.server_code, user.position.bounds(self.view_radius))
            .await?;
        let others = self.others_here(user).await?;
        let inventory = self.items.list_owned(user.id).await?;

        Ok(StateSnapshot {
            player: player_data(user),
            room: room_data(&place),
            visible_rooms: visible_rooms
                .iter()
                .map(|room| VisibleRoomData {
                    id: room.id.to_uuid(),
                    q: room.position.q,
                    r: room.position.r,
                    title: room.title.clone(),
                    symbol: room.symbol.clone(),
                })
                .collect(),
            room_items: room_items.iter().map(item_data).collect(),
            players_in_room: Some(others),
            inventory: Some(inventory.iter().map(item_data).collect()),
        })
    }

    pub async fn state_update(&self, user: &User) -> Result<ServerMessage, RepoError> {
        Ok(ServerMessage::StateUpdate(Box::new(self.snapshot(user).await?)))
    }

    /// Re-read the user and build a fresh snapshot. `None` if the user is gone.
    pub async fn refresh(&self, user_id: UserId) -> Result<Option<ServerMessage>, RepoError> {
        match self.users.get(user_id).await? {
            Some(user) => Ok(Some(self.state_update(&user).await?)),
            None => Ok(None),
        }
    }

    /// Room title, description, listing and company, as log lines.
    pub async fn describe(&self, user: &User) -> Result<Reply, RepoError> {
        let place = self.place(user).await?;
        let mut reply = Reply::new();
        reply.log(LogLine::new(LogKind::RoomTitle, place.title()));
        reply.log(LogLine::new(LogKind::RoomDesc, place.description()));

        if let Some(room) = place.room() {
            let items = self.visible_items(room.id).await?;
            if !items.is_empty() {
                let listing = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}) {}", i + 1, item.name))
                    .collect::<Vec<_>>()
                    .join("  ");
                reply.log(LogLine::new(LogKind::RoomItems, format!("You see: {listing}")));
            }
        }

        let others = self.others_here(user).await?;
        if !others.is_empty() {
            reply.info(format!("Also here: {}", others.join(", ")));
        }
        Ok(reply)
    }

    /// The room's newest tapestry, if one was generated.
    pub async fn tapestry(&self, room_id: RoomId) -> Result<Option<ServerMessage>, RepoError> {
        let animation = self
            .animations
            .find_for_room(room_id, AnimationType::Tapestry)
            .await?;
        Ok(animation.map(|animation| ServerMessage::AnimationPlay(animation_data(&animation))))
    }

    /// Everything a player needs on arriving somewhere: description,
    /// snapshot and tapestry.
    pub async fn arrival(&self, user: &User) -> Result<Reply, RepoError> {
        let mut reply = self.describe(user).await?;
        reply.push(self.state_update(user).await?);
        if let Some(room) = self.rooms.get_at(&user.server_code, user.position).await? {
            reply.push_opt(self.tapestry(room.id).await?);
        }
        Ok(reply)
    }

    pub async fn look(&self, user: &User, target: Option<&str>) -> Result<Reply, TargetError> {
        let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(self.arrival(user).await?);
        };
        let located = self.find_target(user, target).await?;
        let mut reply = Reply::new();
        let item = &located.item;
        let mut text = format!("{}: {}", item.name, item.description);
        if item.is_enemy() {
            text.push_str(&format!(" (HP {}/{})", item.combat.hp, item.combat.max_hp));
        }
        if located.held {
            text.push_str(" (carried)");
        }
        reply.info(text);
        Ok(reply)
    }

    pub async fn help(&self, user: &User) -> Result<Reply, RepoError> {
        let mut reply = Reply::new();
        for line in HELP_LINES {
            reply.log(LogLine::info(*line).with_label("help"));
        }

        if let Some(room) = self.place(user).await?.room() {
            let mut verbs: Vec<String> = Vec::new();
            for item in self.visible_items(room.id).await? {
                let verb = item.verb.as_str().to_string();
                if !verbs.contains(&verb) {
                    verbs.push(verb);
                }
            }
            if !verbs.is_empty() {
                let masked = verbs
                    .iter()
                    .map(|verb| room.shroud.obscure(verb))
                    .collect::<Vec<_>>()
                    .join(", ");
                reply.log(LogLine::info(format!("Verbs here: {masked}")).with_label("help"));
            }
        }
        Ok(reply)
    }

    pub async fn inventory(&self, user: &User) -> Result<Reply, RepoError> {
        let held = self.items.list_owned(user.id).await?;
        let mut reply = Reply::new();
        if held.is_empty() {
            reply.info("You are carrying nothing.");
        } else {
            let names = held
                .iter()
                .map(|item| item.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            reply.info(format!("You are carrying: {names}"));
        }
        reply.info(format!(
            "HP {}/{}  Gold {}  Strength {}",
            user.hp, user.max_hp, user.gold, user.strength
        ));
        Ok(reply)
    }

    /// Resolve `target` against the room listing (ordinals, 1-indexed) or by
    /// name in the room, then in the inventory.
    ///
    /// Ordinals are checked against the listing as it is now, so a stale
    /// number reports an empty slot rather than hitting a different object.
    pub async fn find_target(&self, user: &User, target: &str) -> Result<Located, TargetError> {
        let target = target.trim();
        let room = self.rooms.get_at(&user.server_code, user.position).await?;

        if let Ok(ordinal) = target.parse::<usize>() {
            let listing = match &room {
                Some(room) => self.visible_items(room.id).await?,
                None => Vec::new(),
            };
            return ordinal
                .checked_sub(1)
                .and_then(|index| listing.into_iter().nth(index))
                .map(|item| Located { item, held: false })
                .ok_or(TargetError::NoObjectAt(ordinal));
        }

        if let Some(room) = &room {
            if let Some(item) = self
                .items
                .list_in_room(room.id)
                .await?
                .into_iter()
                .find(|item| item.matches_name(target))
            {
                return Ok(Located { item, held: false });
            }
        }

        self.items
            .list_owned(user.id)
            .await?
            .into_iter()
            .find(|item| item.matches_name(target))
            .map(|item| Located { item, held: true })
            .ok_or_else(|| TargetError::NotFound(target.to_string()))
    }

    async fn others_here(&self, user: &User) -> Result<Vec<String>, RepoError> {
        Ok(self
            .users
            .list_at(&user.server_code, user.position)
            .await?
            .into_iter()
            .filter(|other| other.id != user.id)
            .map(|other| other.handle.to_string())
            .collect())
    }
}

const HELP_LINES: &[&str] = &[
    "Move: n, s, ne, se, nw, sw (or 'go <direction>')",
    "look [object|#] - look around, or at something",
    "inventory (inv, i) - what you carry",
    "<verb> <object|#> - use an object, e.g. 'open 2'",
    "fight <object|#> / retreat - combat",
    "regenerate [mood] - redraw this room's art",
];

pub fn player_data(user: &User) -> PlayerData {
    PlayerData {
        id: user.id.to_uuid(),
        handle: user.handle.to_string(),
        server_code: user.server_code.to_string(),
        strength: user.strength,
        hp: user.hp,
        max_hp: user.max_hp,
        gold: user.gold,
        q: user.position.q,
        r: user.position.r,
        mode: user.mode,
    }
}

fn room_data(place: &Place) -> RoomData {
    let position = place.position();
    RoomData {
        id: place.room().map(|room| room.id.to_uuid()),
        q: position.q,
        r: position.r,
        title: place.title(),
        description: place.description(),
        shroud_level: place.room().map(|room| room.shroud.value()).unwrap_or(0),
        symbol: place.room().and_then(|room| room.symbol.clone()),
    }
}

fn item_data(item: &Item) -> ItemData {
    let enemy = item.is_enemy();
    ItemData {
        id: item.id.to_uuid(),
        name: item.name.clone(),
        description: item.description.clone(),
        hp: enemy.then_some(item.combat.hp),
        max_hp: enemy.then_some(item.combat.max_hp),
    }
}

pub fn animation_data(animation: &hexrealm_domain::Animation) -> AnimationData {
    AnimationData {
        id: animation.id.to_uuid(),
        room_id: animation.room_id.map(|id| id.to_uuid()),
        object_id: animation.item_id.map(|id| id.to_uuid()),
        kind: animation.kind.as_str().to_string(),
        frames: animation.frames.clone(),
        fps: animation.fps,
    }
}
