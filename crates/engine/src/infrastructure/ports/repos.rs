//! Repository port traits for world store access.
//!
//! Every room, item and user query is scoped by realm, either explicitly via
//! a `ServerCode` or implicitly through an id that belongs to one realm.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hexrealm_domain::{
    Animation, AnimationType, Handle, HexBounds, HexCoord, Item, ItemId, Room, RoomId,
    ServerCode, User, UserId, UserMode,
};

use super::error::RepoError;

/// A user row together with its password hash. Only auth ever sees this.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError>;
    async fn find_credentials(
        &self,
        server_code: &ServerCode,
        handle: &Handle,
    ) -> Result<Option<StoredCredentials>, RepoError>;
    /// Fails with a constraint violation when the handle is taken in the realm.
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), RepoError>;

    async fn set_mode(&self, id: UserId, mode: UserMode) -> Result<(), RepoError>;
    async fn set_position(&self, id: UserId, position: HexCoord) -> Result<(), RepoError>;
    async fn set_hp(&self, id: UserId, hp: i32) -> Result<(), RepoError>;
    async fn add_gold(&self, id: UserId, amount: i64) -> Result<(), RepoError>;
    /// Death handling: HP to max, back to the origin, mode `IDLE`. Gold is kept.
    async fn respawn(&self, id: UserId) -> Result<(), RepoError>;

    async fn list_at(
        &self,
        server_code: &ServerCode,
        position: HexCoord,
    ) -> Result<Vec<User>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepo: Send + Sync {
    async fn get(&self, id: RoomId) -> Result<Option<Room>, RepoError>;
    async fn get_at(
        &self,
        server_code: &ServerCode,
        position: HexCoord,
    ) -> Result<Option<Room>, RepoError>;
    /// Fails with a constraint violation when the coordinate is already taken.
    async fn create(&self, room: &Room) -> Result<(), RepoError>;
    async fn list_in_bounds(
        &self,
        server_code: &ServerCode,
        bounds: HexBounds,
    ) -> Result<Vec<Room>, RepoError>;
    async fn set_symbol(&self, id: RoomId, symbol: &str) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepo: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepoError>;
    async fn create(&self, item: &Item) -> Result<(), RepoError>;
    /// Items placed in a room, in creation order.
    async fn list_in_room(&self, room_id: RoomId) -> Result<Vec<Item>, RepoError>;
    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Item>, RepoError>;
    /// Move a placed, non-infinite item into `owner_id`'s inventory.
    ///
    /// Returns `false` when the item is no longer placed in a room, so two
    /// sessions can never both take it.
    async fn take(&self, id: ItemId, owner_id: UserId) -> Result<bool, RepoError>;
    async fn set_combat_hp(&self, id: ItemId, hp: i32) -> Result<(), RepoError>;
    /// Delete the item and its animations. Returns `false` if it was already gone.
    async fn delete(&self, id: ItemId) -> Result<bool, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimationRepo: Send + Sync {
    async fn save(&self, animation: &Animation) -> Result<(), RepoError>;
    /// Newest room-level animation of `kind`.
    async fn find_for_room(
        &self,
        room_id: RoomId,
        kind: AnimationType,
    ) -> Result<Option<Animation>, RepoError>;
    /// Newest animation of `kind` attached to the item.
    async fn find_for_item(
        &self,
        item_id: ItemId,
        kind: AnimationType,
    ) -> Result<Option<Animation>, RepoError>;
    /// Delete the room's animations and those of every item placed in it.
    async fn delete_for_room(&self, room_id: RoomId) -> Result<u64, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepo: Send + Sync {
    async fn issue(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    /// The user behind an unexpired token.
    async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Option<UserId>, RepoError>;
}
