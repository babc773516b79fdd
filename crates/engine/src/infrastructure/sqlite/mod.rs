//! SQLite-backed world store.
//!
//! One pool shared by every repository. The schema is created idempotently
//! on connect.

mod animations;
mod codec;
mod items;
mod rooms;
mod tokens;
mod users;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

pub use animations::SqliteAnimationRepo;
pub use codec::{decode_frames, encode_frames};
pub use items::SqliteItemRepo;
pub use rooms::SqliteRoomRepo;
pub use tokens::SqliteAuthTokenRepo;
pub use users::SqliteUserRepo;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        handle TEXT NOT NULL,
        server_code TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        strength INTEGER NOT NULL,
        hp INTEGER NOT NULL,
        max_hp INTEGER NOT NULL,
        gold INTEGER NOT NULL DEFAULT 0,
        q INTEGER NOT NULL DEFAULT 0,
        r INTEGER NOT NULL DEFAULT 0,
        mode TEXT NOT NULL DEFAULT 'IDLE',
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_realm_handle ON users (server_code, handle COLLATE NOCASE)",
    "CREATE INDEX IF NOT EXISTS users_realm_position ON users (server_code, q, r)",
    r#"
    CREATE TABLE IF NOT EXISTS auth_tokens (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        expires_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id TEXT PRIMARY KEY,
        server_code TEXT NOT NULL,
        q INTEGER NOT NULL,
        r INTEGER NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        shroud_level INTEGER NOT NULL CHECK (shroud_level BETWEEN 0 AND 5),
        creator_id TEXT,
        symbol TEXT,
        created_at TEXT NOT NULL,
        UNIQUE (server_code, q, r)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        server_code TEXT NOT NULL,
        room_id TEXT REFERENCES rooms (id) ON DELETE CASCADE,
        owner_id TEXT REFERENCES users (id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        success_message TEXT NOT NULL,
        verb TEXT NOT NULL,
        effect TEXT NOT NULL,
        effect_value INTEGER NOT NULL DEFAULT 0,
        hidden INTEGER NOT NULL DEFAULT 0,
        required_item TEXT,
        hp INTEGER NOT NULL DEFAULT 0,
        max_hp INTEGER NOT NULL DEFAULT 0,
        attack INTEGER NOT NULL DEFAULT 0,
        xp_value INTEGER NOT NULL DEFAULT 0,
        infinite INTEGER NOT NULL DEFAULT 0,
        template_id TEXT,
        creator_id TEXT,
        created_at TEXT NOT NULL,
        CHECK ((room_id IS NULL) <> (owner_id IS NULL))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS items_room ON items (room_id)",
    "CREATE INDEX IF NOT EXISTS items_owner ON items (owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS animations (
        id TEXT PRIMARY KEY,
        room_id TEXT REFERENCES rooms (id) ON DELETE CASCADE,
        item_id TEXT REFERENCES items (id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        frames TEXT NOT NULL,
        fps INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS animations_room ON animations (room_id)",
    "CREATE INDEX IF NOT EXISTS animations_item ON animations (item_id)",
];

/// All SQLite repositories over one pool.
#[derive(Clone)]
pub struct SqliteRepositories {
    pub pool: SqlitePool,
    pub users: Arc<SqliteUserRepo>,
    pub rooms: Arc<SqliteRoomRepo>,
    pub items: Arc<SqliteItemRepo>,
    pub animations: Arc<SqliteAnimationRepo>,
    pub tokens: Arc<SqliteAuthTokenRepo>,
}

impl SqliteRepositories {
    pub async fn connect(database_url: &str) -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepoError::database("connect", e))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepoError::database("connect", e))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, RepoError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }
        tracing::debug!("World store schema ready");

        Ok(Self {
            users: Arc::new(SqliteUserRepo::new(pool.clone())),
            rooms: Arc::new(SqliteRoomRepo::new(pool.clone())),
            items: Arc::new(SqliteItemRepo::new(pool.clone())),
            animations: Arc::new(SqliteAnimationRepo::new(pool.clone())),
            tokens: Arc::new(SqliteAuthTokenRepo::new(pool.clone())),
            pool,
        })
    }
}

/// Map an sqlx error, surfacing unique and check violations as constraint errors.
pub(crate) fn db_error(operation: &'static str, e: sqlx::Error) -> RepoError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() || db.is_check_violation() {
            return RepoError::constraint(format!("{operation}: {}", db.message()));
        }
    }
    RepoError::database(operation, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{RoomRepo, UserRepo};
    use chrono::Utc;
    use hexrealm_domain::{Handle, HexCoord, Room, ServerCode, ShroudLevel, User};

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let repos = SqliteRepositories::in_memory().await.unwrap();
        SqliteRepositories::with_pool(repos.pool.clone())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn world_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("world.db").display());
        let realm = ServerCode::new("alpha").unwrap();
        let user = User::new(Handle::new("keeper").unwrap(), realm.clone(), Utc::now());
        let room = Room::new(
            realm.clone(),
            HexCoord::new(2, -1),
            "Lantern Hall",
            "Lamps hum.",
            ShroudLevel::new(1).unwrap(),
            Some(user.id),
            Utc::now(),
        );

        {
            let repos = SqliteRepositories::connect(&url).await.unwrap();
            repos.users.create(&user, "hash").await.unwrap();
            repos.rooms.create(&room).await.unwrap();
            repos.pool.close().await;
        }

        let repos = SqliteRepositories::connect(&url).await.unwrap();
        let loaded = repos
            .rooms
            .get_at(&realm, HexCoord::new(2, -1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.title, "Lantern Hall");
        assert!(repos.users.get(user.id).await.unwrap().is_some());
    }
}
