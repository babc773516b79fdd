//! SQLite room repository.

use async_trait::async_trait;
use hexrealm_domain::{HexBounds, HexCoord, Room, RoomId, ServerCode, ShroudLevel};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::codec::{decode, decode_opt, decode_time, encode_time};
use super::db_error;
use crate::infrastructure::ports::{RepoError, RoomRepo};

const ROOM_COLUMNS: &str =
    "id, server_code, q, r, title, description, shroud_level, creator_id, symbol, created_at";

pub struct SqliteRoomRepo {
    pool: SqlitePool,
}

impl SqliteRoomRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn room_from_row(row: &SqliteRow) -> Result<Room, RepoError> {
    let column_err = |e: sqlx::Error| RepoError::database("rooms.row", e);
    let id: String = row.try_get("id").map_err(column_err)?;
    let server_code: String = row.try_get("server_code").map_err(column_err)?;
    let q: i64 = row.try_get("q").map_err(column_err)?;
    let r: i64 = row.try_get("r").map_err(column_err)?;
    let shroud: i64 = row.try_get("shroud_level").map_err(column_err)?;
    let created_at: String = row.try_get("created_at").map_err(column_err)?;

    Ok(Room {
        id: decode("rooms.id", &id)?,
        server_code: ServerCode::new(server_code).map_err(RepoError::serialization)?,
        position: HexCoord::new(q as i32, r as i32),
        title: row.try_get("title").map_err(column_err)?,
        description: row.try_get("description").map_err(column_err)?,
        shroud: ShroudLevel::new(u8::try_from(shroud).unwrap_or(u8::MAX))
            .map_err(RepoError::serialization)?,
        creator_id: decode_opt("rooms.creator_id", row.try_get("creator_id").map_err(column_err)?)?,
        symbol: row.try_get("symbol").map_err(column_err)?,
        created_at: decode_time(&created_at)?,
    })
}

#[async_trait]
impl RoomRepo for SqliteRoomRepo {
    async fn get(&self, id: RoomId) -> Result<Option<Room>, RepoError> {
        let row = sqlx::query(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("rooms.get", e))?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn get_at(
        &self,
        server_code: &ServerCode,
        position: HexCoord,
    ) -> Result<Option<Room>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE server_code = ? AND q = ? AND r = ?"
        ))
        .bind(server_code.as_str())
        .bind(position.q)
        .bind(position.r)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("rooms.get_at", e))?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn create(&self, room: &Room) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, server_code, q, r, title, description, shroud_level,
                               creator_id, symbol, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(room.id.to_string())
        .bind(room.server_code.as_str())
        .bind(room.position.q)
        .bind(room.position.r)
        .bind(&room.title)
        .bind(&room.description)
        .bind(i64::from(room.shroud.value()))
        .bind(room.creator_id.map(|id| id.to_string()))
        .bind(room.symbol.as_deref())
        .bind(encode_time(room.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("rooms.create", e))?;
        Ok(())
    }

    async fn list_in_bounds(
        &self,
        server_code: &ServerCode,
        bounds: HexBounds,
    ) -> Result<Vec<Room>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms \
             WHERE server_code = ? AND q BETWEEN ? AND ? AND r BETWEEN ? AND ? \
             ORDER BY r, q"
        ))
        .bind(server_code.as_str())
        .bind(bounds.min_q)
        .bind(bounds.max_q)
        .bind(bounds.min_r)
        .bind(bounds.max_r)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("rooms.list_in_bounds", e))?;
        rows.iter().map(room_from_row).collect()
    }

    async fn set_symbol(&self, id: RoomId, symbol: &str) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE rooms SET symbol = ? WHERE id = ?")
            .bind(symbol)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("rooms.set_symbol", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Room", id));
        }
        Ok(())
    }
}
