//! SQLite animation repository.

use async_trait::async_trait;
use hexrealm_domain::{Animation, AnimationType, ItemId, RoomId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::codec::{decode, decode_frames, decode_opt, decode_time, encode_frames, encode_time};
use super::db_error;
use crate::infrastructure::ports::{AnimationRepo, RepoError};

const ANIMATION_COLUMNS: &str = "id, room_id, item_id, kind, frames, fps, created_at";

pub struct SqliteAnimationRepo {
    pool: SqlitePool,
}

impl SqliteAnimationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn animation_from_row(row: &SqliteRow) -> Result<Animation, RepoError> {
    let column_err = |e: sqlx::Error| RepoError::database("animations.row", e);
    let id: String = row.try_get("id").map_err(column_err)?;
    let kind: String = row.try_get("kind").map_err(column_err)?;
    let frames: String = row.try_get("frames").map_err(column_err)?;
    let fps: i64 = row.try_get("fps").map_err(column_err)?;
    let created_at: String = row.try_get("created_at").map_err(column_err)?;

    Ok(Animation {
        id: decode("animations.id", &id)?,
        room_id: decode_opt("animations.room_id", row.try_get("room_id").map_err(column_err)?)?,
        item_id: decode_opt("animations.item_id", row.try_get("item_id").map_err(column_err)?)?,
        kind: decode::<AnimationType>("animations.kind", &kind)?,
        frames: decode_frames(&frames)?,
        fps: u32::try_from(fps).unwrap_or(1),
        created_at: decode_time(&created_at)?,
    })
}

#[async_trait]
impl AnimationRepo for SqliteAnimationRepo {
    async fn save(&self, animation: &Animation) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO animations (id, room_id, item_id, kind, frames, fps, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(animation.id.to_string())
        .bind(animation.room_id.map(|id| id.to_string()))
        .bind(animation.item_id.map(|id| id.to_string()))
        .bind(animation.kind.as_str())
        .bind(encode_frames(&animation.frames)?)
        .bind(i64::from(animation.fps))
        .bind(encode_time(animation.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("animations.save", e))?;
        Ok(())
    }

    async fn find_for_room(
        &self,
        room_id: RoomId,
        kind: AnimationType,
    ) -> Result<Option<Animation>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {ANIMATION_COLUMNS} FROM animations \
             WHERE room_id = ? AND item_id IS NULL AND kind = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(room_id.to_string())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("animations.find_for_room", e))?;
        row.as_ref().map(animation_from_row).transpose()
    }

    async fn find_for_item(
        &self,
        item_id: ItemId,
        kind: AnimationType,
    ) -> Result<Option<Animation>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {ANIMATION_COLUMNS} FROM animations \
             WHERE item_id = ? AND kind = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(item_id.to_string())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("animations.find_for_item", e))?;
        row.as_ref().map(animation_from_row).transpose()
    }

    async fn delete_for_room(&self, room_id: RoomId) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "DELETE FROM animations WHERE (room_id = ?1 AND item_id IS NULL) \
             OR item_id IN (SELECT id FROM items WHERE room_id = ?1)",
        )
        .bind(room_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("animations.delete_for_room", e))?;
        Ok(result.rows_affected())
    }
}
