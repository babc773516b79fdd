//! SQLite user repository.

use async_trait::async_trait;
use hexrealm_domain::{Handle, HexCoord, ServerCode, User, UserId, UserMode};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::codec::{decode, decode_time, encode_time};
use super::db_error;
use crate::infrastructure::ports::{RepoError, StoredCredentials, UserRepo};

const USER_COLUMNS: &str =
    "id, handle, server_code, strength, hp, max_hp, gold, q, r, mode, created_at";

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// An UPDATE that touched nothing means the user row is gone.
fn ensure_updated(
    result: sqlx::sqlite::SqliteQueryResult,
    id: UserId,
) -> Result<(), RepoError> {
    if result.rows_affected() == 0 {
        return Err(RepoError::not_found("User", id));
    }
    Ok(())
}

fn user_from_row(row: &SqliteRow) -> Result<User, RepoError> {
    let get_str = |column: &'static str| -> Result<String, RepoError> {
        row.try_get::<String, _>(column)
            .map_err(|e| RepoError::database("users.row", e))
    };
    let get_int = |column: &'static str| -> Result<i64, RepoError> {
        row.try_get::<i64, _>(column)
            .map_err(|e| RepoError::database("users.row", e))
    };

    Ok(User {
        id: decode("users.id", &get_str("id")?)?,
        handle: Handle::new(get_str("handle")?).map_err(RepoError::serialization)?,
        server_code: ServerCode::new(get_str("server_code")?).map_err(RepoError::serialization)?,
        strength: get_int("strength")? as i32,
        hp: get_int("hp")? as i32,
        max_hp: get_int("max_hp")? as i32,
        gold: get_int("gold")?,
        position: HexCoord::new(get_int("q")? as i32, get_int("r")? as i32),
        mode: decode::<UserMode>("users.mode", &get_str("mode")?)?,
        created_at: decode_time(&get_str("created_at")?)?,
    })
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("users.get", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_credentials(
        &self,
        server_code: &ServerCode,
        handle: &Handle,
    ) -> Result<Option<StoredCredentials>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users \
             WHERE server_code = ? AND handle = ? COLLATE NOCASE"
        ))
        .bind(server_code.as_str())
        .bind(handle.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("users.find_credentials", e))?;

        match row {
            Some(row) => Ok(Some(StoredCredentials {
                user: user_from_row(&row)?,
                password_hash: row
                    .try_get("password_hash")
                    .map_err(|e| RepoError::database("users.row", e))?,
            })),
            None => Ok(None),
        }
    }

    async fn create(&self, user: &User, password_hash: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, handle, server_code, password_hash, strength, hp, max_hp,
                               gold, q, r, mode, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(user.handle.as_str())
        .bind(user.server_code.as_str())
        .bind(password_hash)
        .bind(user.strength)
        .bind(user.hp)
        .bind(user.max_hp)
        .bind(user.gold)
        .bind(user.position.q)
        .bind(user.position.r)
        .bind(user.mode.as_str())
        .bind(encode_time(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("users.create", e))?;
        Ok(())
    }

    async fn set_mode(&self, id: UserId, mode: UserMode) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE users SET mode = ? WHERE id = ?")
            .bind(mode.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("users.set_mode", e))?;
        ensure_updated(result, id)
    }

    async fn set_position(&self, id: UserId, position: HexCoord) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE users SET q = ?, r = ? WHERE id = ?")
            .bind(position.q)
            .bind(position.r)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("users.set_position", e))?;
        ensure_updated(result, id)
    }

    async fn set_hp(&self, id: UserId, hp: i32) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE users SET hp = MAX(0, MIN(?, max_hp)) WHERE id = ?")
            .bind(hp)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("users.set_hp", e))?;
        ensure_updated(result, id)
    }

    async fn add_gold(&self, id: UserId, amount: i64) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE users SET gold = gold + ? WHERE id = ?")
            .bind(amount)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("users.add_gold", e))?;
        ensure_updated(result, id)
    }

    async fn respawn(&self, id: UserId) -> Result<(), RepoError> {
        let result =
            sqlx::query("UPDATE users SET hp = max_hp, q = 0, r = 0, mode = ? WHERE id = ?")
                .bind(UserMode::Idle.as_str())
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("users.respawn", e))?;
        ensure_updated(result, id)
    }

    async fn list_at(
        &self,
        server_code: &ServerCode,
        position: HexCoord,
    ) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE server_code = ? AND q = ? AND r = ? \
             ORDER BY handle"
        ))
        .bind(server_code.as_str())
        .bind(position.q)
        .bind(position.r)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("users.list_at", e))?;
        rows.iter().map(user_from_row).collect()
    }
}
