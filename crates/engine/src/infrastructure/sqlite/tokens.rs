//! SQLite bearer-token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hexrealm_domain::UserId;
use sqlx::{Row, SqlitePool};

use super::codec::{decode, encode_time};
use super::db_error;
use crate::infrastructure::ports::{AuthTokenRepo, RepoError};

pub struct SqliteAuthTokenRepo {
    pool: SqlitePool,
}

impl SqliteAuthTokenRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthTokenRepo for SqliteAuthTokenRepo {
    async fn issue(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO auth_tokens (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id.to_string())
            .bind(encode_time(expires_at))
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("auth_tokens.issue", e))?;
        Ok(())
    }

    async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Option<UserId>, RepoError> {
        let row = sqlx::query("SELECT user_id FROM auth_tokens WHERE token = ? AND expires_at > ?")
            .bind(token)
            .bind(encode_time(now))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("auth_tokens.resolve", e))?;
        match row {
            Some(row) => {
                let raw: String = row
                    .try_get("user_id")
                    .map_err(|e| RepoError::database("auth_tokens.row", e))?;
                Ok(Some(decode("auth_tokens.user_id", &raw)?))
            }
            None => Ok(None),
        }
    }
}
