use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::auth::generate_token;
use crate::error::{AppError, AppResult};
use crate::models::AuthToken;

pub struct AuthTokenService;

impl AuthTokenService {
    /// Every token, newest first
    pub async fn list(pool: &PgPool) -> AppResult<Vec<AuthToken>> {
        let tokens = sqlx::query_as::<_, AuthToken>(
            "SELECT * FROM auth_tokens ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(tokens)
    }

    /// Looks a token up by its secret value. Expiry is left to the caller.
    pub async fn find_by_value(pool: &PgPool, value: &str) -> AppResult<Option<AuthToken>> {
        let token = sqlx::query_as::<_, AuthToken>("SELECT * FROM auth_tokens WHERE token = $1")
            .bind(value)
            .fetch_optional(pool)
            .await?;

        Ok(token)
    }

    /// Issues a fresh token. `user_id` binds it to an admin (login sessions),
    /// `expires_at` of `None` never expires.
    pub async fn issue(
        pool: &PgPool,
        description: Option<&str>,
        user_id: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<AuthToken> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (token, user_id, description, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(generate_token())
        .bind(user_id)
        .bind(description.map(str::trim).filter(|d| !d.is_empty()))
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        log::info!(
            "Issued {} token {}",
            if token.is_session() { "session" } else { "API" },
            token.id
        );
        Ok(token)
    }

    /// Revokes a token; 404 when it is already gone
    pub async fn revoke(pool: &PgPool, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Token with id {} not found", id)));
        }

        Ok(())
    }

    /// Records that the token was just presented
    pub async fn touch(pool: &PgPool, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE auth_tokens SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Drops tokens past their expiry and returns how many went
    pub async fn purge_expired(pool: &PgPool) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(pool: &PgPool) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM auth_tokens")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
