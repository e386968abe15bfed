use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{hash_password, CreateUserRequest, User};
use crate::services::validation::is_valid_email;

pub struct UsersService;

impl UsersService {
    /// Creates an admin account. Emails are stored lowercased.
    pub async fn create(pool: &PgPool, req: &CreateUserRequest) -> AppResult<User> {
        let email = normalize_email(&req.email);
        if !is_valid_email(&email) {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
        if req.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(&email)
        .bind(hash_password(&req.password)?)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("An admin with email {} already exists", email))
            }
            _ => AppError::Database(e),
        })?;

        log::info!("Created admin {}", user.email);
        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Stamps `last_login` after a successful login
    pub async fn record_login(pool: &PgPool, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn count(pool: &PgPool) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
